//! Warden - gatekeeping backend service
//!
//! CRUD backend for users, groups, API keys and preferences, fronted by a
//! layered key-gate pipeline with rate limiting, payload encryption and
//! token authentication.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod observability;
pub mod security;
pub mod services;
pub mod storage;

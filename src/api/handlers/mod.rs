//! HTTP request handlers

pub mod app_key_handler;
pub mod auth_handler;
pub mod email_handler;
pub mod group_handler;
pub mod preference_handler;
pub mod root_handler;
pub mod setup_handler;
pub mod user_handler;
pub mod webhook_handler;

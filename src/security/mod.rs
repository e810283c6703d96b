//! Security Module
//!
//! Gatekeeping pipeline: encryption, rate limiting, key gates, role
//! hierarchy, password hashing and the Axum middleware tying them together.

pub mod encryption;
pub mod keys;
pub mod middleware;
pub mod password;
pub mod rate_limit;
pub mod roles;

#[cfg(test)]
mod security_tests;

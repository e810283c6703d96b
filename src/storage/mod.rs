//! Storage module
//!
//! SurrealDB connection handling and repository implementations.

pub mod repository;
pub mod surrealdb;

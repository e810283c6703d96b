//! Request and response data structures for the HTTP surface

pub mod app_key_dto;
pub mod auth_dto;
pub mod email_dto;
pub mod group_dto;
pub mod preference_dto;
pub mod setup_dto;
pub mod user_dto;

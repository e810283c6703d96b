//! Business services
//!
//! Each service is a trait plus its default implementation and a factory
//! function; handlers depend on the traits only.

pub mod app_key;
pub mod auth;
pub mod email;
pub mod group;
pub mod preference;
pub mod user;

pub use app_key::{AppKeyService, create_app_key_service};
pub use auth::{AuthService, create_auth_service};
pub use group::{GroupService, create_group_service};
pub use preference::{PreferenceService, create_preference_service};
pub use user::{UserService, create_user_service};

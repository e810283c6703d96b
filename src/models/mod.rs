//! Domain models persisted in SurrealDB.

pub mod access_log;
pub mod app_key;
pub mod blacklist;
pub mod group;
pub mod preference;
pub mod token;
pub mod user;

pub use access_log::KeyAccessLog;
pub use app_key::AppKey;
pub use blacklist::BlacklistEntry;
pub use group::{Group, GroupAccessRole, UserGroup};
pub use preference::Preference;
pub use token::AccessToken;
pub use user::User;

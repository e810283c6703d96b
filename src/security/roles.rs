//! Role hierarchy
//!
//! Roles form a strict ladder; a user satisfies a requirement when their
//! role's level is at least the required level. A missing or unmapped role
//! satisfies nothing, including requirements at level zero.

use serde::{Deserialize, Serialize};

use crate::models::user::User;

/// Account role, ordered by privilege
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Deleted,
    View,
    User,
    Admin,
    Super,
}

impl UserRole {
    /// Numeric level in the hierarchy
    pub fn level(&self) -> u8 {
        match self {
            UserRole::Deleted => 0,
            UserRole::View => 1,
            UserRole::User => 2,
            UserRole::Admin => 3,
            UserRole::Super => 4,
        }
    }

    /// Parse a stored role name; unknown names map to `None`
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "deleted" => Some(UserRole::Deleted),
            "view" => Some(UserRole::View),
            "user" => Some(UserRole::User),
            "admin" => Some(UserRole::Admin),
            "super" => Some(UserRole::Super),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Deleted => "deleted",
            UserRole::View => "view",
            UserRole::User => "user",
            UserRole::Admin => "admin",
            UserRole::Super => "super",
        }
    }
}

/// Whether the user's role satisfies `required`
///
/// Inactive and soft-deleted users never qualify, regardless of role.
pub fn has_required_role(user: &User, required: UserRole) -> bool {
    if !user.is_usable() {
        return false;
    }
    match user.parsed_role() {
        Some(role) => role.level() >= required.level(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn user_with_role(role: Option<&str>) -> User {
        let mut user = User::new("Test", "test@example.com", "$argon2id$stub");
        user.role = role.map(String::from);
        user
    }

    #[rstest]
    #[case("super", UserRole::Admin, true)]
    #[case("super", UserRole::Super, true)]
    #[case("admin", UserRole::Admin, true)]
    #[case("admin", UserRole::Super, false)]
    #[case("user", UserRole::View, true)]
    #[case("user", UserRole::Admin, false)]
    #[case("view", UserRole::View, true)]
    #[case("view", UserRole::User, false)]
    #[case("deleted", UserRole::Deleted, true)]
    #[case("deleted", UserRole::View, false)]
    fn hierarchy_matrix(#[case] role: &str, #[case] required: UserRole, #[case] expected: bool) {
        let user = user_with_role(Some(role));
        assert_eq!(has_required_role(&user, required), expected);
    }

    #[rstest]
    #[case(None)]
    #[case(Some("root"))]
    #[case(Some("SUPER"))]
    fn missing_or_unmapped_role_never_qualifies(#[case] role: Option<&str>) {
        let user = user_with_role(role);
        assert!(!has_required_role(&user, UserRole::Deleted));
        assert!(!has_required_role(&user, UserRole::View));
    }

    #[test]
    fn inactive_user_never_qualifies() {
        let mut user = user_with_role(Some("super"));
        user.is_active = false;
        assert!(!has_required_role(&user, UserRole::View));

        let mut user = user_with_role(Some("super"));
        user.is_deleted = true;
        assert!(!has_required_role(&user, UserRole::View));
    }
}

//! Authentication types for JWT bearer tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Staff role carried in the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Business owner.
    Owner,
    /// Back-office administrator.
    Admin,
    /// Accounting staff.
    Accountant,
    /// Store clerk.
    Clerk,
}

impl Role {
    /// Returns true if the role may permanently delete records.
    #[must_use]
    pub const fn can_purge(self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Accountant => "accountant",
            Self::Clerk => "clerk",
        }
    }
}

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// Display name of the user.
    pub name: String,
    /// User's role.
    pub role: Role,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: Uuid, name: &str, role: Role, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            name: name.to_string(),
            role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_purge_permission() {
        assert!(Role::Owner.can_purge());
        assert!(Role::Admin.can_purge());
        assert!(!Role::Accountant.can_purge());
        assert!(!Role::Clerk.can_purge());
    }

    #[test]
    fn test_role_as_str() {
        assert_eq!(Role::Owner.as_str(), "owner");
        assert_eq!(Role::Accountant.as_str(), "accountant");
    }
}

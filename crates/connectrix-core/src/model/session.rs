// ── Session domain types ──

use std::fmt;

use serde::{Deserialize, Serialize};

/// Role a user signs in with.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Role {
    Admin,
    Client,
}

/// Who is signed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// An authenticated session. Presence of a `Session` *is* authentication;
/// there is no separate flag to drift out of sync.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: UserIdentity,
    pub role: Role,
    /// Opaque credential issued by the identity service.
    pub token: String,
}

impl Session {
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("role", &self.role)
            .field("token", &"****")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_token() {
        let session = Session {
            user: UserIdentity {
                id: "u1".into(),
                name: "Ada".into(),
                email: "ada@example.com".into(),
            },
            role: Role::Admin,
            token: "secret-token".into(),
        };
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("Admin"));
    }

    #[test]
    fn role_round_trips_through_strings() {
        assert_eq!("ADMIN".parse::<Role>().ok(), Some(Role::Admin));
        assert_eq!(Role::Client.to_string(), "client");
    }
}

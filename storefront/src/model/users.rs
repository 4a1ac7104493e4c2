//! Storefront users

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Newtype for user id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolved user profile
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    /// Server asserted administrator flag
    #[serde(deserialize_with = "User::deserialize_is_admin")]
    pub is_admin: bool,
    /// Account creation time
    #[serde(default, deserialize_with = "super::deserialize_optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Helper to build a profile
    pub fn new(id: i64, email: impl Into<String>, is_admin: bool) -> Self {
        Self {
            id: UserId(id),
            email: email.into(),
            is_admin,
            created_at: None,
        }
    }

    /// Role name as presented to the user
    pub fn role(&self) -> &'static str {
        if self.is_admin { "Administrator" } else { "User" }
    }

    /// The backend stores the flag as an integer column
    fn deserialize_is_admin<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Flag {
            Bool(bool),
            Int(i64),
        }

        match Flag::deserialize(deserializer)? {
            Flag::Bool(flag) => Ok(flag),
            Flag::Int(flag) => Ok(flag != 0),
        }
    }
}

impl guard::Principal for User {
    fn is_admin(&self) -> bool {
        self.is_admin
    }
}

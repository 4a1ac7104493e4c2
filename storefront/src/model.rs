//! Storefront data model
//!
//! Records exchanged with the storefront backend. The client never validates them beyond
//! deserialization: the backend is the source of truth.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

pub mod assistant;
pub mod auth;
pub mod orders;
pub mod products;
pub mod users;

/// Deserializes a backend timestamp
///
/// The backend emits naive timestamps (no offset) which are treated as UTC. RFC 3339 timestamps
/// with an offset are accepted too.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let timestamp: String = Deserialize::deserialize(deserializer)?;
    parse_timestamp(&timestamp).map_err(serde::de::Error::custom)
}

/// Optional counterpart of [`deserialize_timestamp`]
fn deserialize_optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let timestamp: Option<String> = Deserialize::deserialize(deserializer)?;
    timestamp
        .map(|timestamp| parse_timestamp(&timestamp))
        .transpose()
        .map_err(serde::de::Error::custom)
}

fn parse_timestamp(timestamp: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(timestamp) => Ok(timestamp.with_timezone(&Utc)),
        Err(_) => timestamp
            .parse::<NaiveDateTime>()
            .map(|timestamp| timestamp.and_utc()),
    }
}

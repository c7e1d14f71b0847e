use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// Prefix of the externally visible playlist id, e.g. `pl_42`.
pub const PLAYLIST_ID_PREFIX: &str = "pl_";

/// Identity of the caller, supplied by the upstream identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(i64);

impl OwnerId {
    /// Validates a raw owner id. Zero and negative values are never issued.
    pub fn new(raw: i64) -> Result<Self, Error> {
        if raw <= 0 {
            return Err(Error::validation("owner id must be a positive integer"));
        }
        Ok(Self(raw))
    }

    /// Wraps a value already known to be valid, such as one read back from
    /// the store.
    pub(crate) const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OwnerId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .trim()
            .parse::<i64>()
            .map_err(|_| Error::validation("owner id must be a positive integer"))?;
        Self::new(raw)
    }
}

/// Surrogate key of a playlist, rendered externally as `pl_<key>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaylistId(i64);

impl PlaylistId {
    pub const fn from_key(key: i64) -> Self {
        Self(key)
    }

    pub const fn key(self) -> i64 {
        self.0
    }
}

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PLAYLIST_ID_PREFIX}{}", self.0)
    }
}

impl FromStr for PlaylistId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s
            .strip_prefix(PLAYLIST_ID_PREFIX)
            .and_then(|digits| {
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                digits.parse::<i64>().ok()
            })
            .filter(|key| *key > 0)
            .ok_or_else(|| Error::validation(format!("invalid playlist id: {s}")))?;
        Ok(Self(key))
    }
}

impl Serialize for PlaylistId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PlaylistId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

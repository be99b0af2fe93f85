//! User identity as seen by the credential core.
//!
//! Accounts themselves (names, currencies, decks) belong to the account
//! collaborators; tokens only ever carry the numeric identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque numeric user identity shared by access and refresh tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    /// Wraps a raw account id
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw account id
    pub fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(Self)
    }
}

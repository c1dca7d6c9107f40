//! Media item identifiers.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Server-assigned persisted identifier.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct MediaItemId(u64);

impl MediaItemId {
    /// Raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Client-visible identifier assigned at upload time and never changed.
///
/// Correlates client-side state (drag order, edit dialogs) with server
/// records across requests.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct ExternalRef(Uuid);

impl ExternalRef {
    /// Fresh random reference.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl FromStr for ExternalRef {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

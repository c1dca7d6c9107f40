//! Client-submitted edits.

use crate::{ExternalRef, LocalizedText};
use serde::{Deserialize, Serialize};

/// Edit of one item's text for one locale.
///
/// `None` fields are left as they are; `locale: None` targets the default locale.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemEdit {
    /// Locale the text belongs to
    pub locale: Option<String>,
    /// New name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// Requested cover flag
    #[serde(default)]
    pub is_cover: Option<bool>,
}

impl ItemEdit {
    /// Edit for `locale`, or the default locale when `None`.
    pub fn for_locale(locale: Option<&str>) -> Self {
        Self {
            locale: locale.map(str::to_string),
            ..Self::default()
        }
    }

    /// Set the new name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the new description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Request (or drop) the cover flag.
    pub fn cover(mut self, is_cover: bool) -> Self {
        self.is_cover = Some(is_cover);
        self
    }

    /// Whether the edit changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.is_cover.is_none()
    }
}

/// One row of a full-state commit, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitEntry {
    /// Item being kept
    pub external_ref: ExternalRef,
    /// Replacement name map
    #[serde(default)]
    pub name: LocalizedText,
    /// Replacement description map
    #[serde(default)]
    pub description: LocalizedText,
    /// Requested cover flag
    #[serde(default)]
    pub is_cover: bool,
}

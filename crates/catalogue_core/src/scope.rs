//! Collection scoping.
//!
//! Every operation names its tenant and owning entity explicitly; nothing is
//! looked up from ambient state.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::str::FromStr;

/// Tenant/site identifier under which catalogue entities are partitioned.
#[derive(
    Debug,
    Clone,
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
pub struct SiteId(String);

impl SiteId {
    /// Create a site identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SiteId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Kind of catalogue entity that owns a media collection.
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
    strum::EnumString,
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OwnerKind {
    /// A catalogue category
    #[display("category")]
    Category,
    /// A catalogue product
    #[display("product")]
    Product,
}

/// The parent entity of a collection.
///
/// Parses from and displays as `kind:id`, e.g. `product:42`.
///
/// ```
/// use catalogue_core::{Owner, OwnerKind};
///
/// let owner: Owner = "product:42".parse().unwrap();
/// assert_eq!(owner.kind, OwnerKind::Product);
/// assert_eq!(owner.id, 42);
/// assert_eq!(owner.to_string(), "product:42");
/// ```
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
)]
#[display("{}:{}", kind, id)]
pub struct Owner {
    /// Entity kind
    pub kind: OwnerKind,
    /// Entity primary key
    pub id: u64,
}

impl Owner {
    /// Owner for a product.
    pub fn product(id: u64) -> Self {
        Self {
            kind: OwnerKind::Product,
            id,
        }
    }

    /// Owner for a category.
    pub fn category(id: u64) -> Self {
        Self {
            kind: OwnerKind::Category,
            id,
        }
    }
}

impl FromStr for Owner {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| format!("Expected kind:id, got {}", s))?;
        let kind = OwnerKind::from_str(kind.trim())
            .map_err(|_| format!("Unknown owner kind: {}", kind))?;
        let id = id
            .trim()
            .parse::<u64>()
            .map_err(|e| format!("Invalid owner id {}: {}", id, e))?;
        Ok(Self { kind, id })
    }
}

/// A named media bucket owned by one entity of one site.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Getters,
    derive_more::Display,
)]
#[display("{}/{}/{}", site, owner, collection)]
pub struct CollectionScope {
    site: SiteId,
    owner: Owner,
    collection: String,
}

impl CollectionScope {
    /// Create a scope.
    pub fn new(site: impl Into<SiteId>, owner: Owner, collection: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            owner,
            collection: collection.into(),
        }
    }

    /// Filesystem-safe key: a readable prefix plus a digest of the exact scope.
    ///
    /// The prefix is lossy; the digest keeps distinct scopes on distinct keys.
    pub fn storage_key(&self) -> String {
        format!(
            "{}__{}-{}__{}__{}",
            sanitize(self.site.as_str()),
            self.owner.kind,
            self.owner.id,
            sanitize(&self.collection),
            self.digest()
        )
    }

    /// SHA-256 over length-prefixed components, hex encoded.
    fn digest(&self) -> String {
        let site = self.site.as_str();
        let mut hasher = Sha256::new();
        hasher.update(format!("{}:{}", site.len(), site));
        hasher.update(format!("|{}:{}|", self.owner.kind, self.owner.id));
        hasher.update(format!("{}:{}", self.collection.len(), self.collection));
        let digest = hasher.finalize();
        digest[..12].iter().map(|b| format!("{:02x}", b)).collect()
    }
}

fn sanitize(segment: &str) -> String {
    segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

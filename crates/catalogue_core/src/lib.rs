//! Core data types for the catalogue media subsystem.
//!
//! This crate holds the plain records shared by storage, persistence and the
//! media service: collection scopes, identifiers, per-locale text maps,
//! ingestion sources and the media item itself.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod edit;
mod identifiers;
mod item;
mod locale;
mod scope;
mod source;
mod view;

pub use edit::{CommitEntry, ItemEdit};
pub use identifiers::{ExternalRef, MediaItemId};
pub use item::{BlobReference, MediaItem};
pub use locale::LocalizedText;
pub use scope::{CollectionScope, Owner, OwnerKind, SiteId};
pub use source::MediaSource;
pub use view::{MediaItemView, MediaUrls, MediaVariant};

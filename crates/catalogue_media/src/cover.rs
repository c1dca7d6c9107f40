//! The single-cover rule.
//!
//! A non-empty collection has exactly one cover; an empty one has none.
//! Ties are broken by position, lowest wins, then by persisted id.

use catalogue_core::{ExternalRef, MediaItem};
use catalogue_error::{ConsistencyFault, ConsistencyFaultKind};

/// Validates and repairs the cover flag of a collection.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoverInvariantEnforcer;

impl CoverInvariantEnforcer {
    /// Report a cover fault without changing anything.
    pub fn check(items: &[MediaItem]) -> Option<ConsistencyFault> {
        let covers = items.iter().filter(|item| item.is_cover).count();
        match covers {
            0 if !items.is_empty() => Some(ConsistencyFault::new(ConsistencyFaultKind::MissingCover)),
            0 | 1 => None,
            n => Some(ConsistencyFault::new(ConsistencyFaultKind::MultipleCovers(n))),
        }
    }

    /// Repair the cover flags in place. Returns the items whose flag changed.
    ///
    /// Running it again on its own output changes nothing.
    pub fn enforce(items: &mut [MediaItem]) -> Vec<ExternalRef> {
        let mut ranked: Vec<usize> = (0..items.len()).collect();
        ranked.sort_by_key(|&index| (items[index].position, items[index].id));

        let keep = ranked
            .iter()
            .copied()
            .find(|&index| items[index].is_cover)
            .or_else(|| ranked.first().copied());

        let mut changed = Vec::new();
        for index in ranked {
            let should_be_cover = Some(index) == keep;
            let item = &mut items[index];
            if item.is_cover != should_be_cover {
                item.is_cover = should_be_cover;
                changed.push(item.external_ref);
            }
        }
        changed
    }

    /// Make `target` the only cover. Returns false, leaving items untouched,
    /// when `target` is not in the collection.
    pub fn set_cover(items: &mut [MediaItem], target: ExternalRef) -> bool {
        if !items.iter().any(|item| item.external_ref == target) {
            return false;
        }
        for item in items.iter_mut() {
            item.is_cover = item.external_ref == target;
        }
        true
    }
}

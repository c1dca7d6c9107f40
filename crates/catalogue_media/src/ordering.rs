//! Dense zero-based ordering of a collection.
//!
//! Positions of a collection's items always form `0..n` after a mutation.
//! Reordering only permutes; items enter and leave through ingestion and
//! removal, never through a reorder request.

use catalogue_core::{ExternalRef, MediaItem};
use catalogue_error::{ConsistencyFault, ConsistencyFaultKind, OrderingError, OrderingErrorKind};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Position bookkeeping for one collection.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderingEngine;

impl OrderingEngine {
    /// Sort by position, breaking ties by persisted id so the order is stable.
    pub fn sort(items: &mut [MediaItem]) {
        items.sort_by_key(|item| (item.position, item.id));
    }

    /// Position the next ingested item gets.
    pub fn next_position(items: &[MediaItem]) -> u32 {
        items
            .iter()
            .map(|item| item.position)
            .max()
            .map_or(0, |max| max + 1)
    }

    /// Report duplicate positions and gaps without changing anything.
    pub fn check(items: &[MediaItem]) -> Vec<ConsistencyFault> {
        let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
        for item in items {
            *counts.entry(item.position).or_default() += 1;
        }

        let mut faults: Vec<ConsistencyFault> = counts
            .iter()
            .filter(|(_, count)| **count > 1)
            .map(|(position, count)| {
                ConsistencyFault::new(ConsistencyFaultKind::DuplicatePosition {
                    position: *position,
                    count: *count,
                })
            })
            .collect();

        let gap = counts
            .keys()
            .enumerate()
            .find(|(rank, position)| *rank as u32 != **position);
        if let Some((rank, position)) = gap {
            faults.push(ConsistencyFault::new(ConsistencyFaultKind::PositionGap {
                expected: rank as u32,
                found: *position,
            }));
        }

        faults
    }

    /// Sort, then assign `position = index`. Returns true if any position changed.
    pub fn normalize(items: &mut [MediaItem]) -> bool {
        Self::sort(items);
        let mut changed = false;
        for (index, item) in items.iter_mut().enumerate() {
            let position = index as u32;
            if item.position != position {
                item.position = position;
                changed = true;
            }
        }
        changed
    }

    /// Apply a complete target order.
    ///
    /// `sequence` must name every item exactly once. On error `items` is untouched.
    pub fn reorder(items: &mut Vec<MediaItem>, sequence: &[ExternalRef]) -> Result<(), OrderingError> {
        Self::validate(items, sequence)?;

        let mut by_ref: HashMap<ExternalRef, MediaItem> = items
            .drain(..)
            .map(|item| (item.external_ref, item))
            .collect();
        for (index, external_ref) in sequence.iter().enumerate() {
            if let Some(mut item) = by_ref.remove(external_ref) {
                item.position = index as u32;
                items.push(item);
            }
        }
        Ok(())
    }

    /// Check that `sequence` is a permutation of the collection's references.
    pub fn validate(items: &[MediaItem], sequence: &[ExternalRef]) -> Result<(), OrderingError> {
        let existing: HashSet<ExternalRef> = items.iter().map(|item| item.external_ref).collect();

        let mut seen = HashSet::with_capacity(sequence.len());
        for external_ref in sequence {
            if !seen.insert(*external_ref) {
                return Err(OrderingError::new(OrderingErrorKind::DuplicateIdentifier(
                    external_ref.to_string(),
                )));
            }
            if !existing.contains(external_ref) {
                return Err(OrderingError::new(OrderingErrorKind::UnknownIdentifier(
                    external_ref.to_string(),
                )));
            }
        }

        // Report omissions in display order.
        let mut ordered: Vec<&MediaItem> = items.iter().collect();
        ordered.sort_by_key(|item| (item.position, item.id));
        if let Some(missing) = ordered.iter().find(|item| !seen.contains(&item.external_ref)) {
            return Err(OrderingError::new(OrderingErrorKind::MissingIdentifier(
                missing.external_ref.to_string(),
            )));
        }
        Ok(())
    }

    /// Provisional order while an item is dragged from `from` over `to`.
    ///
    /// Removes the element at `from` and splices it in at `to`. This is pure
    /// presentation state: only the final sequence is ever committed.
    ///
    /// ```
    /// use catalogue_media::OrderingEngine;
    ///
    /// let preview = OrderingEngine::preview_move(&["a", "b", "c"], 2, 0).unwrap();
    /// assert_eq!(preview, vec!["c", "a", "b"]);
    /// ```
    pub fn preview_move<T: Clone>(sequence: &[T], from: usize, to: usize) -> Result<Vec<T>, OrderingError> {
        let len = sequence.len();
        for index in [from, to] {
            if index >= len {
                return Err(OrderingError::new(OrderingErrorKind::IndexOutOfRange {
                    index,
                    len,
                }));
            }
        }
        let mut preview = sequence.to_vec();
        let moved = preview.remove(from);
        preview.insert(to, moved);
        Ok(preview)
    }
}

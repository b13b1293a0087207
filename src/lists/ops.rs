//! In-memory list mutations shared by every backing store.
//!
//! Each function reports whether the list changed so callers can skip the
//! write when nothing happened.

use super::models::{ListEntry, Patchable};

pub fn contains<E: ListEntry>(entries: &[E], mal_id: u64) -> bool {
    entries.iter().any(|e| e.mal_id() == mal_id)
}

/// Appends `entry` unless an entry with the same id is already present.
pub fn insert_unique<E: ListEntry>(entries: &mut Vec<E>, entry: E) -> bool {
    if contains(entries, entry.mal_id()) {
        return false;
    }
    entries.push(entry);
    true
}

pub fn remove_by_id<E: ListEntry>(entries: &mut Vec<E>, mal_id: u64) -> bool {
    let before = entries.len();
    entries.retain(|e| e.mal_id() != mal_id);
    entries.len() != before
}

pub fn patch_by_id<E: Patchable>(entries: &mut [E], mal_id: u64, patch: &E::Patch) -> bool {
    match entries.iter_mut().find(|e| e.mal_id() == mal_id) {
        Some(entry) => {
            entry.apply_patch(patch);
            true
        }
        None => false,
    }
}

//! Invariant healer for persisted collections and singleton pointers.
//!
//! # Responsibility
//! - Repair corrupted collections in one pass at load time.
//! - Resolve dangling singleton pointers to an existing id or to nothing.
//!
//! # Invariants
//! - Healing never fails; corrupted entries are dropped, not reported as errors.
//! - The first occurrence of a duplicated id wins.
//! - Callers persist the repaired result only when `changed` is set.

use log::warn;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashSet;

/// Record kept in an id-addressed collection.
pub trait Entity {
    fn entity_id(&self) -> &str;

    /// Entity-specific validity beyond having a non-blank id.
    fn is_well_formed(&self) -> bool {
        true
    }
}

/// Outcome of one collection repair pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Repaired<T> {
    pub items: Vec<T>,
    /// Number of raw entries dropped.
    pub dropped: usize,
}

impl<T> Repaired<T> {
    pub fn changed(&self) -> bool {
        self.dropped > 0
    }
}

/// Decodes raw JSON entries and drops malformed or duplicated ones.
///
/// `collection` only labels log events.
pub fn repair_collection<T>(collection: &str, raw: Vec<Value>) -> Repaired<T>
where
    T: DeserializeOwned + Entity,
{
    let total = raw.len();
    let decoded = raw
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<T>(entry).ok())
        .collect();
    let mut repaired = repair_items(decoded);
    repaired.dropped = total - repaired.items.len();
    if repaired.changed() {
        warn!(
            "event=heal_collection module=heal status=repaired collection={} dropped={} kept={}",
            collection,
            repaired.dropped,
            repaired.items.len()
        );
    }
    repaired
}

/// Applies the id/well-formedness/uniqueness filter to typed items.
pub fn repair_items<T: Entity>(items: Vec<T>) -> Repaired<T> {
    let total = items.len();
    let mut seen = HashSet::new();
    let kept: Vec<T> = items
        .into_iter()
        .filter(|item| {
            let id = item.entity_id();
            !id.trim().is_empty() && item.is_well_formed() && seen.insert(id.to_string())
        })
        .collect();

    Repaired {
        dropped: total - kept.len(),
        items: kept,
    }
}

/// Resolution of a singleton pointer against its collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerRepair {
    /// Pointer resolves (or is legitimately unset with nothing to point at).
    Keep,
    /// Pointer is unset or dangling; move it to this id.
    Repoint(String),
    /// Pointer is dangling and nothing remains to point at.
    Clear,
}

/// Decides how to repair `pointer` given the ids currently present.
pub fn repair_pointer<'a>(
    pointer: Option<&str>,
    mut ids: impl Iterator<Item = &'a str>,
) -> PointerRepair {
    let first = ids.next();
    let resolves = match pointer {
        Some(target) => first == Some(target) || ids.any(|id| id == target),
        None => false,
    };

    match (pointer, resolves, first) {
        (_, true, _) => PointerRepair::Keep,
        (_, false, Some(first)) => PointerRepair::Repoint(first.to_string()),
        (Some(_), false, None) => PointerRepair::Clear,
        (None, false, None) => PointerRepair::Keep,
    }
}

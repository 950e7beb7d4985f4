//! Ordering engine for sibling sets (categories of a restaurant, dishes of a
//! category).
//!
//! Everything here is pure: callers read the live sibling set from the store,
//! ask this module for the new order, then persist the returned writes.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Where the moved item lands relative to the target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    #[default]
    Before,
    After,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReorderError {
    #[error("item {0} is not part of this list")]
    UnknownMember(Uuid),

    #[error("item {0} appears more than once")]
    DuplicateMember(Uuid),

    #[error("item {0} is missing from the requested order")]
    MissingMember(Uuid),
}

/// Move `source` next to `target` and return the full resulting order.
///
/// `source` is removed first, then reinserted before (or after) the position
/// `target` occupies once the removal has shifted it. Moving an item onto
/// itself returns the list unchanged. An empty list is always a no-op.
pub fn move_item(
    current: &[Uuid],
    source: Uuid,
    target: Uuid,
    placement: Placement,
) -> Result<Vec<Uuid>, ReorderError> {
    if current.is_empty() {
        return Ok(Vec::new());
    }

    let from = position_of(current, source)?;
    position_of(current, target)?;

    if source == target {
        return Ok(current.to_vec());
    }

    let mut next = current.to_vec();
    let moved = next.remove(from);
    // target is still present after the removal
    let anchor = position_of(&next, target)?;
    let at = match placement {
        Placement::Before => anchor,
        Placement::After => anchor + 1,
    };
    next.insert(at, moved);
    Ok(next)
}

/// Require `requested` to be a permutation of `current`.
pub fn check_permutation(current: &[Uuid], requested: &[Uuid]) -> Result<(), ReorderError> {
    let live: HashSet<Uuid> = current.iter().copied().collect();
    let mut seen = HashSet::with_capacity(requested.len());

    for id in requested {
        if !live.contains(id) {
            return Err(ReorderError::UnknownMember(*id));
        }
        if !seen.insert(*id) {
            return Err(ReorderError::DuplicateMember(*id));
        }
    }

    match current.iter().find(|id| !seen.contains(id)) {
        Some(missing) => Err(ReorderError::MissingMember(*missing)),
        None => Ok(()),
    }
}

/// Position-in-list for every member.
pub fn assign_positions(ordered: &[Uuid]) -> Vec<(Uuid, i32)> {
    ordered
        .iter()
        .enumerate()
        .map(|(index, id)| (*id, index as i32))
        .collect()
}

/// Writes needed to bring `stored` in line with `ordered`.
///
/// Only members whose stored index differs from their new position are
/// returned; applying them yields exactly [`assign_positions`] for the whole
/// set. Members of `ordered` that are absent from `stored` are always written.
pub fn pending_writes(stored: &[(Uuid, i32)], ordered: &[Uuid]) -> Vec<(Uuid, i32)> {
    assign_positions(ordered)
        .into_iter()
        .filter(|(id, position)| {
            stored
                .iter()
                .find(|(stored_id, _)| stored_id == id)
                .is_none_or(|(_, current)| current != position)
        })
        .collect()
}

/// Index for a new member appended to the set.
pub fn next_sort_order<I>(existing: I) -> i32
where
    I: IntoIterator<Item = i32>,
{
    existing.into_iter().max().map_or(0, |max| max + 1)
}

fn position_of(list: &[Uuid], id: Uuid) -> Result<usize, ReorderError> {
    list.iter()
        .position(|candidate| *candidate == id)
        .ok_or(ReorderError::UnknownMember(id))
}

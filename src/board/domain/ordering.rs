//! Fractional ordering shared by task and lane reordering.
//!
//! Positions are real numbers. Appending or inserting between two siblings
//! costs O(1) and never renumbers the rest of the bucket. Repeated midpoint
//! insertion between the same neighbours halves the gap each time, so once
//! the gap drops below [`GAP_TOLERANCE`] the bucket is renumbered with
//! [`renumbered`] before the new position is computed.

use super::BoardDomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Distance between consecutive positions when appending or seeding.
pub const ORDER_STEP: f64 = 1000.0;

/// Smallest gap between neighbours that still admits a distinct midpoint.
pub const GAP_TOLERANCE: f64 = 1e-6;

/// Finite position of a task or lane within its bucket.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SortOrder(f64);

impl SortOrder {
    /// Creates a validated position.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::NonFiniteOrder`] for NaN or infinities.
    pub fn new(value: f64) -> Result<Self, BoardDomainError> {
        if !value.is_finite() {
            return Err(BoardDomainError::NonFiniteOrder);
        }
        Ok(Self(value))
    }

    /// Returns the `n`th multiple of [`ORDER_STEP`], starting at one step.
    #[must_use]
    pub fn nth_step(n: u32) -> Self {
        step_multiple(n.saturating_add(1))
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Total ordering over positions; finite values make this exact.
    #[must_use]
    pub fn total_cmp(self, other: Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl TryFrom<f64> for SortOrder {
    type Error = BoardDomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SortOrder> for f64 {
    fn from(order: SortOrder) -> Self {
        order.0
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "fractional ordering is defined over real-valued positions"
)]
fn step_multiple(n: u32) -> SortOrder {
    SortOrder(f64::from(n) * ORDER_STEP)
}

/// Position for an item appended to a bucket whose greatest position is
/// `max`: one step past it, or one step when the bucket is empty.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "fractional ordering is defined over real-valued positions"
)]
pub fn append_after(max: Option<SortOrder>) -> SortOrder {
    max.map_or(SortOrder(ORDER_STEP), |last| SortOrder(last.0 + ORDER_STEP))
}

/// Position for an item placed between `prev` and `next`, both already
/// ordered ascending and excluding the item being placed.
///
/// - both neighbours: their midpoint;
/// - only `next` (head of the bucket): one step before it;
/// - only `prev` (tail of the bucket): one step after it;
/// - neither (empty bucket): one step.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "fractional ordering is defined over real-valued positions"
)]
pub fn insert_between(prev: Option<SortOrder>, next: Option<SortOrder>) -> SortOrder {
    match (prev, next) {
        (Some(before), Some(after)) => SortOrder(before.0 / 2.0 + after.0 / 2.0),
        (None, Some(after)) => SortOrder(after.0 - ORDER_STEP),
        (Some(before), None) => SortOrder(before.0 + ORDER_STEP),
        (None, None) => SortOrder(ORDER_STEP),
    }
}

/// Returns `true` when `prev` and `next` are too close for a distinct
/// midpoint and the bucket must be renumbered first.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "fractional ordering is defined over real-valued positions"
)]
pub fn gap_exhausted(prev: Option<SortOrder>, next: Option<SortOrder>) -> bool {
    match (prev, next) {
        (Some(before), Some(after)) => {
            let midpoint = before.0 / 2.0 + after.0 / 2.0;
            after.0 - before.0 < GAP_TOLERANCE || midpoint <= before.0 || midpoint >= after.0
        }
        _ => false,
    }
}

/// Fresh positions for a bucket of `len` items: `1000, 2000, ...`.
#[must_use]
pub fn renumbered(len: usize) -> Vec<SortOrder> {
    (0..len)
        .map(|index| SortOrder::nth_step(u32::try_from(index).unwrap_or(u32::MAX)))
        .collect()
}

/// Display ordering: ascending position, then most recently created first.
#[must_use]
pub fn compare_positions(
    left: (SortOrder, DateTime<Utc>),
    right: (SortOrder, DateTime<Utc>),
) -> Ordering {
    left.0.total_cmp(right.0).then_with(|| right.1.cmp(&left.1))
}

/// Neighbours around the slot just before `target` in an ascending bucket.
///
/// `positions` must be sorted ascending and must not contain the item being
/// moved. Returns `None` when `target` is not in the bucket.
#[must_use]
pub fn neighbours_before<I: PartialEq>(
    positions: &[(I, SortOrder)],
    target: &I,
) -> Option<(Option<SortOrder>, Option<SortOrder>)> {
    let index = positions.iter().position(|(id, _)| id == target)?;
    let next = positions.get(index).map(|(_, order)| *order);
    let prev = index
        .checked_sub(1)
        .and_then(|previous| positions.get(previous))
        .map(|(_, order)| *order);
    Some((prev, next))
}

/// Where an item lands when placed into a bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement<I> {
    /// Position for the placed item.
    pub order: SortOrder,
    /// Fresh sibling positions that must be written before the item, present
    /// only when the chosen gap was exhausted.
    pub renumbered: Option<Vec<(I, SortOrder)>>,
}

/// Places an item just before `before`, or at the end of the bucket when
/// `before` is `None`.
///
/// `siblings` must be sorted ascending and must not contain the placed item.
/// Returns `None` when `before` is not among the siblings.
#[must_use]
pub fn place_before<I: PartialEq + Clone>(
    siblings: &[(I, SortOrder)],
    before: Option<&I>,
) -> Option<Placement<I>> {
    let (prev, next) = slot(siblings, before)?;
    if !gap_exhausted(prev, next) {
        return Some(Placement {
            order: insert_between(prev, next),
            renumbered: None,
        });
    }
    let fresh: Vec<(I, SortOrder)> = siblings
        .iter()
        .map(|(id, _)| id.clone())
        .zip(renumbered(siblings.len()))
        .collect();
    let (fresh_prev, fresh_next) = slot(&fresh, before)?;
    Some(Placement {
        order: insert_between(fresh_prev, fresh_next),
        renumbered: Some(fresh),
    })
}

fn slot<I: PartialEq>(
    siblings: &[(I, SortOrder)],
    before: Option<&I>,
) -> Option<(Option<SortOrder>, Option<SortOrder>)> {
    match before {
        Some(target) => neighbours_before(siblings, target),
        None => Some((siblings.last().map(|(_, order)| *order), None)),
    }
}

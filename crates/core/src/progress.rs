//! Per-item progress for the sequential session, independent of rendering.
//!
//! Statuses are rebuilt from the page on every refresh instead of being
//! toggled, so they cannot drift from the field values. Once the session is
//! checked the tracker freezes on the final evaluation.

use crate::grouping::Group;
use crate::model::{GroupId, Page};

/// Visual classification of one session item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    Incomplete,
    Complete,
    Correct,
    Wrong,
}

impl ItemStatus {
    /// Derive a status from completeness and, after checking, the item's outcome.
    #[must_use]
    pub fn derive(complete: bool, outcome: Option<bool>) -> Self {
        match (outcome, complete) {
            (Some(true), _) => Self::Correct,
            (Some(false), _) => Self::Wrong,
            (None, true) => Self::Complete,
            (None, false) => Self::Incomplete,
        }
    }
}

/// One progress segment, in session order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub item: GroupId,
    pub complete: bool,
    pub status: ItemStatus,
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressTracker {
    segments: Vec<Segment>,
    frozen: bool,
}

impl ProgressTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute every segment for `order` (group ids in session order).
    ///
    /// After [`freeze`](Self::freeze) only the active marker follows `active`.
    pub fn refresh(&mut self, page: &Page, groups: &[Group], order: &[GroupId], active: usize) {
        if self.frozen {
            for (idx, segment) in self.segments.iter_mut().enumerate() {
                segment.active = idx == active;
            }
            return;
        }
        self.segments = order
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                let complete = groups
                    .get(item.index())
                    .is_some_and(|g| g.is_complete(page));
                Segment {
                    item: *item,
                    complete,
                    status: ItemStatus::derive(complete, None),
                    active: idx == active,
                }
            })
            .collect();
    }

    /// Fix every segment to its evaluated outcome; `outcomes` follows session order.
    pub fn freeze(&mut self, outcomes: &[bool]) {
        for (segment, ok) in self.segments.iter_mut().zip(outcomes) {
            segment.status = ItemStatus::derive(segment.complete, Some(*ok));
        }
        self.frozen = true;
    }

    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[must_use]
    pub fn status(&self, position: usize) -> Option<ItemStatus> {
        self.segments.get(position).map(|s| s.status)
    }

    /// `(done, total)` where `done` counts complete items.
    #[must_use]
    pub fn fraction_complete(&self) -> (usize, usize) {
        let done = self.segments.iter().filter(|s| s.complete).count();
        (done, self.segments.len())
    }

    /// Fill level of a progress bar, rounded to a whole percent.
    #[must_use]
    pub fn percent(&self) -> usize {
        let (done, total) = self.fraction_complete();
        let total = total.max(1);
        (200 * done + total) / (2 * total)
    }
}

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

use uebung_core::input::{Direction, Focus, KeyEvent};
use uebung_core::model::{FieldId, GroupId, Page};
use uebung_core::{Evaluation, Group, MatchPolicy, ProgressTracker, evaluate};

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
struct Session {
    order: Vec<GroupId>,
    index: usize,
    checked: bool,
}

/// Result of invoking the terminal check action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// No session is running.
    Inactive,
    /// An item is still incomplete; the session moved to it.
    Blocked { index: usize, item: GroupId },
    /// Every item was evaluated and all fields are now locked.
    Evaluated(Evaluation),
}

/// Label of the forward navigation control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextLabel {
    Next,
    Last,
}

impl NextLabel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Next => "Naechster Satz",
            Self::Last => "Letzter Satz",
        }
    }
}

/// Enabled state of the session navigation controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub previous_enabled: bool,
    pub next_enabled: bool,
    pub next_label: NextLabel,
    pub check_visible: bool,
}

/// What a forward key (Enter, Tab) inside an answer field should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardAction {
    /// The current item is incomplete; stay and focus this field, if any.
    Stay { focus: Option<FieldId> },
    /// Moved to the item at this position.
    Advanced { index: usize },
    /// Already on the last item; focus the check action.
    FocusCheck,
    /// No session is running.
    Ignored,
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// Sequential one-item-at-a-time session used by hard mode.
///
/// Holds either no session or exactly one, with a shuffled item order fixed
/// at start. Invalid requests (moving past either end, checking while items
/// are empty) are absorbed, never reported as errors.
#[derive(Debug, Clone, Default)]
pub struct SessionController {
    session: Option<Session>,
    progress: ProgressTracker,
}

impl SessionController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session with a uniformly shuffled item order drawn from `rng`.
    ///
    /// Returns `false` and stays inactive when there are no groups.
    pub fn start_with<R: Rng + ?Sized>(&mut self, page: &Page, groups: &[Group], rng: &mut R) -> bool {
        if groups.is_empty() {
            self.reset();
            return false;
        }
        let mut order: Vec<GroupId> = groups.iter().map(Group::id).collect();
        order.as_mut_slice().shuffle(rng);
        info!(items = order.len(), "session started");
        self.session = Some(Session {
            order,
            index: 0,
            checked: false,
        });
        self.progress = ProgressTracker::new();
        self.refresh(page, groups);
        true
    }

    /// Start a session shuffled by the thread-local generator.
    pub fn start(&mut self, page: &Page, groups: &[Group]) -> bool {
        self.start_with(page, groups, &mut rand::rng())
    }

    /// Discard the session; every item becomes visible again.
    pub fn reset(&mut self) {
        if self.session.take().is_some() {
            debug!("session reset");
        }
        self.progress = ProgressTracker::new();
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    #[must_use]
    pub fn is_checked(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.checked)
    }

    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.index)
    }

    /// Item order of the running session; empty when inactive.
    #[must_use]
    pub fn order(&self) -> &[GroupId] {
        self.session.as_ref().map_or(&[], |s| s.order.as_slice())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order().is_empty()
    }

    #[must_use]
    pub fn current_item(&self) -> Option<GroupId> {
        self.session.as_ref().and_then(|s| s.order.get(s.index).copied())
    }

    /// Whether `item` is shown: all items without a session, only the current one with.
    #[must_use]
    pub fn is_visible(&self, item: GroupId) -> bool {
        match &self.session {
            None => true,
            Some(_) => self.current_item() == Some(item),
        }
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    /// Progress caption, e.g. `Fortschritt: 2/5`.
    #[must_use]
    pub fn progress_label(&self) -> String {
        let (done, total) = self.progress.fraction_complete();
        format!("Fortschritt: {done}/{total}")
    }

    /// Recompute progress after a field changed.
    pub fn refresh(&mut self, page: &Page, groups: &[Group]) {
        if let Some(session) = &self.session {
            self.progress
                .refresh(page, groups, &session.order, session.index);
        }
    }

    #[must_use]
    pub fn controls(&self) -> Option<Controls> {
        let session = self.session.as_ref()?;
        let last = session.order.len().saturating_sub(1);
        let on_last = session.index == last;
        Some(Controls {
            previous_enabled: session.index > 0,
            next_enabled: !on_last,
            next_label: if on_last { NextLabel::Last } else { NextLabel::Next },
            check_visible: on_last,
        })
    }

    /// Move one item back or forward. Returns `false` at either end.
    pub fn advance(&mut self, direction: Direction, page: &Page, groups: &[Group]) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let target = match direction {
            Direction::Previous => session.index.checked_sub(1),
            Direction::Next => Some(session.index + 1).filter(|i| *i < session.order.len()),
        };
        let Some(target) = target else {
            return false;
        };
        session.index = target;
        self.refresh(page, groups);
        true
    }

    /// Show the item at `index`, e.g. from a progress segment. Out of range is ignored.
    pub fn jump(&mut self, index: usize, page: &Page, groups: &[Group]) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if index >= session.order.len() {
            return false;
        }
        session.index = index;
        self.refresh(page, groups);
        true
    }

    /// Position of the first incomplete item in session order.
    #[must_use]
    pub fn first_incomplete(&self, page: &Page, groups: &[Group]) -> Option<usize> {
        self.order()
            .iter()
            .position(|id| !group_at(groups, *id).is_some_and(|g| g.is_complete(page)))
    }

    /// Run the completion gate and, once every item has a value, evaluate and lock.
    pub fn check(&mut self, page: &mut Page, groups: &[Group], policy: MatchPolicy) -> CheckOutcome {
        if self.session.is_none() {
            return CheckOutcome::Inactive;
        }
        if let Some(index) = self.first_incomplete(page, groups) {
            let item = self.order()[index];
            self.jump(index, page, groups);
            info!(index, "check blocked by incomplete item");
            return CheckOutcome::Blocked { index, item };
        }

        let evaluation = evaluate(page, groups, policy);
        page.lock_all();
        let outcomes: Vec<bool> = self
            .order()
            .iter()
            .map(|id| evaluation.outcome(*id).is_some_and(|o| o.correct))
            .collect();
        self.progress.freeze(&outcomes);
        if let Some(session) = self.session.as_mut() {
            session.checked = true;
        }
        info!(score = %evaluation.score, "session checked");
        CheckOutcome::Evaluated(evaluation)
    }

    /// Enter or Tab pressed inside a field of the current item.
    pub fn forward(&mut self, page: &Page, groups: &[Group]) -> ForwardAction {
        let (Some(index), Some(item)) = (self.index(), self.current_item()) else {
            return ForwardAction::Ignored;
        };
        let Some(group) = group_at(groups, item) else {
            return ForwardAction::Ignored;
        };
        if !group.is_complete(page) {
            return ForwardAction::Stay {
                focus: group.focus_target(page),
            };
        }
        if index + 1 >= self.len() {
            return ForwardAction::FocusCheck;
        }
        self.advance(Direction::Next, page, groups);
        ForwardAction::Advanced { index: index + 1 }
    }

    /// Arrow-key navigation; keys that would move the caret are left alone.
    pub fn handle_key(&mut self, event: &KeyEvent, focus: Focus, page: &Page, groups: &[Group]) -> bool {
        if !self.is_active() {
            return false;
        }
        match event.navigation(focus) {
            Some(direction) => self.advance(direction, page, groups),
            None => false,
        }
    }
}

fn group_at(groups: &[Group], id: GroupId) -> Option<&Group> {
    groups.get(id.index()).filter(|g| g.id() == id)
}

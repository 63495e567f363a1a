use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info, warn};

use storage::repository::PreferenceRepository;
use uebung_core::input::{Direction, Focus, KeyEvent, insert_at_caret};
use uebung_core::model::{AttemptDraft, AttemptId, AttemptRecord, FieldId, FieldKind, Mode, Page};
use uebung_core::{Evaluation, Group, PageRequest, evaluate, group_fields};

use super::controller::{CheckOutcome, ForwardAction, SessionController};
use crate::attempt_service::{AttemptService, SaveStatus};
use crate::report::results_text;

/// How a page was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opened {
    Practice(Mode),
    Replay(AttemptId),
}

/// One exercise page and everything the learner does on it.
///
/// Owns the page, its groups, the active mode and the hard-mode session.
/// Storage failures never interrupt the flow; they degrade to defaults or a
/// "not saved" status.
pub struct ExerciseWorkflow {
    attempts: AttemptService,
    preferences: Arc<dyn PreferenceRepository>,
    page: Page,
    groups: Vec<Group>,
    mode: Mode,
    session: SessionController,
    evaluation: Option<Evaluation>,
    draft: Option<AttemptDraft>,
    replay: Option<AttemptId>,
}

impl ExerciseWorkflow {
    #[must_use]
    pub fn new(
        page: Page,
        attempts: AttemptService,
        preferences: Arc<dyn PreferenceRepository>,
    ) -> Self {
        let groups = group_fields(&page);
        Self {
            attempts,
            preferences,
            page,
            groups,
            mode: Mode::default(),
            session: SessionController::new(),
            evaluation: None,
            draft: None,
            replay: None,
        }
    }

    //
    // ─── OPENING ───────────────────────────────────────────────────────────────
    //

    /// Open the page for `request`: replay a saved attempt or start practising.
    ///
    /// An unknown attempt id falls back to a normal practice page.
    pub async fn open(&mut self, request: &PageRequest) -> Opened {
        if let Some(id) = request.replay {
            if let Some(record) = self.attempts.find(id).await {
                self.replay(&record);
                return Opened::Replay(id);
            }
            warn!(%id, "attempt to replay not found, opening practice view");
        }
        let mode = self.resolve_mode(request.mode).await;
        self.apply_mode(mode);
        Opened::Practice(mode)
    }

    /// A requested mode wins and is remembered; otherwise the remembered one; otherwise soft.
    pub async fn resolve_mode(&self, requested: Option<Mode>) -> Mode {
        if let Some(mode) = requested {
            if let Err(err) = self.preferences.set_preferred_mode(mode).await {
                warn!(error = %err, "mode preference not stored");
            }
            return mode;
        }
        match self.preferences.preferred_mode().await {
            Ok(Some(mode)) => mode,
            Ok(None) => Mode::default(),
            Err(err) => {
                warn!(error = %err, "mode preference unreadable");
                Mode::default()
            }
        }
    }

    /// Switch mode from the page's mode chooser and remember the choice.
    pub async fn choose_mode(&mut self, mode: Mode) {
        let mode = self.resolve_mode(Some(mode)).await;
        self.apply_mode(mode);
    }

    /// Switch mode; hard mode starts a fresh shuffled session.
    pub fn apply_mode(&mut self, mode: Mode) {
        self.apply_mode_with(mode, &mut rand::rng());
    }

    /// Like [`apply_mode`](Self::apply_mode) with an injected shuffle source.
    pub fn apply_mode_with<R: Rng + ?Sized>(&mut self, mode: Mode, rng: &mut R) {
        self.mode = mode;
        self.replay = None;
        self.evaluation = None;
        self.draft = None;
        self.page.unlock_all();
        if mode.is_sequential() {
            self.session.start_with(&self.page, &self.groups, rng);
        } else {
            self.session.reset();
        }
        info!(mode = %mode, "mode applied");
    }

    /// Show a saved attempt read-only and evaluate it once.
    pub fn replay(&mut self, record: &AttemptRecord) {
        self.mode = record.mode;
        self.session.reset();
        self.draft = None;
        self.page.unlock_all();
        self.page.restore_answers(&record.answers);
        self.page.lock_all();
        self.evaluation = Some(evaluate(&self.page, &self.groups, self.mode.policy()));
        self.replay = Some(record.id);
        debug!(id = %record.id, answers = record.answers.len(), "attempt replayed");
    }

    //
    // ─── ACCESSORS ─────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }

    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn session(&self) -> &SessionController {
        &self.session
    }

    #[must_use]
    pub fn evaluation(&self) -> Option<&Evaluation> {
        self.evaluation.as_ref()
    }

    /// Attempt waiting for a learner name after a hard-mode check.
    #[must_use]
    pub fn pending_draft(&self) -> Option<&AttemptDraft> {
        self.draft.as_ref()
    }

    #[must_use]
    pub fn is_replay(&self) -> bool {
        self.replay.is_some()
    }

    /// Whether the special-character keys and the check action are offered.
    #[must_use]
    pub fn accepts_input(&self) -> bool {
        !self.is_replay() && !self.page.is_locked()
    }

    /// Items currently shown, in the order they are presented.
    #[must_use]
    pub fn visible_groups(&self) -> Vec<&Group> {
        if self.session.is_active() {
            self.session
                .current_item()
                .and_then(|id| self.groups.get(id.index()))
                .into_iter()
                .collect()
        } else {
            self.groups.iter().collect()
        }
    }

    /// Field that should receive focus on the current item.
    #[must_use]
    pub fn focus_target(&self) -> Option<FieldId> {
        let item = self.session.current_item()?;
        self.groups.get(item.index())?.focus_target(&self.page)
    }

    //
    // ─── EDITING ───────────────────────────────────────────────────────────────
    //

    pub fn set_text(&mut self, id: FieldId, text: &str) -> bool {
        let changed = self.page.set_text(id, text);
        if changed {
            self.session.refresh(&self.page, &self.groups);
        }
        changed
    }

    pub fn select(&mut self, id: FieldId, option: &str) -> bool {
        let changed = self.page.select(id, option);
        if changed {
            self.session.refresh(&self.page, &self.groups);
        }
        changed
    }

    /// Type a special character at the caret of a text field.
    ///
    /// Returns the new caret position, or `None` if the field cannot take text.
    pub fn insert_special(&mut self, id: FieldId, start: usize, end: usize, ch: char) -> Option<usize> {
        let field = self.page.field(id)?;
        if field.kind() != FieldKind::FreeText || field.is_locked() {
            return None;
        }
        let (value, caret) = insert_at_caret(field.actual(), start, end, ch);
        self.set_text(id, &value).then_some(caret)
    }

    //
    // ─── NAVIGATION ────────────────────────────────────────────────────────────
    //

    pub fn navigate(&mut self, direction: Direction) -> bool {
        self.session.advance(direction, &self.page, &self.groups)
    }

    pub fn jump(&mut self, index: usize) -> bool {
        self.session.jump(index, &self.page, &self.groups)
    }

    pub fn forward(&mut self) -> ForwardAction {
        self.session.forward(&self.page, &self.groups)
    }

    pub fn handle_key(&mut self, event: &KeyEvent, focus: Focus) -> bool {
        self.session.handle_key(event, focus, &self.page, &self.groups)
    }

    //
    // ─── CHECKING ──────────────────────────────────────────────────────────────
    //

    /// Item position that would block a hard-mode check, if any.
    #[must_use]
    pub fn blocking_item(&self) -> Option<usize> {
        self.session.first_incomplete(&self.page, &self.groups)
    }

    /// Soft mode evaluates straight away; hard mode gates on completeness, then locks.
    pub fn check(&mut self) -> CheckOutcome {
        if self.is_replay() {
            return CheckOutcome::Inactive;
        }
        if !self.session.is_active() {
            let evaluation = evaluate(&self.page, &self.groups, self.mode.policy());
            info!(score = %evaluation.score, mode = %self.mode, "page checked");
            self.evaluation = Some(evaluation.clone());
            return CheckOutcome::Evaluated(evaluation);
        }

        let outcome = self
            .session
            .check(&mut self.page, &self.groups, self.mode.policy());
        if let CheckOutcome::Evaluated(evaluation) = &outcome {
            self.draft = Some(AttemptDraft {
                score: evaluation.score,
                mode: self.mode,
                path: self.page.path().to_owned(),
                title: self.page.title().to_owned(),
                answers: self.page.answers(),
            });
            self.evaluation = Some(evaluation.clone());
        }
        outcome
    }

    /// Save the pending attempt under `name`.
    pub async fn save_attempt(&mut self, name: &str) -> SaveStatus {
        let Some(draft) = self.draft.clone() else {
            return SaveStatus::NotSaved;
        };
        let status = self.attempts.save(draft, name).await;
        if matches!(status, SaveStatus::Saved(_)) {
            self.draft = None;
        }
        status
    }

    /// Copyable results text for the latest evaluation.
    #[must_use]
    pub fn report(&self) -> Option<String> {
        self.evaluation
            .as_ref()
            .map(|evaluation| results_text(self.page.title(), self.mode, evaluation))
    }
}

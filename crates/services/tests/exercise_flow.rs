use std::sync::Arc;

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use services::{
    AttemptService, CheckOutcome, Clock, ExerciseServices, ExerciseWorkflow, Opened, SaveStatus,
};
use storage::repository::{AttemptRepository, InMemoryRepository, StorageError};
use uebung_core::model::{
    AttemptId, AttemptRecord, BlockDefinition, ExerciseDefinition, FieldId, Mode,
    PartDefinition as P,
};
use uebung_core::PageRequest;
use uebung_core::time::fixed_clock;

fn five_blanks() -> ExerciseDefinition {
    ExerciseDefinition {
        title: "Präteritum".into(),
        path: "/ubungen/praeteritum.html".into(),
        blocks: ["ging", "war", "hatte", "kam", "sah"]
            .into_iter()
            .map(BlockDefinition::blank)
            .collect(),
    }
}

fn two_field_sentence() -> ExerciseDefinition {
    ExerciseDefinition {
        title: "Perfekt".into(),
        path: "/ubungen/perfekt.html".into(),
        blocks: vec![BlockDefinition::sentence(vec![
            P::text("Gestern "),
            P::blank("ging"),
            P::text(" ich, heute bin ich "),
            P::blank("gegangen"),
            P::text("."),
        ])],
    }
}

fn hard_workflow(services: &ExerciseServices, def: &ExerciseDefinition) -> ExerciseWorkflow {
    let mut wf = services.workflow(def).unwrap();
    wf.apply_mode_with(Mode::Hard, &mut StdRng::seed_from_u64(3));
    wf
}

fn fill_expected(wf: &mut ExerciseWorkflow) {
    let fields: Vec<(FieldId, String)> = wf
        .page()
        .fields()
        .iter()
        .map(|f| (f.id(), f.expected().to_owned()))
        .collect();
    for (id, value) in fields {
        assert!(wf.set_text(id, &value));
    }
}

#[tokio::test]
async fn hard_check_jumps_to_first_incomplete_item() {
    let services = ExerciseServices::in_memory(fixed_clock());
    let mut wf = hard_workflow(&services, &five_blanks());
    fill_expected(&mut wf);

    let third = wf.session().order()[2];
    let field = wf.groups()[third.index()].fields()[0];
    assert!(wf.set_text(field, "   "));
    assert!(wf.jump(4));

    assert_eq!(wf.blocking_item(), Some(2));
    let outcome = wf.check();
    assert_eq!(outcome, CheckOutcome::Blocked { index: 2, item: third });
    assert_eq!(wf.session().index(), Some(2));
    assert!(!wf.session().is_checked());
    assert!(wf.pending_draft().is_none());
    assert_eq!(wf.visible_groups().len(), 1);
    assert_eq!(wf.focus_target(), Some(field));
}

#[tokio::test]
async fn hard_check_locks_fields_and_saves_attempt() {
    let services = ExerciseServices::in_memory(fixed_clock());
    let mut wf = hard_workflow(&services, &five_blanks());
    fill_expected(&mut wf);
    assert!(wf.set_text(FieldId::new(1), "wär"));

    let CheckOutcome::Evaluated(evaluation) = wf.check() else {
        panic!("expected evaluation");
    };
    assert_eq!(evaluation.score.to_string(), "4/5");
    assert!(wf.page().is_locked());
    assert!(!wf.set_text(FieldId::new(1), "war"));
    assert_eq!(wf.page().field(FieldId::new(1)).unwrap().actual(), "wär");
    assert_eq!(wf.insert_special(FieldId::new(0), 0, 0, 'ä'), None);

    assert_eq!(wf.save_attempt("").await, SaveStatus::NameRequired);
    let status = wf.save_attempt("Mia").await;
    assert_eq!(status, SaveStatus::Saved(AttemptId::new(1_700_000_000_000)));
    assert_eq!(wf.save_attempt("Mia").await, SaveStatus::NotSaved);

    let saved = services.attempts().load_all().await;
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].mode, Mode::Hard);
    assert_eq!(saved[0].score_text, "4/5");
    assert_eq!(saved[0].answers, vec!["ging", "wär", "hatte", "kam", "sah"]);
    assert_eq!(saved[0].path, "/ubungen/praeteritum.html");
}

#[tokio::test]
async fn soft_check_scores_without_locking() {
    let services = ExerciseServices::in_memory(fixed_clock());
    let mut wf = services.workflow(&two_field_sentence()).unwrap();
    wf.apply_mode(Mode::Soft);
    assert!(!wf.session().is_active());
    assert_eq!(wf.visible_groups().len(), 1);

    wf.set_text(FieldId::new(0), "ging");
    wf.set_text(FieldId::new(1), "geganen");
    let CheckOutcome::Evaluated(evaluation) = wf.check() else {
        panic!("soft mode always evaluates");
    };
    assert_eq!(evaluation.score.correct, 1);
    assert!(!wf.page().is_locked());
    assert!(wf.pending_draft().is_none());

    wf.set_text(FieldId::new(1), "gegange");
    let CheckOutcome::Evaluated(evaluation) = wf.check() else {
        panic!("soft mode always evaluates");
    };
    assert_eq!(evaluation.score.correct, 0);
    let report = wf.report().unwrap();
    assert!(report.contains("Mode: soft"));
    assert!(report.contains("Teil 2 | Your answer: gegange | Correct: gegangen | Result: wrong"));
}

#[tokio::test]
async fn replay_restores_answers_and_locks_before_interaction() {
    let record = AttemptRecord {
        id: AttemptId::new(77),
        name: "Mia".into(),
        datetime: "14.11.2023, 23:13:20".into(),
        score_text: "1/1".into(),
        mode: Mode::Hard,
        path: "/ubungen/perfekt.html".into(),
        title: "Perfekt".into(),
        answers: vec!["ging".into(), "gegangen".into()],
    };
    let repo = InMemoryRepository::new();
    repo.append_attempt(&record).await.unwrap();
    let attempts = AttemptService::new(fixed_clock(), Arc::new(repo.clone()));
    let page = uebung_core::model::Page::from_definition(&two_field_sentence()).unwrap();
    let mut wf = ExerciseWorkflow::new(page, attempts, Arc::new(repo));

    let opened = wf.open(&PageRequest::from_query("?attemptId=77&view=1")).await;
    assert_eq!(opened, Opened::Replay(AttemptId::new(77)));
    assert_eq!(wf.page().answers(), vec!["ging", "gegangen"]);
    assert!(wf.page().is_locked());
    assert!(wf.is_replay());
    assert!(!wf.accepts_input());
    assert_eq!(wf.mode(), Mode::Hard);
    assert_eq!(wf.evaluation().unwrap().score.to_string(), "1/1");
    assert_eq!(wf.check(), CheckOutcome::Inactive);
    assert!(!wf.set_text(FieldId::new(0), "geht"));
}

#[tokio::test]
async fn unknown_replay_falls_back_to_practice() {
    let services = ExerciseServices::in_memory(fixed_clock());
    let mut wf = services.workflow(&two_field_sentence()).unwrap();
    let opened = wf.open(&PageRequest::from_query("?attemptId=5&view=1")).await;
    assert_eq!(opened, Opened::Practice(Mode::Soft));
    assert!(!wf.is_replay());
    assert!(!wf.page().is_locked());
}

#[tokio::test]
async fn requested_mode_wins_and_is_remembered() {
    let services = ExerciseServices::in_memory(fixed_clock());
    let mut wf = services.workflow(&five_blanks()).unwrap();
    assert_eq!(
        wf.open(&PageRequest::from_query("?mode=hard")).await,
        Opened::Practice(Mode::Hard)
    );
    assert!(wf.session().is_active());

    let mut next = services.workflow(&five_blanks()).unwrap();
    assert_eq!(
        next.open(&PageRequest::default()).await,
        Opened::Practice(Mode::Hard)
    );

    next.choose_mode(Mode::Soft).await;
    assert!(!next.session().is_active());
    let mut third = services.workflow(&five_blanks()).unwrap();
    assert_eq!(
        third.open(&PageRequest::default()).await,
        Opened::Practice(Mode::Soft)
    );
}

#[tokio::test]
async fn switching_mode_unlocks_and_restarts() {
    let services = ExerciseServices::in_memory(fixed_clock());
    let mut wf = hard_workflow(&services, &five_blanks());
    fill_expected(&mut wf);
    assert!(matches!(wf.check(), CheckOutcome::Evaluated(_)));
    assert!(wf.page().is_locked());

    wf.apply_mode(Mode::Soft);
    assert!(!wf.page().is_locked());
    assert!(wf.evaluation().is_none());
    assert!(wf.set_text(FieldId::new(0), "gehen"));
}

struct BrokenStore;

#[async_trait]
impl AttemptRepository for BrokenStore {
    async fn append_attempt(&self, _record: &AttemptRecord) -> Result<(), StorageError> {
        Err(StorageError::Connection("disk full".into()))
    }

    async fn list_attempts(&self) -> Result<Vec<AttemptRecord>, StorageError> {
        Err(StorageError::Serialization("garbage".into()))
    }

    async fn get_attempt(&self, _id: AttemptId) -> Result<Option<AttemptRecord>, StorageError> {
        Err(StorageError::Serialization("garbage".into()))
    }

    async fn remove_attempt(&self, _id: AttemptId) -> Result<(), StorageError> {
        Err(StorageError::Connection("disk full".into()))
    }
}

#[tokio::test]
async fn storage_failures_degrade_without_blocking_the_check() {
    let attempts = AttemptService::new(Clock::default(), Arc::new(BrokenStore));
    assert!(attempts.load_all().await.is_empty());
    assert!(attempts.journal().await.is_empty());

    let page = uebung_core::model::Page::from_definition(&five_blanks()).unwrap();
    let mut wf = ExerciseWorkflow::new(page, attempts, Arc::new(InMemoryRepository::new()));
    wf.apply_mode_with(Mode::Hard, &mut StdRng::seed_from_u64(1));
    fill_expected(&mut wf);
    assert!(matches!(wf.check(), CheckOutcome::Evaluated(_)));
    assert_eq!(wf.save_attempt("Mia").await, SaveStatus::NotSaved);
    assert!(wf.pending_draft().is_some());
}

#[tokio::test]
async fn special_keys_insert_at_caret() {
    let services = ExerciseServices::in_memory(fixed_clock());
    let mut wf = services.workflow(&two_field_sentence()).unwrap();
    wf.apply_mode(Mode::Soft);
    wf.set_text(FieldId::new(0), "gng");
    assert_eq!(wf.insert_special(FieldId::new(0), 1, 1, 'ü'), Some(2));
    assert_eq!(wf.page().field(FieldId::new(0)).unwrap().actual(), "güng");
}

#[tokio::test]
async fn unreadable_json_store_is_never_overwritten() {
    let path = std::env::temp_dir().join(format!(
        "uebung-flow-unreadable-{}.json",
        std::process::id()
    ));
    std::fs::write(&path, "{not json").unwrap();
    let services = ExerciseServices::new_json_file(&path, fixed_clock());

    let mut wf = services.workflow(&five_blanks()).unwrap();
    let request = PageRequest::from_query("?mode=hard");
    assert_eq!(wf.open(&request).await, Opened::Practice(Mode::Hard));
    fill_expected(&mut wf);
    assert!(matches!(wf.check(), CheckOutcome::Evaluated(_)));
    assert_eq!(wf.save_attempt("Mia").await, SaveStatus::NotSaved);
    assert!(services.attempts().load_all().await.is_empty());

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{not json");
    let _ = std::fs::remove_file(&path);
}

use storage::repository::{AttemptRepository, PreferenceRepository, Storage, StorageError};
use storage::sqlite::SqliteRepository;
use uebung_core::model::{AttemptId, AttemptRecord, Mode};

fn record(id: u64, name: &str) -> AttemptRecord {
    AttemptRecord {
        id: AttemptId::new(id),
        name: name.into(),
        datetime: "14.11.2023, 23:13:20".into(),
        score_text: "1/2".into(),
        mode: Mode::Hard,
        path: "/ubungen/perfekt.html".into(),
        title: "Perfekt mit sein".into(),
        answers: vec!["ging".into(), "gegangen".into(), String::new()],
    }
}

#[tokio::test]
async fn sqlite_roundtrip_keeps_insertion_order_and_answers() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_attempts?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.append_attempt(&record(20, "Mia")).await.unwrap();
    repo.append_attempt(&record(10, "Jonas")).await.unwrap();

    let all = repo.list_attempts().await.unwrap();
    assert_eq!(
        all.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
        vec!["Mia", "Jonas"]
    );
    assert_eq!(all[0], record(20, "Mia"));

    let fetched = repo.get_attempt(AttemptId::new(10)).await.unwrap();
    assert_eq!(fetched, Some(record(10, "Jonas")));
    assert_eq!(repo.get_attempt(AttemptId::new(99)).await.unwrap(), None);
}

#[tokio::test]
async fn sqlite_rejects_duplicate_ids_and_reports_missing_removals() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_conflict?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.append_attempt(&record(1, "Mia")).await.unwrap();
    let err = repo.append_attempt(&record(1, "Mia")).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict));

    repo.remove_attempt(AttemptId::new(1)).await.unwrap();
    assert!(repo.list_attempts().await.unwrap().is_empty());
    let err = repo.remove_attempt(AttemptId::new(1)).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");
}

#[tokio::test]
async fn sqlite_storage_persists_preferred_mode() {
    let storage = Storage::sqlite("sqlite:file:memdb_prefs?mode=memory&cache=shared")
        .await
        .expect("storage");
    assert_eq!(storage.preferences.preferred_mode().await.unwrap(), None);

    storage.preferences.set_preferred_mode(Mode::Hard).await.unwrap();
    storage.preferences.set_preferred_mode(Mode::Soft).await.unwrap();
    assert_eq!(
        storage.preferences.preferred_mode().await.unwrap(),
        Some(Mode::Soft)
    );
}

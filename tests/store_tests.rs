//! Knowledge store tests: schema enforcement on load/save, the pure merge,
//! and write serialization.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use css_tutor_mcp_server::memory::{update_concept, KnowledgeRecord, KnowledgeStore, StoreError};

fn seed(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("memory.json");
    fs::write(&path, body).unwrap();
    path
}

// ---------------------------------------------------------------------------
// load
// ---------------------------------------------------------------------------

#[tokio::test]
async fn load_reads_seeded_record() {
    let tmp = tempfile::tempdir().unwrap();
    let path = seed(tmp.path(), r#"{"user_id":"u1","known_concepts":{"flexbox":true}}"#);
    let store = KnowledgeStore::new(&path).unwrap();

    let record = store.load().await.unwrap();

    assert_eq!(record.owner_id, "u1");
    assert_eq!(record.known_concepts.len(), 1);
    assert_eq!(record.is_known("flexbox"), Some(true));
}

#[tokio::test]
async fn load_missing_file_is_corrupt_state() {
    let tmp = tempfile::tempdir().unwrap();
    let store = KnowledgeStore::new(tmp.path().join("absent.json")).unwrap();

    let err = store.load().await.unwrap_err();
    assert!(matches!(err, StoreError::CorruptState(_)), "got {err:?}");
}

#[tokio::test]
async fn load_rejects_malformed_documents() {
    let cases = [
        ("not json", "not valid json"),
        ("missing user_id", r#"{"known_concepts":{}}"#),
        ("empty user_id", r#"{"user_id":"","known_concepts":{}}"#),
        ("missing known_concepts", r#"{"user_id":"u1"}"#),
        ("non-boolean flag", r#"{"user_id":"u1","known_concepts":{"grid":"yes"}}"#),
        ("numeric user_id", r#"{"user_id":7,"known_concepts":{}}"#),
        ("unexpected key", r#"{"user_id":"u1","known_concepts":{},"extra":1}"#),
        ("array root", r#"[]"#),
    ];

    for (label, body) in cases {
        let tmp = tempfile::tempdir().unwrap();
        let store = KnowledgeStore::new(seed(tmp.path(), body)).unwrap();

        let err = store.load().await.unwrap_err();
        assert!(
            matches!(err, StoreError::CorruptState(_)),
            "{label}: expected CorruptState, got {err:?}"
        );
    }
}

// ---------------------------------------------------------------------------
// save
// ---------------------------------------------------------------------------

#[tokio::test]
async fn save_then_load_returns_equal_record() {
    let tmp = tempfile::tempdir().unwrap();
    let path = seed(tmp.path(), r#"{"user_id":"u1","known_concepts":{}}"#);
    let store = KnowledgeStore::new(&path).unwrap();

    let record = KnowledgeRecord::new("u2")
        .with_concept("container queries", false)
        .with_concept("subgrid", true)
        .with_concept(":has()", true);

    store.save(&record).await.unwrap();
    let loaded = store.load().await.unwrap();

    assert_eq!(loaded, record);
}

#[tokio::test]
async fn save_writes_persisted_layout() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("memory.json");
    let store = KnowledgeStore::new(&path).unwrap();

    store
        .save(&KnowledgeRecord::new("u1").with_concept("grid", true))
        .await
        .unwrap();

    let on_disk: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        on_disk,
        serde_json::json!({ "user_id": "u1", "known_concepts": { "grid": true } })
    );
}

#[tokio::test]
async fn save_rejects_record_without_owner_and_leaves_file_unchanged() {
    let tmp = tempfile::tempdir().unwrap();
    let original = r#"{"user_id":"u1","known_concepts":{"flexbox":true}}"#;
    let path = seed(tmp.path(), original);
    let store = KnowledgeStore::new(&path).unwrap();

    let err = store
        .save(&KnowledgeRecord::new("").with_concept("grid", true))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::InvalidRecord(_)), "got {err:?}");
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

#[tokio::test]
async fn save_leaves_no_temp_file_behind() {
    let tmp = tempfile::tempdir().unwrap();
    let path = seed(tmp.path(), r#"{"user_id":"u1","known_concepts":{}}"#);
    let store = KnowledgeStore::new(&path).unwrap();

    store.save(&KnowledgeRecord::new("u1")).await.unwrap();

    let names: Vec<String> = fs::read_dir(tmp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["memory.json".to_string()]);
}

#[tokio::test]
async fn failed_replace_removes_temp_file() {
    let tmp = tempfile::tempdir().unwrap();
    // A directory at the target path makes the final rename fail.
    let path = tmp.path().join("memory.json");
    fs::create_dir(&path).unwrap();
    fs::write(path.join("keep"), "x").unwrap();
    let store = KnowledgeStore::new(&path).unwrap();

    let err = store.save(&KnowledgeRecord::new("u1")).await.unwrap_err();

    assert!(matches!(err, StoreError::Io(_)));
    assert!(!tmp.path().join("memory.json.tmp").exists());
    assert!(path.join("keep").exists());
}

#[tokio::test]
async fn failed_temp_write_leaves_nothing_behind() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("missing").join("memory.json");
    let store = KnowledgeStore::new(&path).unwrap();

    let err = store.save(&KnowledgeRecord::new("u1")).await.unwrap_err();

    assert!(matches!(err, StoreError::Io(_)));
    assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
}

#[test]
fn store_reports_its_path() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("memory.json");
    let store = KnowledgeStore::new(&path).unwrap();
    assert_eq!(store.path(), path.as_path());
}

// ---------------------------------------------------------------------------
// update_concept
// ---------------------------------------------------------------------------

#[test]
fn update_concept_sets_flag_and_keeps_the_rest() {
    let current = KnowledgeRecord::new("u1")
        .with_concept("flexbox", true)
        .with_concept("grid", false)
        .with_concept("nesting", true);

    let updated = update_concept(&current, "grid", true);

    assert_eq!(updated.is_known("grid"), Some(true));
    assert_eq!(updated.is_known("flexbox"), Some(true));
    assert_eq!(updated.is_known("nesting"), Some(true));
    assert_eq!(updated.known_concepts.len(), 3);
    assert_eq!(updated.owner_id, "u1");

    // Input is untouched.
    assert_eq!(current.is_known("grid"), Some(false));
}

#[test]
fn update_concept_inserts_new_concept() {
    let current = KnowledgeRecord::new("u1").with_concept("flexbox", true);

    let updated = update_concept(&current, "view transitions", false);

    assert_eq!(updated.is_known("view transitions"), Some(false));
    assert_eq!(updated.is_known("flexbox"), Some(true));
    assert_eq!(updated.known_concepts.len(), 2);
}

// ---------------------------------------------------------------------------
// record_concept
// ---------------------------------------------------------------------------

#[tokio::test]
async fn record_concept_persists_merge() {
    let tmp = tempfile::tempdir().unwrap();
    let path = seed(tmp.path(), r#"{"user_id":"u1","known_concepts":{"flexbox":true}}"#);
    let store = KnowledgeStore::new(&path).unwrap();

    let returned = store.record_concept("grid", true).await.unwrap();
    let loaded = store.load().await.unwrap();

    assert_eq!(returned, loaded);
    assert_eq!(loaded.is_known("grid"), Some(true));
    assert_eq!(loaded.is_known("flexbox"), Some(true));
}

#[tokio::test]
async fn record_concept_on_corrupt_store_does_not_write() {
    let tmp = tempfile::tempdir().unwrap();
    let path = seed(tmp.path(), r#"{"user_id":"u1","known_concepts":{"grid":1}}"#);
    let store = KnowledgeStore::new(&path).unwrap();

    let err = store.record_concept("grid", true).await.unwrap_err();

    assert!(matches!(err, StoreError::CorruptState(_)), "got {err:?}");
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        r#"{"user_id":"u1","known_concepts":{"grid":1}}"#
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_record_concept_loses_no_update() {
    let tmp = tempfile::tempdir().unwrap();
    let path = seed(tmp.path(), r#"{"user_id":"u1","known_concepts":{}}"#);
    let store = Arc::new(KnowledgeStore::new(&path).unwrap());

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move { store.record_concept(&format!("concept-{i}"), i % 2 == 0).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let loaded = store.load().await.unwrap();
    assert_eq!(loaded.known_concepts.len(), 16);
    for i in 0..16 {
        assert_eq!(loaded.is_known(&format!("concept-{i}")), Some(i % 2 == 0));
    }
}

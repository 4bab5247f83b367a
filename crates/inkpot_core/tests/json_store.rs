use inkpot_core::{CollectionStore, JsonFileStore, StoreError};
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Entry {
    id: u64,
    label: String,
}

fn entry(id: u64, label: &str) -> Entry {
    Entry {
        id,
        label: label.to_string(),
    }
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());
    let records = vec![entry(1, "first"), entry(2, "second")];

    store.save("entries", &records).unwrap();
    let loaded: Vec<Entry> = store.load("entries").unwrap();

    assert_eq!(loaded, records);
}

#[test]
fn load_before_first_save_reports_missing() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());

    let result = store.load::<Entry>("entries");

    assert!(matches!(result, Err(StoreError::Missing { .. })));
}

#[test]
fn save_creates_missing_directories() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("nested").join("data"));

    store.save("entries", &[entry(1, "first")]).unwrap();
    let loaded: Vec<Entry> = store.load("entries").unwrap();

    assert_eq!(loaded, vec![entry(1, "first")]);
}

#[test]
fn truncated_file_never_partially_parses() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());
    store
        .save("entries", &[entry(1, "first"), entry(2, "second")])
        .unwrap();

    // Chop the file mid-record; the loader must yield nothing, not one entry.
    let path = store.collection_path("entries");
    let text = fs::read_to_string(&path).unwrap();
    fs::write(&path, &text[..text.len() / 2]).unwrap();

    let result = store.load::<Entry>("entries");
    assert!(matches!(result, Err(StoreError::Malformed { .. })));
}

#[test]
fn wrong_document_shape_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());
    fs::write(store.collection_path("entries"), "{\"not\": \"an array\"}\n").unwrap();

    let result = store.load::<Entry>("entries");

    assert!(matches!(result, Err(StoreError::Malformed { .. })));
}

#[test]
fn save_replaces_previous_content() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());

    store
        .save("entries", &[entry(1, "a"), entry(2, "b"), entry(3, "c")])
        .unwrap();
    store.save("entries", &[entry(9, "only")]).unwrap();

    let loaded: Vec<Entry> = store.load("entries").unwrap();
    assert_eq!(loaded, vec![entry(9, "only")]);
}

#[test]
fn persisted_file_is_indented_human_readable_json() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());

    store.save("entries", &[entry(1, "first")]).unwrap();
    let text = fs::read_to_string(store.collection_path("entries")).unwrap();

    assert!(text.starts_with("[\n"));
    assert!(text.contains("  {"));
    assert!(text.contains("\"label\": \"first\""));
    assert!(text.ends_with("]\n"));

    // formatting is cosmetic only: the indented text round-trips exactly
    let reparsed: Vec<Entry> = serde_json::from_str(&text).unwrap();
    assert_eq!(reparsed, vec![entry(1, "first")]);
}

#[test]
fn empty_collection_is_an_empty_array() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());

    store.save::<Entry>("entries", &[]).unwrap();
    let text = fs::read_to_string(store.collection_path("entries")).unwrap();

    assert_eq!(text, "[]\n");
}

#[test]
fn repeated_saves_leave_only_the_collection_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());

    store.save("entries", &[entry(1, "a")]).unwrap();
    store
        .save("entries", &[entry(1, "a"), entry(2, "b")])
        .unwrap();

    let loaded: Vec<Entry> = store.load("entries").unwrap();
    assert_eq!(loaded.len(), 2);

    // the temp-and-rename dance is invisible afterwards
    let mut names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["entries.json".to_string()]);
}

#[test]
fn hostile_collection_names_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());

    for name in ["", "Entries", "entries.json", "../entries", "a/b"] {
        assert!(matches!(
            store.load::<Entry>(name),
            Err(StoreError::InvalidName(_))
        ));
        assert!(matches!(
            store.save(name, &[entry(1, "x")]),
            Err(StoreError::InvalidName(_))
        ));
    }
}

#[cfg(unix)]
#[test]
fn failed_save_leaves_previous_file_intact() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());
    store.save("entries", &[entry(1, "keep")]).unwrap();

    fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o555)).unwrap();
    // Permission bits do not bind every user (root ignores them); probe
    // first so the assertion only runs when writes actually fail.
    if fs::write(dir.path().join(".probe"), b"x").is_ok() {
        fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let result = store.save("entries", &[entry(2, "lost")]);
    fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o755)).unwrap();

    assert!(matches!(result, Err(StoreError::Io { .. })));
    let loaded: Vec<Entry> = store.load("entries").unwrap();
    assert_eq!(loaded, vec![entry(1, "keep")]);

    // the failed attempt must not leave temp files behind
    let mut names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["entries.json".to_string()]);
}

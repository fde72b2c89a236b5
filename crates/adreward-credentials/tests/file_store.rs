//! Integration tests for the file-backed credential store.
//!
//! Each test works in its own scratch directory under the system temp dir,
//! named with a random suffix so parallel test threads never collide.

use std::path::PathBuf;

use adreward_credentials::{
    CredentialError, CredentialStore, Credentials, FileCredentialStore,
};
use adreward_protocol::Role;

/// Creates a fresh scratch directory and returns a store path inside it.
fn scratch_path(name: &str) -> PathBuf {
    let suffix: u64 = rand::random();
    let dir = std::env::temp_dir().join(format!("adreward-creds-{suffix:016x}"));
    std::fs::create_dir_all(&dir).expect("scratch dir");
    dir.join(name)
}

#[test]
fn test_load_missing_file_returns_none() {
    let store = FileCredentialStore::new(scratch_path("absent.json"));
    assert!(store.load().expect("load").is_none());
}

#[test]
fn test_save_then_load_round_trips_token_and_role() {
    let store = FileCredentialStore::new(scratch_path("creds.json"));
    let creds = Credentials::new("tok-123", Role::Admin).unwrap();

    store.save(&creds).expect("save");
    let loaded = store.load().expect("load").expect("present");

    assert_eq!(loaded.token, "tok-123");
    assert!(loaded.role.is_admin());
}

#[test]
fn test_save_creates_missing_parent_directories() {
    let path = scratch_path("nested").join("deeper").join("creds.json");
    let store = FileCredentialStore::new(&path);

    store
        .save(&Credentials::new("t", Role::User).unwrap())
        .expect("save");

    assert!(path.exists());
}

#[test]
fn test_file_contents_are_plain_json() {
    let store = FileCredentialStore::new(scratch_path("creds.json"));
    store
        .save(&Credentials::new("abc", Role::User).unwrap())
        .unwrap();

    let raw = std::fs::read_to_string(store.path()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["token"], "abc");
    assert_eq!(value["role"], "user");
}

#[test]
fn test_clear_removes_file_and_is_idempotent() {
    let store = FileCredentialStore::new(scratch_path("creds.json"));
    store
        .save(&Credentials::new("abc", Role::User).unwrap())
        .unwrap();

    store.clear().expect("first clear");
    assert!(!store.path().exists());
    store.clear().expect("second clear");
    assert!(matches!(store.require(), Err(CredentialError::Missing)));
}

#[test]
fn test_load_garbage_returns_malformed() {
    let path = scratch_path("creds.json");
    std::fs::write(&path, b"{ not json").unwrap();

    let result = FileCredentialStore::new(&path).load();
    assert!(matches!(result, Err(CredentialError::Malformed(_))));
}

#[test]
fn test_load_blank_token_on_disk_returns_empty_token() {
    let path = scratch_path("creds.json");
    std::fs::write(&path, br#"{"token":"","role":"user"}"#).unwrap();

    let result = FileCredentialStore::new(&path).load();
    assert!(matches!(result, Err(CredentialError::EmptyToken)));
}

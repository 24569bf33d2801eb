//! Lifecycle Tests
//!
//! Tests for scoped acquisition and the session-level dirty sweep.

use crate::*;

/// Acquiring a missing file starts empty and dirty; release writes it
#[test]
fn test_acquire_creates_file_on_release() {
    let scope = Scope::new();
    test_across_save_modes(&scope, |session, dir| {
        let path = session.resolve_path(dir.path().join("fresh"));
        {
            let guard = session.acquire(&path).unwrap();
            assert!(guard.is_empty());
            assert!(guard.is_dirty());
        }
        assert!(path.is_file());
        assert!(session.registry().is_empty());
    });
}

/// Acquiring an existing file loads it immediately
#[test]
fn test_acquire_loads_existing_file() {
    let scope = Scope::new();
    test_across_save_modes(&scope, |session, dir| {
        let mut store = session.open(dir.path().join("existing"));
        store.update([("x", Value::Int(42))], true).unwrap();
        store.save().unwrap();

        let guard = session.acquire(dir.path().join("existing")).unwrap();
        assert_eq!(*guard.get("x").unwrap(), Value::Int(42));
    });
}

/// Changes made through the guard are on disk after the scope ends
#[test]
fn test_guard_saves_changes_on_drop() {
    let scope = Scope::new();
    test_across_save_modes(&scope, |session, dir| {
        {
            let mut guard = session.acquire(dir.path().join("g")).unwrap();
            let v = scope.bind("v", "stored");
            guard.add(&v).unwrap();
        }

        let mut reread = session.open(dir.path().join("g"));
        reread.load().unwrap();
        assert_eq!(*reread.get("v").unwrap(), Value::from("stored"));
    });
}

/// A failing release is swallowed
#[test]
fn test_guard_drop_never_panics_on_save_failure() {
    let (session, _scope) = isolated_session();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nowhere").join("x");

    {
        let mut guard = session.acquire(&path).unwrap();
        guard.update([("a", Value::Int(1))], true).unwrap();
    }
    assert_eq!(session.dirty_paths(), vec![session.resolve_path(&path)]);
}

/// Explicit release surfaces the save result
#[test]
fn test_explicit_release() {
    let (session, _scope) = isolated_session();
    let dir = tempfile::tempdir().unwrap();

    let guard = session.acquire(dir.path().join("ok")).unwrap();
    guard.release().unwrap();
    assert!(session.registry().is_empty());

    let guard = session.acquire(dir.path().join("nope").join("x")).unwrap();
    assert!(guard.release().is_err());
}

/// The sweep persists what is on disk and clears the registry
#[test]
fn test_sweep_saves_every_dirty_path() {
    let scope = Scope::new();
    test_across_save_modes(&scope, |session, dir| {
        for name in ["one", "two", "three"] {
            let mut store = session.open(dir.path().join(name));
            store.update([(name, Value::from(name))], true).unwrap();
            store.save().unwrap();
            store.load().unwrap();
        }
        assert_eq!(session.dirty_paths().len(), 3);

        let report = session.save_all_open();
        assert!(report.is_clean());
        assert_eq!(report.saved.len(), 3);
        assert!(session.dirty_paths().is_empty());
    });
}

/// A path that was never written is reported, left dirty, and does not
/// stop the rest of the sweep
#[test]
fn test_sweep_is_best_effort() {
    let (session, _scope) = isolated_session();
    let dir = tempfile::tempdir().unwrap();

    let mut ghost = session.open(dir.path().join("ghost"));
    ghost.update([("g", Value::Int(1))], true).unwrap();

    let mut real = session.open(dir.path().join("real"));
    real.update([("r", Value::Int(1))], true).unwrap();
    real.save().unwrap();
    real.clear();

    let report = session.save_all_open();
    assert!(!report.is_clean());
    assert_eq!(report.saved, vec![real.path().to_path_buf()]);
    assert_eq!(report.failed.len(), 1);
    assert!(!dir.path().join("ghost.db").exists());
    assert_eq!(session.dirty_paths(), vec![ghost.path().to_path_buf()]);
}

/// Sessions sharing a registry see each other's dirty paths
#[test]
fn test_sessions_can_share_a_registry() {
    let registry = DirtyRegistry::new();
    let first = Session::builder()
        .registry(registry.clone())
        .default_scope(Scope::new())
        .build();
    let second = Session::builder()
        .registry(registry.clone())
        .default_scope(Scope::new())
        .build();
    let dir = tempfile::tempdir().unwrap();

    let mut store = first.open(dir.path().join("s"));
    store.update([("k", Value::Int(1))], true).unwrap();
    store.save().unwrap();
    store.clear();

    let report = second.save_all_open();
    assert_eq!(report.saved.len(), 1);
    assert!(first.dirty_paths().is_empty());
}

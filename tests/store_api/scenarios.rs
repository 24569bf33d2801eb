//! Store Operation Scenarios
//!
//! Tests for the in-memory operations:
//! - identity resolution (add, delete, replace)
//! - explicit names (add_by_name, delete_by_name, delete_key)
//! - update / get / clear

use crate::*;

/// Adding a value nobody bound fails with a name-resolution error
#[test]
fn test_add_without_binding_fails() {
    let (session, _scope) = isolated_session();
    let dir = tempfile::tempdir().unwrap();
    let mut store = session.open(dir.path().join("test"));

    let err = store.add(&Arc::new(Value::Int(123))).unwrap_err();
    assert!(err.is_name_resolution());
    assert!(err.to_string().contains("could not determine variable name"));
    assert!(store.is_empty());
}

/// A bound value is stored under its binding name
#[test]
fn test_add_bound_value() {
    let (session, scope) = isolated_session();
    let dir = tempfile::tempdir().unwrap();
    let mut store = session.open(dir.path().join("test"));

    let x_val = scope.bind("x_val", 100);
    store.add(&x_val).unwrap();

    assert_eq!(*store.get("x_val").unwrap(), Value::Int(100));
}

/// Equal-but-distinct values do not resolve
#[test]
fn test_add_equal_value_from_elsewhere_fails() {
    let (session, scope) = isolated_session();
    let dir = tempfile::tempdir().unwrap();
    let mut store = session.open(dir.path().join("test"));

    scope.bind("x_val", 100);
    let copy = Arc::new(Value::Int(100));
    assert!(store.add(&copy).unwrap_err().is_name_resolution());
}

/// add_multiple populates every resolvable value
#[test]
fn test_add_multiple() {
    let scope: Scope = [("a", 1), ("b", 2)].into_iter().collect();
    let session = Session::builder().default_scope(scope.clone()).build();
    let dir = tempfile::tempdir().unwrap();
    let mut store = session.open(dir.path().join("test"));

    let a = scope.lookup("a").unwrap();
    let b = scope.lookup("b").unwrap();
    assert_eq!(store.add_multiple([&a, &b]), 2);

    assert_eq!(*store.get("a").unwrap(), Value::Int(1));
    assert_eq!(*store.get("b").unwrap(), Value::Int(2));
}

/// A binding with an empty name never reaches the store
#[test]
fn test_empty_binding_name_is_rejected() {
    let (session, scope) = isolated_session();
    let dir = tempfile::tempdir().unwrap();
    let mut store = session.open(dir.path().join("test"));

    let anon = scope.bind("", 5);
    assert!(matches!(store.add(&anon).unwrap_err(), Error::InvalidName(_)));
    assert!(matches!(
        store.add_by_name("").unwrap_err(),
        Error::InvalidName(_)
    ));
    assert!(store.is_empty());
    assert!(!store.is_dirty());
    assert!(session.dirty_paths().is_empty());
}

/// The second add of the same binding is a duplicate
#[test]
fn test_add_is_not_idempotent() {
    let (session, scope) = isolated_session();
    let dir = tempfile::tempdir().unwrap();
    let mut store = session.open(dir.path().join("test"));

    let v = scope.bind("v", "payload");
    store.add(&v).unwrap();
    assert!(store.add(&v).unwrap_err().is_duplicate());
}

/// Shared allocations resolve to the earliest binding
#[test]
fn test_identity_resolution_first_match_wins() {
    let (session, scope) = isolated_session();
    let dir = tempfile::tempdir().unwrap();
    let mut store = session.open(dir.path().join("test"));

    let shared = Arc::new(Value::from("same object"));
    scope.bind_shared("alias_one", Arc::clone(&shared));
    scope.bind_shared("alias_two", Arc::clone(&shared));

    assert_eq!(store.add(&shared).unwrap(), "alias_one");
    assert!(store.add(&shared).unwrap_err().is_duplicate());
}

/// Deleting a name that was never stored is not-found
#[test]
fn test_delete_non_existing_name() {
    let (session, _scope) = isolated_session();
    let dir = tempfile::tempdir().unwrap();
    let mut store = session.open(dir.path().join("test"));

    assert!(store.delete_by_name("temp").unwrap_err().is_not_found());
}

/// Deleting by a non-string key is a type error, never a silent no-op
#[test]
fn test_delete_with_invalid_key_type() {
    let (session, _scope) = isolated_session();
    let dir = tempfile::tempdir().unwrap();
    let mut store = session.open(dir.path().join("test"));
    store.update([("123", Value::Int(1))], true).unwrap();

    let err = store.delete_key(&Value::Int(123)).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));
    assert!(!err.is_not_found());
    assert!(store.contains("123"));
}

/// After delete, the name is gone and deleting again fails
#[test]
fn test_delete_then_membership() {
    let (session, scope) = isolated_session();
    let dir = tempfile::tempdir().unwrap();
    let mut store = session.open(dir.path().join("test"));

    let v = scope.bind("v", 3.5);
    store.add(&v).unwrap();
    store.delete(&v).unwrap();

    assert!(!store.contains("v"));
    assert!(store.delete(&v).unwrap_err().is_not_found());
}

/// Replace updates an existing entry from a rebinding
#[test]
fn test_replace_after_rebind() {
    let (session, scope) = isolated_session();
    let dir = tempfile::tempdir().unwrap();
    let mut store = session.open(dir.path().join("test"));

    let counter = scope.bind("counter", 1);
    store.add(&counter).unwrap();

    let counter = scope.bind("counter", 2);
    store.replace(&counter).unwrap();
    assert_eq!(*store.get("counter").unwrap(), Value::Int(2));
}

/// Replace never creates
#[test]
fn test_replace_missing_entry() {
    let (session, scope) = isolated_session();
    let dir = tempfile::tempdir().unwrap();
    let mut store = session.open(dir.path().join("test"));

    let fresh = scope.bind("fresh", true);
    assert!(store.replace(&fresh).unwrap_err().is_not_found());
    assert!(store.is_empty());
}

/// add_by_name copies the binding at call time
#[test]
fn test_add_by_name_snapshots_binding() {
    let (session, scope) = isolated_session();
    let dir = tempfile::tempdir().unwrap();
    let mut store = session.open(dir.path().join("test"));

    scope.bind("name", "before");
    store.add_by_name("name").unwrap();
    scope.bind("name", "after");

    assert_eq!(*store.get("name").unwrap(), Value::from("before"));
    assert!(store.add_by_name("unbound").unwrap_err().is_not_found());
}

/// Overwrite and preserve modes of update
#[test]
fn test_update_modes() {
    let (session, _scope) = isolated_session();
    let dir = tempfile::tempdir().unwrap();
    let mut store = session.open(dir.path().join("test"));

    store
        .update([("keep", Value::Int(1)), ("swap", Value::Int(1))], true)
        .unwrap();
    store
        .update([("keep", Value::Int(9)), ("new", Value::Int(9))], false)
        .unwrap();
    assert_eq!(*store.get("keep").unwrap(), Value::Int(1));
    assert_eq!(*store.get("new").unwrap(), Value::Int(9));

    store.update([("swap", Value::Int(2))], true).unwrap();
    assert_eq!(*store.get("swap").unwrap(), Value::Int(2));
}

/// Lookup with a default never fails; require does
#[test]
fn test_get_default_and_require() {
    let (session, _scope) = isolated_session();
    let dir = tempfile::tempdir().unwrap();
    let store = session.open(dir.path().join("test"));

    assert_eq!(*store.get_or("missing", Value::Int(7)), Value::Int(7));
    assert!(store.require("missing").unwrap_err().is_not_found());
}

/// Clear empties and marks dirty
#[test]
fn test_clear() {
    let (session, _scope) = isolated_session();
    let dir = tempfile::tempdir().unwrap();
    let mut store = session.open(dir.path().join("test"));
    store.update([("a", Value::Null)], true).unwrap();
    store.save().unwrap();

    store.clear();
    assert!(store.is_empty());
    assert!(store.is_dirty());
}

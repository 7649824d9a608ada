use super::*;

use std::cell::Cell;

use crate::storage::MemoryStore;

fn session() -> SessionAuth<MemoryStore> {
    SessionAuth::new(MemoryStore::isolated(), &GateConfig::default())
}

// =============================================================
// Authentication flag
// =============================================================

#[test]
fn new_session_is_unauthenticated() {
    assert!(!session().is_authenticated());
}

#[test]
fn set_authenticated_round_trip() {
    let auth = session();
    auth.set_authenticated(true).unwrap();
    assert!(auth.is_authenticated());
    auth.set_authenticated(false).unwrap();
    assert!(!auth.is_authenticated());
    assert_eq!(auth.storage().get(&GateConfig::default().session_auth_key), Ok(None));
}

#[test]
fn non_true_values_are_not_authenticated() {
    let auth = session();
    let key = GateConfig::default().session_auth_key;
    for value in ["TRUE", "1", "yes", "true ", ""] {
        auth.storage().set(&key, value).unwrap();
        assert!(!auth.is_authenticated(), "{value:?}");
    }
}

#[test]
fn unreadable_session_is_unauthenticated() {
    let auth = session();
    auth.set_authenticated(true).unwrap();
    auth.storage().area().set_fail_reads(true);
    assert!(!auth.is_authenticated());
}

#[test]
fn listeners_see_every_change() {
    let auth = session();
    let last = Rc::new(Cell::new(None));
    let sink = Rc::clone(&last);
    auth.on_change(move |value| sink.set(Some(value)));

    auth.set_authenticated(true).unwrap();
    assert_eq!(last.get(), Some(true));
    auth.set_authenticated(false).unwrap();
    assert_eq!(last.get(), Some(false));
}

#[test]
fn failed_write_does_not_notify() {
    let auth = session();
    let calls = Rc::new(Cell::new(0));
    let sink = Rc::clone(&calls);
    auth.on_change(move |_| sink.set(sink.get() + 1));
    auth.storage().area().set_fail_writes(true);

    assert!(auth.set_authenticated(true).is_err());
    assert_eq!(calls.get(), 0);
}

// =============================================================
// Intended path
// =============================================================

#[test]
fn pop_without_stored_path_returns_home() {
    assert_eq!(session().pop_intended_path(), "/");
}

#[test]
fn pop_is_read_once() {
    let auth = session();
    auth.set_intended_path("/shop?x=1#y").unwrap();
    assert_eq!(auth.pop_intended_path(), "/shop?x=1#y");
    assert_eq!(auth.pop_intended_path(), "/");
}

#[test]
fn later_set_replaces_earlier_path() {
    let auth = session();
    auth.set_intended_path("/a").unwrap();
    auth.set_intended_path("/b").unwrap();
    assert_eq!(auth.pop_intended_path(), "/b");
}

#[test]
fn empty_stored_path_falls_back_to_home() {
    let auth = session();
    auth.set_intended_path("").unwrap();
    assert_eq!(auth.pop_intended_path(), "/");
}

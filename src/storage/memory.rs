//! In-process storage backend.
//!
//! A [`MemoryArea`] plays the role of one browser storage area (the origin's
//! `localStorage`, or one tab's `sessionStorage`). Each [`MemoryStore`] handle
//! is one tab's view onto an area. Writes are announced to listeners that
//! were registered through *other* handles, matching the browser rule that a
//! tab never receives `storage` events for its own writes.

#[cfg(test)]
#[path = "memory_test.rs"]
mod memory_test;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use super::{ChangeCallback, KeyValueStore, StorageError};

struct Listener {
    owner: u64,
    key: String,
    callback: Rc<dyn Fn(Option<String>)>,
}

#[derive(Default)]
struct AreaInner {
    values: RefCell<HashMap<String, String>>,
    listeners: RefCell<Vec<Listener>>,
    next_handle: Cell<u64>,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
}

/// Shared storage area; clone to share.
#[derive(Clone, Default)]
pub struct MemoryArea {
    inner: Rc<AreaInner>,
}

impl MemoryArea {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new handle (one per browsing context) onto this area.
    #[must_use]
    pub fn open(&self) -> MemoryStore {
        let id = self.inner.next_handle.get();
        self.inner.next_handle.set(id + 1);
        MemoryStore { area: self.clone(), id }
    }

    /// Make every subsequent read fail, simulating a blocked storage area.
    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.fail_reads.set(fail);
    }

    /// Make every subsequent write fail, simulating an exhausted quota.
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.set(fail);
    }

    /// Raw value currently stored under `key`, bypassing failure injection.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<String> {
        self.inner.values.borrow().get(key).cloned()
    }

    fn notify(&self, writer: u64, key: &str, value: Option<String>) {
        // Collect first so callbacks may write to the area again.
        let targets: Vec<Rc<dyn Fn(Option<String>)>> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .filter(|l| l.owner != writer && l.key == key)
            .map(|l| Rc::clone(&l.callback))
            .collect();
        for callback in targets {
            callback(value.clone());
        }
    }
}

/// One browsing context's handle onto a [`MemoryArea`].
#[derive(Clone)]
pub struct MemoryStore {
    area: MemoryArea,
    id: u64,
}

impl MemoryStore {
    /// Convenience for a private area with a single handle.
    #[must_use]
    pub fn isolated() -> Self {
        MemoryArea::new().open()
    }

    #[must_use]
    pub fn area(&self) -> &MemoryArea {
        &self.area
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.area.inner.fail_reads.get() {
            return Err(StorageError::Read { key: key.to_owned(), reason: "read blocked".to_owned() });
        }
        Ok(self.area.peek(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.area.inner.fail_writes.get() {
            return Err(StorageError::Write { key: key.to_owned(), reason: "quota exceeded".to_owned() });
        }
        self.area
            .inner
            .values
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        self.area.notify(self.id, key, Some(value.to_owned()));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.area.inner.fail_writes.get() {
            return Err(StorageError::Write { key: key.to_owned(), reason: "quota exceeded".to_owned() });
        }
        let removed = self.area.inner.values.borrow_mut().remove(key);
        if removed.is_some() {
            self.area.notify(self.id, key, None);
        }
        Ok(())
    }

    fn on_external_change(&self, key: &str, callback: ChangeCallback) {
        self.area.inner.listeners.borrow_mut().push(Listener {
            owner: self.id,
            key: key.to_owned(),
            callback: Rc::from(callback),
        });
    }
}

//! Per-tab admin authentication flag and the "intended path" marker.
//!
//! Both live in session-scoped storage: they survive reloads of the same tab
//! but are never visible to other tabs and vanish when the tab closes.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::GateConfig;
use crate::storage::{KeyValueStore, StorageError};

const AUTHENTICATED: &str = "true";

type AuthListener = Rc<dyn Fn(bool)>;

pub struct SessionAuth<S> {
    storage: S,
    auth_key: String,
    intended_key: String,
    home_path: String,
    listeners: RefCell<Vec<AuthListener>>,
}

impl<S: KeyValueStore> SessionAuth<S> {
    pub fn new(storage: S, config: &GateConfig) -> Self {
        Self {
            storage,
            auth_key: config.session_auth_key.clone(),
            intended_key: config.intended_path_key.clone(),
            home_path: config.home_path.clone(),
            listeners: RefCell::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// `true` only when the session slot holds exactly `"true"`. Unreadable
    /// storage counts as not authenticated.
    pub fn is_authenticated(&self) -> bool {
        match self.storage.get(&self.auth_key) {
            Ok(value) => value.as_deref() == Some(AUTHENTICATED),
            Err(e) => {
                log::warn!("site-gate: session flag unreadable: {e}");
                false
            }
        }
    }

    /// Set or clear the flag, then notify bound UI.
    ///
    /// # Errors
    ///
    /// Returns the [`StorageError`] when the session slot cannot be written;
    /// listeners are not notified in that case.
    pub fn set_authenticated(&self, value: bool) -> Result<(), StorageError> {
        if value {
            self.storage.set(&self.auth_key, AUTHENTICATED)?;
        } else {
            self.storage.remove(&self.auth_key)?;
        }
        let listeners: Vec<AuthListener> = self.listeners.borrow().iter().map(Rc::clone).collect();
        for listener in listeners {
            listener(value);
        }
        Ok(())
    }

    /// Register a re-render hook called after every successful
    /// [`SessionAuth::set_authenticated`].
    pub fn on_change(&self, listener: impl Fn(bool) + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Remember where the visitor was headed before being held back.
    ///
    /// # Errors
    ///
    /// Returns the [`StorageError`] when the session slot cannot be written.
    pub fn set_intended_path(&self, path: &str) -> Result<(), StorageError> {
        self.storage.set(&self.intended_key, path)
    }

    /// Read and clear the intended path in one step. Falls back to the home
    /// path when nothing (or an empty value) was stored.
    pub fn pop_intended_path(&self) -> String {
        let stored = match self.storage.get(&self.intended_key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("site-gate: intended path unreadable: {e}");
                None
            }
        };
        if stored.is_some() {
            if let Err(e) = self.storage.remove(&self.intended_key) {
                log::warn!("site-gate: could not clear intended path: {e}");
            }
        }
        stored
            .filter(|path| !path.is_empty())
            .unwrap_or_else(|| self.home_path.clone())
    }
}

//! Key/value storage capability shared by durable and session state.
//!
//! DESIGN
//! ======
//! Settings and the per-tab auth flag are both plain string slots. They only
//! differ in how long the value lives and whether writes from other tabs are
//! announced, so both are modeled as instances of [`KeyValueStore`] instead of
//! special-casing either one.

pub mod memory;
#[cfg(feature = "hydrate")]
pub mod web;

pub use memory::{MemoryArea, MemoryStore};
#[cfg(feature = "hydrate")]
pub use web::WebStorage;

/// Callback invoked with the new raw value (or `None` when removed) after
/// another browsing context writes a watched key.
pub type ChangeCallback = Box<dyn Fn(Option<String>)>;

/// Error returned by [`KeyValueStore`] operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// The backing storage area could not be obtained at all.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// Reading `key` failed.
    #[error("failed to read `{key}`: {reason}")]
    Read { key: String, reason: String },
    /// Writing or removing `key` failed (includes quota exhaustion).
    #[error("failed to write `{key}`: {reason}")]
    Write { key: String, reason: String },
}

/// Minimal string storage capability.
///
/// Implementations never notify listeners about their own writes; only
/// writes made through another handle onto the same area are reported.
pub trait KeyValueStore {
    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] when the backend refuses the read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] when the backend refuses the write.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key` if present.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] when the backend refuses the removal.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Watch `key` for writes made by other browsing contexts.
    fn on_external_change(&self, key: &str, callback: ChangeCallback);
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }

    fn on_external_change(&self, key: &str, callback: ChangeCallback) {
        (**self).on_external_change(key, callback);
    }
}

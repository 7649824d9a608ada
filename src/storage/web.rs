//! `localStorage` / `sessionStorage` backend. Requires a browser environment.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

use super::{ChangeCallback, KeyValueStore, StorageError};

/// Which browser storage area a [`WebStorage`] wraps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageArea {
    Local,
    Session,
}

/// A `web_sys::Storage` area behind the [`KeyValueStore`] capability.
#[derive(Clone)]
pub struct WebStorage {
    area: StorageArea,
    storage: web_sys::Storage,
}

impl WebStorage {
    /// Open the origin's durable `localStorage`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] when there is no window or the
    /// browser denies access (privacy mode, sandboxed frame).
    pub fn local() -> Result<Self, StorageError> {
        Self::open(StorageArea::Local)
    }

    /// Open this tab's `sessionStorage`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] as for [`WebStorage::local`].
    pub fn session() -> Result<Self, StorageError> {
        Self::open(StorageArea::Session)
    }

    fn open(area: StorageArea) -> Result<Self, StorageError> {
        let window = web_sys::window().ok_or_else(|| StorageError::Unavailable("no window".to_owned()))?;
        let storage = match area {
            StorageArea::Local => window.local_storage(),
            StorageArea::Session => window.session_storage(),
        };
        match storage {
            Ok(Some(storage)) => Ok(Self { area, storage }),
            Ok(None) => Err(StorageError::Unavailable(format!("{area:?} storage missing"))),
            Err(e) => Err(StorageError::Unavailable(js_reason(&e))),
        }
    }
}

fn js_reason(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

impl KeyValueStore for WebStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage
            .get_item(key)
            .map_err(|e| StorageError::Read { key: key.to_owned(), reason: js_reason(&e) })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| StorageError::Write { key: key.to_owned(), reason: js_reason(&e) })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.storage
            .remove_item(key)
            .map_err(|e| StorageError::Write { key: key.to_owned(), reason: js_reason(&e) })
    }

    fn on_external_change(&self, key: &str, callback: ChangeCallback) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let watched_key = key.to_owned();
        let own_area = self.storage.clone();
        let listener = Closure::wrap(Box::new(move |event: web_sys::StorageEvent| {
            // `key` is null when another tab calls `clear()`; treat that as a removal.
            if event.key().is_some_and(|k| k != watched_key) {
                return;
            }
            let own: &JsValue = own_area.as_ref();
            let same_area = event.storage_area().is_some_and(|area| {
                let area: &JsValue = area.as_ref();
                area == own
            });
            if !same_area {
                return;
            }
            callback(event.new_value());
        }) as Box<dyn FnMut(web_sys::StorageEvent)>);

        if let Err(e) = window.add_event_listener_with_callback("storage", listener.as_ref().unchecked_ref()) {
            log::warn!("site-gate: could not watch {:?} storage key `{key}`: {}", self.area, js_reason(&e));
            return;
        }
        // Listeners live for the whole tab.
        listener.forget();
    }
}

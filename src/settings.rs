//! Durable, profile-wide gate settings.
//!
//! SYSTEM CONTEXT
//! ==============
//! One JSON record under the configured settings key, shared by every tab.
//! Reads never fail from the caller's point of view: an absent record is
//! materialized from defaults, and an unreadable or malformed one is logged
//! and replaced wholesale. Writes do fail loudly, because an operator change
//! that silently does not persist is worse than an error.

#[cfg(test)]
#[path = "settings_test.rs"]
mod settings_test;

use serde::{Deserialize, Serialize};

use crate::config::GateConfig;
use crate::storage::{KeyValueStore, StorageError};

/// Persisted operator settings.
///
/// Every field is required on the wire; a record missing any of them counts
/// as malformed and is replaced by defaults as a whole.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub password: String,
    pub maintenance_enabled: bool,
    pub maintenance_message: String,
}

impl Settings {
    #[must_use]
    pub fn defaults(config: &GateConfig) -> Self {
        Self {
            password: config.default_password.clone(),
            maintenance_enabled: false,
            maintenance_message: config.default_message.clone(),
        }
    }

    /// Message to show on the maintenance page, falling back to the built-in
    /// default when the operator left it empty.
    #[must_use]
    pub fn display_message<'a>(&'a self, config: &'a GateConfig) -> &'a str {
        let trimmed = self.maintenance_message.trim();
        if trimmed.is_empty() { &config.default_message } else { trimmed }
    }

    fn merged(mut self, patch: SettingsPatch) -> Self {
        if let Some(password) = patch.password {
            self.password = password;
        }
        if let Some(enabled) = patch.maintenance_enabled {
            self.maintenance_enabled = enabled;
        }
        if let Some(message) = patch.maintenance_message {
            self.maintenance_message = message;
        }
        self
    }
}

/// Partial update; `None` fields keep their stored value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub password: Option<String>,
    pub maintenance_enabled: Option<bool>,
    pub maintenance_message: Option<String>,
}

/// Why a stored record could not be used.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("malformed settings record: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Typed access to the settings record in a [`KeyValueStore`].
pub struct SettingsStore<S> {
    storage: S,
    key: String,
    defaults: Settings,
}

impl<S: KeyValueStore> SettingsStore<S> {
    pub fn new(storage: S, config: &GateConfig) -> Self {
        Self { storage, key: config.settings_key.clone(), defaults: Settings::defaults(config) }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Read the stored record without any defaulting.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Storage`] when the read itself fails and
    /// [`SettingsError::Malformed`] when the record does not parse.
    pub fn try_load(&self) -> Result<Option<Settings>, SettingsError> {
        let Some(raw) = self.storage.get(&self.key)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Current settings, never failing.
    ///
    /// A missing or malformed record is replaced by defaults in storage; a
    /// failed read yields defaults without touching storage.
    pub fn load(&self) -> Settings {
        match self.try_load() {
            Ok(Some(settings)) => settings,
            Ok(None) => {
                self.materialize_defaults();
                self.defaults.clone()
            }
            Err(SettingsError::Malformed(e)) => {
                log::warn!("site-gate: discarding malformed settings under `{}`: {e}", self.key);
                self.materialize_defaults();
                self.defaults.clone()
            }
            Err(SettingsError::Storage(e)) => {
                log::warn!("site-gate: settings unreadable, using defaults: {e}");
                self.defaults.clone()
            }
        }
    }

    /// Merge `patch` onto the current settings, persist, and return the result.
    ///
    /// Other tabs learn about the write through their storage listeners; the
    /// calling tab has to re-run its own dependents.
    ///
    /// # Errors
    ///
    /// Returns the [`StorageError`] when the write is refused.
    pub fn save(&self, patch: SettingsPatch) -> Result<Settings, StorageError> {
        let merged = self.load().merged(patch);
        self.write(&merged)?;
        Ok(merged)
    }

    fn write(&self, settings: &Settings) -> Result<(), StorageError> {
        let raw = serde_json::to_string(settings).map_err(|e| StorageError::Write {
            key: self.key.clone(),
            reason: e.to_string(),
        })?;
        self.storage.set(&self.key, &raw)
    }

    fn materialize_defaults(&self) {
        if let Err(e) = self.write(&self.defaults) {
            log::warn!("site-gate: could not store default settings: {e}");
        }
    }
}

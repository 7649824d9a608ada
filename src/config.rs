//! Gate configuration: navigational constants, storage keys, and defaults.
//!
//! Values are fixed by the site author, not by the operator. In the browser
//! they can be overridden through `data-gate-*` attributes on the `<html>`
//! element; everything else comes from [`GateConfig::default`].

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

use crate::gate::normalize_path;

pub const DEFAULT_MAINTENANCE_PATH: &str = "/maintenance.html";
pub const DEFAULT_HOME_PATH: &str = "/";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 7;
pub const DEFAULT_SETTINGS_KEY: &str = "site_gate_settings";
pub const DEFAULT_SESSION_AUTH_KEY: &str = "site_gate_authenticated";
pub const DEFAULT_INTENDED_PATH_KEY: &str = "site_gate_intended_path";
pub const DEFAULT_PASSWORD: &str = "mintglass";
pub const DEFAULT_MAINTENANCE_MESSAGE: &str =
    "We are currently performing scheduled maintenance. Please check back soon.";
pub const DEFAULT_MIN_PASSWORD_LEN: usize = 4;

pub const ATTR_MAINTENANCE_PATH: &str = "data-gate-maintenance-path";
pub const ATTR_HOME_PATH: &str = "data-gate-home-path";
pub const ATTR_POLL_SECS: &str = "data-gate-poll-secs";
pub const ATTR_NOTICE_URL: &str = "data-gate-notice-url";

/// Error returned by [`GateConfig::from_attributes`] and [`GateConfig::validate`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{attr} must be an absolute path, got `{value}`")]
    RelativePath { attr: &'static str, value: String },
    #[error("{attr} must be a positive number of seconds, got `{value}`")]
    InvalidPollInterval { attr: &'static str, value: String },
    #[error("maintenance path and home path both resolve to `{0}`")]
    PathsCollide(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    pub maintenance_path: String,
    pub home_path: String,
    pub poll_interval: Duration,
    pub settings_key: String,
    pub session_auth_key: String,
    pub intended_path_key: String,
    pub default_password: String,
    pub default_message: String,
    pub min_password_len: usize,
    /// Optional published notice (`{ "enabled": bool, "message": string }`).
    pub notice_url: Option<String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            maintenance_path: DEFAULT_MAINTENANCE_PATH.to_owned(),
            home_path: DEFAULT_HOME_PATH.to_owned(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            settings_key: DEFAULT_SETTINGS_KEY.to_owned(),
            session_auth_key: DEFAULT_SESSION_AUTH_KEY.to_owned(),
            intended_path_key: DEFAULT_INTENDED_PATH_KEY.to_owned(),
            default_password: DEFAULT_PASSWORD.to_owned(),
            default_message: DEFAULT_MAINTENANCE_MESSAGE.to_owned(),
            min_password_len: DEFAULT_MIN_PASSWORD_LEN,
            notice_url: None,
        }
    }
}

impl GateConfig {
    /// Build config from page attributes looked up through `lookup`.
    ///
    /// Optional:
    /// - `data-gate-maintenance-path`: default `/maintenance.html`
    /// - `data-gate-home-path`: default `/`
    /// - `data-gate-poll-secs`: default 7
    /// - `data-gate-notice-url`: no published notice when absent
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for relative paths, a zero or non-numeric poll
    /// interval, or a maintenance path equal to the home path.
    pub fn from_attributes<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = non_empty(lookup(ATTR_MAINTENANCE_PATH)) {
            config.maintenance_path = parse_path(ATTR_MAINTENANCE_PATH, path)?;
        }
        if let Some(path) = non_empty(lookup(ATTR_HOME_PATH)) {
            config.home_path = parse_path(ATTR_HOME_PATH, path)?;
        }
        if let Some(raw) = non_empty(lookup(ATTR_POLL_SECS)) {
            config.poll_interval = parse_poll_secs(raw)?;
        }
        config.notice_url = non_empty(lookup(ATTR_NOTICE_URL));

        config.validate()?;
        Ok(config)
    }

    /// Read overrides from the `<html>` element of the current document.
    ///
    /// # Errors
    ///
    /// See [`GateConfig::from_attributes`].
    #[cfg(feature = "hydrate")]
    pub fn from_document() -> Result<Self, ConfigError> {
        let root = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.document_element());
        Self::from_attributes(|attr| root.as_ref().and_then(|el| el.get_attribute(attr)))
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PathsCollide`] when the maintenance page would
    /// also be the home page, which would make the gate redirect forever.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let maintenance = normalize_path(&self.maintenance_path);
        if maintenance == normalize_path(&self.home_path) {
            return Err(ConfigError::PathsCollide(maintenance.to_owned()));
        }
        Ok(())
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

fn parse_path(attr: &'static str, value: String) -> Result<String, ConfigError> {
    if !value.starts_with('/') {
        return Err(ConfigError::RelativePath { attr, value });
    }
    Ok(value)
}

fn parse_poll_secs(value: String) -> Result<Duration, ConfigError> {
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidPollInterval { attr: ATTR_POLL_SECS, value }),
    }
}

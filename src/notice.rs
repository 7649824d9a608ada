//! Published maintenance notice (`maintenance.json`).
//!
//! SYSTEM CONTEXT
//! ==============
//! Besides the admin console, an operator can publish a static JSON file
//! (`{ "enabled": true, "message": "..." }`) next to the site. When the page
//! configures a notice URL, the gate fetches it on start and on every poll
//! tick and folds it into the local settings. The notice can only switch
//! maintenance on; it never overrides a locally enabled gate.
//!
//! ERROR HANDLING
//! ==============
//! Fetch and parse failures are logged and keep the last known notice, so a
//! flaky static host does not flap the gate.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "notice_test.rs"]
mod notice_test;

use serde::Deserialize;

use crate::settings::Settings;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct PublishedNotice {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum NoticeError {
    #[error("notice request failed: {0}")]
    Request(String),
    #[error("notice request returned status {0}")]
    Status(u16),
    #[error("malformed notice: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Parse a notice document.
///
/// # Errors
///
/// Returns [`NoticeError::Malformed`] when `raw` is not a JSON object of the
/// expected shape.
pub fn parse_notice(raw: &str) -> Result<PublishedNotice, NoticeError> {
    Ok(serde_json::from_str(raw)?)
}

/// Local settings with the published notice folded in.
#[must_use]
pub fn effective_settings(mut local: Settings, notice: Option<&PublishedNotice>) -> Settings {
    let Some(notice) = notice.filter(|n| n.enabled) else {
        return local;
    };
    local.maintenance_enabled = true;
    if let Some(message) = notice.message.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        local.maintenance_message = message.to_owned();
    }
    local
}

/// Fetch the notice at `url`, bypassing the HTTP cache.
///
/// # Errors
///
/// Returns [`NoticeError`] for network failures, non-2xx responses, and
/// malformed bodies.
#[cfg(feature = "hydrate")]
pub async fn fetch_notice(url: &str) -> Result<PublishedNotice, NoticeError> {
    let resp = gloo_net::http::Request::get(url)
        .cache(web_sys::RequestCache::NoStore)
        .send()
        .await
        .map_err(|e| NoticeError::Request(e.to_string()))?;
    if !resp.ok() {
        return Err(NoticeError::Status(resp.status()));
    }
    let body = resp.text().await.map_err(|e| NoticeError::Request(e.to_string()))?;
    parse_notice(&body)
}

/// Refresh the notice in the background and re-run the gate once it lands.
#[cfg(feature = "hydrate")]
pub fn spawn_refresh(ctx: &std::rc::Rc<crate::context::GateContext>) {
    let Some(url) = ctx.config().notice_url.clone() else {
        return;
    };
    let weak = std::rc::Rc::downgrade(ctx);
    wasm_bindgen_futures::spawn_local(async move {
        match fetch_notice(&url).await {
            Ok(notice) => {
                if let Some(ctx) = weak.upgrade() {
                    ctx.set_notice(notice);
                    ctx.evaluate();
                }
            }
            Err(e) => log::warn!("site-gate: {url}: {e}"),
        }
    });
}

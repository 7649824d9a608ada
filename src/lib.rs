//! # site-gate
//!
//! Client-side maintenance gate for a static site. An operator flips a
//! "maintenance mode" switch from the admin console and every open tab locks
//! anonymous visitors onto the maintenance page, while an authenticated admin
//! keeps browsing normally.
//!
//! SYSTEM CONTEXT
//! ==============
//! There is no server-side enforcement. Settings live in durable browser
//! storage shared by all tabs, the admin flag lives in per-tab session
//! storage, and the decision of whether to redirect is a pure function over
//! both plus the current location. Three independent triggers re-run that
//! decision: page load, a fixed-interval poll, and cross-tab storage events.
//!
//! Without the `hydrate` feature the crate builds natively with in-memory
//! storage so the full gate can be exercised under `cargo test`.

pub mod admin;
pub mod components;
pub mod config;
pub mod context;
pub mod gate;
pub mod notice;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod storage;
pub mod sync;

#[cfg(test)]
pub(crate) mod test_support;

/// Browser entry point: build the gate for this tab, evaluate it once, start
/// polling and cross-tab sync, and mount the admin console if the page has a
/// mount point for it.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    // Fails only when a logger is already installed, which is fine to keep.
    console_log::init_with_level(log::Level::Info).ok();

    let config = match config::GateConfig::from_document() {
        Ok(config) => config,
        Err(e) => {
            log::warn!("site-gate: invalid page configuration, using defaults: {e}");
            config::GateConfig::default()
        }
    };

    let ctx = match context::GateContext::in_browser(config) {
        Ok(ctx) => ctx,
        Err(e) => {
            // Fail open: without storage there is nothing to enforce.
            log::warn!("site-gate: browser storage unavailable, gate disabled: {e}");
            return;
        }
    };

    sync::CrossTabSync::install(&ctx);
    scheduler::GateScheduler::start(&ctx);
    components::admin_console::mount(&ctx);
}

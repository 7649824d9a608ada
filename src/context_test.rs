use super::*;

use crate::admin;
use crate::config::{DEFAULT_PASSWORD, DEFAULT_SETTINGS_KEY};
use crate::notice::PublishedNotice;
use crate::storage::MemoryArea;
use crate::test_support::open_tab;

const MAINT: &str = "/maintenance.html";

fn write_settings(durable: &MemoryArea, enabled: bool, message: &str) {
    let raw = serde_json::json!({
        "password": DEFAULT_PASSWORD,
        "maintenanceEnabled": enabled,
        "maintenanceMessage": message,
    });
    durable.open().set(DEFAULT_SETTINGS_KEY, &raw.to_string()).unwrap();
}

// =============================================================
// Hold back and resume
// =============================================================

#[test]
fn anonymous_visitor_is_held_back_with_intended_path() {
    let durable = MemoryArea::new();
    write_settings(&durable, true, "");
    let tab = open_tab(&durable, "/shop?x=1#y");

    assert_eq!(tab.ctx.evaluate(), GateDecision::RedirectTo(MAINT.to_owned()));
    assert_eq!(tab.nav.current(), MAINT);
    assert_eq!(
        tab.session.peek(&tab.ctx.config().intended_path_key).as_deref(),
        Some("/shop?x=1#y")
    );
    assert_eq!(tab.ctx.evaluate(), GateDecision::Stay);
}

#[test]
fn login_returns_admin_to_intended_path_once() {
    let durable = MemoryArea::new();
    write_settings(&durable, true, "");
    let tab = open_tab(&durable, "/shop?x=1#y");
    tab.ctx.evaluate();

    admin::login(&tab.ctx, DEFAULT_PASSWORD).unwrap();

    assert_eq!(tab.nav.current(), "/shop?x=1#y");
    assert_eq!(tab.ctx.session().pop_intended_path(), "/");
    assert_eq!(tab.ctx.evaluate(), GateDecision::Stay);
}

#[test]
fn maintenance_page_shows_stored_message() {
    let durable = MemoryArea::new();
    write_settings(&durable, true, "Back after lunch");
    let tab = open_tab(&durable, MAINT);

    assert_eq!(tab.ctx.evaluate(), GateDecision::Stay);
    assert_eq!(tab.nav.last_message().as_deref(), Some("Back after lunch"));
}

// =============================================================
// Fail-open
// =============================================================

#[test]
fn malformed_settings_behave_as_disabled() {
    let durable = MemoryArea::new();
    durable.open().set(DEFAULT_SETTINGS_KEY, "{\"maintenanceEnabled\":tru").unwrap();
    let tab = open_tab(&durable, "/about");

    let settings = tab.ctx.current_settings();
    assert!(!settings.maintenance_enabled);
    assert_eq!(settings.password, DEFAULT_PASSWORD);
    assert_eq!(tab.ctx.evaluate(), GateDecision::Stay);
}

#[test]
fn unreadable_settings_release_visitor_from_maintenance_page() {
    let durable = MemoryArea::new();
    write_settings(&durable, true, "");
    durable.set_fail_reads(true);
    let tab = open_tab(&durable, MAINT);

    assert_eq!(tab.ctx.evaluate(), GateDecision::RedirectTo("/".to_owned()));
}

// =============================================================
// Published notice
// =============================================================

#[test]
fn published_notice_enables_gate_without_local_change() {
    let durable = MemoryArea::new();
    let tab = open_tab(&durable, "/blog");
    assert_eq!(tab.ctx.evaluate(), GateDecision::Stay);

    tab.ctx.set_notice(PublishedNotice { enabled: true, message: Some("Deploying".to_owned()) });

    assert_eq!(tab.ctx.evaluate(), GateDecision::RedirectTo(MAINT.to_owned()));
    tab.ctx.evaluate();
    assert_eq!(tab.nav.last_message().as_deref(), Some("Deploying"));
    assert!(!tab.ctx.settings().load().maintenance_enabled);
}

// =============================================================
// Settings hooks
// =============================================================

#[test]
fn settings_listeners_receive_notified_values() {
    let durable = MemoryArea::new();
    let tab = open_tab(&durable, "/");
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    tab.ctx.on_settings_change(move |s| sink.borrow_mut().push(s.maintenance_enabled));

    tab.ctx.notify_settings(&Settings { maintenance_enabled: true, ..tab.ctx.current_settings() });

    assert_eq!(*seen.borrow(), vec![true]);
}

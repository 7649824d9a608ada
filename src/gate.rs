//! Maintenance gate state machine.
//!
//! DESIGN
//! ======
//! The machine keeps no state between calls. Every evaluation derives its row
//! from three inputs (maintenance enabled, tab authenticated, currently on the
//! maintenance page) and [`plan`] maps that row to a [`Transition`] without
//! touching storage or the browser. [`evaluate`] then performs the
//! transition's side effects and reports the resulting [`GateDecision`].
//!
//! | enabled | authenticated | on maintenance page | transition                 |
//! |---------|---------------|---------------------|----------------------------|
//! | false   | any           | true                | [`Transition::LeaveMaintenance`] |
//! | false   | any           | false               | [`Transition::Stay`]       |
//! | true    | false         | false               | [`Transition::HoldBack`]   |
//! | true    | false         | true                | [`Transition::ShowMessage`] |
//! | true    | true          | true                | [`Transition::Resume`]     |
//! | true    | true          | false               | [`Transition::Stay`]       |
//!
//! Every redirect lands on a row whose transition does not navigate, so a
//! second evaluation after arrival always stays.

#[cfg(test)]
#[path = "gate_test.rs"]
mod gate_test;

use crate::config::GateConfig;
use crate::session::SessionAuth;
use crate::settings::Settings;
use crate::storage::KeyValueStore;

/// Browser-facing collaborator: where are we, go elsewhere, show the message.
pub trait Navigator {
    fn location(&self) -> Location;
    fn navigate(&self, target: &str);
    fn show_message(&self, message: &str);
}

/// Current page location split the way `window.location` exposes it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    /// Query string including the leading `?`, or empty.
    pub search: String,
    /// Fragment including the leading `#`, or empty.
    pub hash: String,
}

impl Location {
    /// Split a path-relative URL (`/shop?x=1#y`) into its parts.
    #[must_use]
    pub fn parse(target: &str) -> Self {
        let (rest, hash) = match target.find('#') {
            Some(idx) => (&target[..idx], &target[idx..]),
            None => (target, ""),
        };
        let (path, search) = match rest.find('?') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };
        Self { path: path.to_owned(), search: search.to_owned(), hash: hash.to_owned() }
    }

    /// Path, query and fragment concatenated back together.
    #[must_use]
    pub fn full_path(&self) -> String {
        format!("{}{}{}", self.path, self.search, self.hash)
    }
}

/// Strip trailing slashes; the bare root stays `/`.
#[must_use]
pub fn normalize_path(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

/// Outcome of one evaluation. Never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateDecision {
    Stay,
    RedirectTo(String),
}

/// Row-level conclusion of the transition table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Page view is permitted as is.
    Stay,
    /// Visitor is on the maintenance page while maintenance is on: stay and
    /// refresh the displayed message.
    ShowMessage,
    /// Maintenance is off but the visitor sits on the maintenance page.
    LeaveMaintenance,
    /// Anonymous visitor during maintenance: remember `intended`, send to the
    /// maintenance page.
    HoldBack { intended: String },
    /// Authenticated admin on the maintenance page: send back to the intended
    /// path.
    Resume,
}

impl Transition {
    #[must_use]
    pub fn navigates(&self) -> bool {
        matches!(self, Self::LeaveMaintenance | Self::HoldBack { .. } | Self::Resume)
    }
}

/// Pure transition table over `(settings, authenticated, location)`.
#[must_use]
pub fn plan(settings: &Settings, authenticated: bool, location: &Location, config: &GateConfig) -> Transition {
    let on_maintenance_page = normalize_path(&location.path) == normalize_path(&config.maintenance_path);

    match (settings.maintenance_enabled, authenticated, on_maintenance_page) {
        (false, _, true) => Transition::LeaveMaintenance,
        (false, _, false) | (true, true, false) => Transition::Stay,
        (true, false, false) => Transition::HoldBack { intended: location.full_path() },
        (true, false, true) => Transition::ShowMessage,
        (true, true, true) => Transition::Resume,
    }
}

/// Run one gate evaluation: plan the transition, apply its side effects
/// (intended-path bookkeeping, message refresh, navigation), and return the
/// decision.
pub fn evaluate<S: KeyValueStore>(
    settings: &Settings,
    session: &SessionAuth<S>,
    navigator: &dyn Navigator,
    config: &GateConfig,
) -> GateDecision {
    let location = navigator.location();
    let transition = plan(settings, session.is_authenticated(), &location, config);
    if transition.navigates() {
        log::debug!("site-gate: {} -> {transition:?}", location.full_path());
    }

    let decision = match transition {
        Transition::Stay => GateDecision::Stay,
        Transition::ShowMessage => {
            navigator.show_message(settings.display_message(config));
            GateDecision::Stay
        }
        Transition::LeaveMaintenance => GateDecision::RedirectTo(config.home_path.clone()),
        Transition::HoldBack { intended } => {
            if let Err(e) = session.set_intended_path(&intended) {
                log::warn!("site-gate: could not remember intended path `{intended}`: {e}");
            }
            GateDecision::RedirectTo(config.maintenance_path.clone())
        }
        Transition::Resume => GateDecision::RedirectTo(resume_target(session.pop_intended_path(), config)),
    };

    if let GateDecision::RedirectTo(target) = &decision {
        navigator.navigate(target);
    }
    decision
}

/// A stored intended path pointing back at the maintenance page would bounce
/// the admin straight back; send them home instead.
fn resume_target(popped: String, config: &GateConfig) -> String {
    let target = Location::parse(&popped);
    if normalize_path(&target.path) == normalize_path(&config.maintenance_path) {
        return config.home_path.clone();
    }
    popped
}

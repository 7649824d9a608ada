//! Tab-lifetime gate context.
//!
//! DESIGN
//! ======
//! Everything a gate evaluation needs (config, both stores, the navigator,
//! the poll ticker, the last published notice, and the admin UI's settings
//! hooks) is owned by one [`GateContext`] created at tab start and shared as
//! `Rc<GateContext>`. Once [`GateScheduler::start`] runs, the poll interval
//! keeps the context alive for the rest of the tab; storage callbacks and
//! notice fetches only hold a `Weak`.

#[cfg(test)]
#[path = "context_test.rs"]
mod context_test;

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::GateConfig;
use crate::gate::{self, GateDecision, Navigator};
use crate::notice::{PublishedNotice, effective_settings};
use crate::scheduler::{GateScheduler, Ticker};
use crate::session::SessionAuth;
use crate::settings::{Settings, SettingsStore};
use crate::storage::KeyValueStore;

pub type DynStore = Box<dyn KeyValueStore>;

type SettingsListener = Rc<dyn Fn(&Settings)>;

pub struct GateContext {
    config: GateConfig,
    settings: SettingsStore<DynStore>,
    session: SessionAuth<DynStore>,
    navigator: Rc<dyn Navigator>,
    ticker: Box<dyn Ticker>,
    pub(crate) scheduler: GateScheduler,
    notice: RefCell<Option<PublishedNotice>>,
    settings_listeners: RefCell<Vec<SettingsListener>>,
}

impl GateContext {
    /// Assemble the context for one tab. Nothing is evaluated yet; start the
    /// [`GateScheduler`] for the initial evaluation.
    pub fn init(
        config: GateConfig,
        durable: DynStore,
        session: DynStore,
        navigator: Rc<dyn Navigator>,
        ticker: Box<dyn Ticker>,
    ) -> Rc<Self> {
        Rc::new(Self {
            settings: SettingsStore::new(durable, &config),
            session: SessionAuth::new(session, &config),
            config,
            navigator,
            ticker,
            scheduler: GateScheduler::default(),
            notice: RefCell::new(None),
            settings_listeners: RefCell::new(Vec::new()),
        })
    }

    /// Context backed by `localStorage`, `sessionStorage`, `window.location`
    /// and a `gloo-timers` interval.
    ///
    /// # Errors
    ///
    /// Returns the [`StorageError`](crate::storage::StorageError) when either
    /// storage area is unavailable.
    #[cfg(feature = "hydrate")]
    pub fn in_browser(config: GateConfig) -> Result<Rc<Self>, crate::storage::StorageError> {
        use crate::storage::WebStorage;

        let durable = WebStorage::local()?;
        let session = WebStorage::session()?;
        Ok(Self::init(
            config,
            Box::new(durable),
            Box::new(session),
            Rc::new(BrowserNavigator),
            Box::new(crate::scheduler::BrowserTicker),
        ))
    }

    #[must_use]
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    #[must_use]
    pub fn settings(&self) -> &SettingsStore<DynStore> {
        &self.settings
    }

    #[must_use]
    pub fn session(&self) -> &SessionAuth<DynStore> {
        &self.session
    }

    #[must_use]
    pub fn navigator(&self) -> &dyn Navigator {
        self.navigator.as_ref()
    }

    pub(crate) fn ticker(&self) -> &dyn Ticker {
        self.ticker.as_ref()
    }

    /// Stored settings with the last published notice folded in. Gate input
    /// only; the admin form edits [`SettingsStore::load`] so a notice is never
    /// written back.
    pub fn current_settings(&self) -> Settings {
        effective_settings(self.settings.load(), self.notice.borrow().as_ref())
    }

    pub fn set_notice(&self, notice: PublishedNotice) {
        *self.notice.borrow_mut() = Some(notice);
    }

    /// Evaluate the gate once over freshly loaded inputs.
    pub fn evaluate(&self) -> GateDecision {
        let settings = self.current_settings();
        gate::evaluate(&settings, &self.session, self.navigator.as_ref(), &self.config)
    }

    /// Register a hook called whenever settings change underneath an open
    /// admin form (cross-tab write or a save in this tab).
    pub fn on_settings_change(&self, listener: impl Fn(&Settings) + 'static) {
        self.settings_listeners.borrow_mut().push(Rc::new(listener));
    }

    pub(crate) fn notify_settings(&self, settings: &Settings) {
        let listeners: Vec<SettingsListener> = self.settings_listeners.borrow().iter().map(Rc::clone).collect();
        for listener in listeners {
            listener(settings);
        }
    }
}

/// [`Navigator`] over `window.location` and the page's
/// `[data-maintenance-message]` node.
#[cfg(feature = "hydrate")]
pub struct BrowserNavigator;

#[cfg(feature = "hydrate")]
impl Navigator for BrowserNavigator {
    fn location(&self) -> gate::Location {
        let Some(window) = web_sys::window() else {
            return gate::Location::default();
        };
        let location = window.location();
        gate::Location {
            path: location.pathname().unwrap_or_default(),
            search: location.search().unwrap_or_default(),
            hash: location.hash().unwrap_or_default(),
        }
    }

    fn navigate(&self, target: &str) {
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.location().set_href(target) {
                log::warn!("site-gate: navigation to `{target}` failed: {e:?}");
            }
        }
    }

    fn show_message(&self, message: &str) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Ok(Some(node)) = document.query_selector("[data-maintenance-message]") {
            node.set_text_content(Some(message));
        }
    }
}

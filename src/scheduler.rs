//! Fixed-interval re-evaluation of the gate.
//!
//! Storage events do not fire for every way settings can change (same-tab
//! scripts, devtools edits, a freshly published notice), so the gate is also
//! re-run on a timer for the lifetime of the tab. There is no `stop`.

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod scheduler_test;

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::context::GateContext;

/// Source of repeating timers. The returned handle keeps the timer alive.
pub trait Ticker {
    fn every(&self, period: Duration, tick: Box<dyn FnMut()>) -> Box<dyn Any>;
}

/// [`Ticker`] backed by `gloo_timers::callback::Interval`.
#[cfg(feature = "hydrate")]
pub struct BrowserTicker;

#[cfg(feature = "hydrate")]
impl Ticker for BrowserTicker {
    fn every(&self, period: Duration, tick: Box<dyn FnMut()>) -> Box<dyn Any> {
        let millis = u32::try_from(period.as_millis()).unwrap_or(u32::MAX);
        Box::new(gloo_timers::callback::Interval::new(millis, tick))
    }
}

/// Scheduler state held by the [`GateContext`].
#[derive(Default)]
pub struct GateScheduler {
    started: Cell<bool>,
    handle: RefCell<Option<Box<dyn Any>>>,
}

impl GateScheduler {
    /// Evaluate once now, then every `poll_interval`. Calling it again on a
    /// context that is already polling does nothing.
    ///
    /// The interval owns a strong handle to `ctx`, so a started context lives
    /// for the rest of the tab even after the caller drops its own `Rc`.
    pub fn start(ctx: &Rc<GateContext>) {
        if ctx.scheduler.started.replace(true) {
            return;
        }
        tick(ctx);

        let owned = Rc::clone(ctx);
        let handle = ctx.ticker().every(ctx.config().poll_interval, Box::new(move || tick(&owned)));
        *ctx.scheduler.handle.borrow_mut() = Some(handle);
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.borrow().is_some()
    }
}

fn tick(ctx: &Rc<GateContext>) {
    #[cfg(feature = "hydrate")]
    crate::notice::spawn_refresh(ctx);
    ctx.evaluate();
}

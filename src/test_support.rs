//! Test doubles for the browser collaborators.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::config::GateConfig;
use crate::context::GateContext;
use crate::gate::{Location, Navigator};
use crate::scheduler::Ticker;
use crate::storage::MemoryArea;

/// Navigator that "arrives" at every redirect target immediately.
#[derive(Default)]
pub struct RecordingNavigator {
    location: RefCell<Location>,
    pub redirects: RefCell<Vec<String>>,
    pub messages: RefCell<Vec<String>>,
}

impl RecordingNavigator {
    pub fn at(target: &str) -> Rc<Self> {
        let nav = Rc::new(Self::default());
        nav.visit(target);
        nav
    }

    /// Simulate the visitor following a link (no redirect recorded).
    pub fn visit(&self, target: &str) {
        *self.location.borrow_mut() = Location::parse(target);
    }

    pub fn current(&self) -> String {
        self.location.borrow().full_path()
    }

    pub fn last_message(&self) -> Option<String> {
        self.messages.borrow().last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn location(&self) -> Location {
        self.location.borrow().clone()
    }

    fn navigate(&self, target: &str) {
        self.redirects.borrow_mut().push(target.to_owned());
        self.visit(target);
    }

    fn show_message(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_owned());
    }
}

type Tick = Rc<RefCell<Box<dyn FnMut()>>>;
type Schedule = Rc<RefCell<Vec<(u64, Duration, Tick)>>>;

/// Ticker whose intervals only fire when the test says so. Dropping the
/// handle returned by [`Ticker::every`] cancels the interval.
#[derive(Clone, Default)]
pub struct ManualTicker {
    scheduled: Schedule,
    next_id: Rc<Cell<u64>>,
}

impl ManualTicker {
    pub fn scheduled_count(&self) -> usize {
        self.scheduled.borrow().len()
    }

    pub fn periods(&self) -> Vec<Duration> {
        self.scheduled.borrow().iter().map(|(_, period, _)| *period).collect()
    }

    /// Fire every live interval once.
    pub fn fire(&self) {
        let ticks: Vec<Tick> = self.scheduled.borrow().iter().map(|(_, _, t)| Rc::clone(t)).collect();
        for tick in ticks {
            (tick.borrow_mut())();
        }
    }
}

/// Interval handle; unregisters its tick on drop.
struct ManualInterval {
    id: u64,
    scheduled: Weak<RefCell<Vec<(u64, Duration, Tick)>>>,
}

impl Drop for ManualInterval {
    fn drop(&mut self) {
        if let Some(scheduled) = self.scheduled.upgrade() {
            scheduled.borrow_mut().retain(|(id, _, _)| *id != self.id);
        }
    }
}

impl Ticker for ManualTicker {
    fn every(&self, period: Duration, tick: Box<dyn FnMut()>) -> Box<dyn Any> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.scheduled.borrow_mut().push((id, period, Rc::new(RefCell::new(tick))));
        Box::new(ManualInterval { id, scheduled: Rc::downgrade(&self.scheduled) })
    }
}

/// One simulated browser tab: its own session area, navigator and ticker,
/// sharing the durable area it was opened on.
pub struct Tab {
    pub ctx: Rc<GateContext>,
    pub nav: Rc<RecordingNavigator>,
    pub ticker: ManualTicker,
    pub durable: MemoryArea,
    pub session: MemoryArea,
}

pub fn open_tab(durable: &MemoryArea, start: &str) -> Tab {
    let nav = RecordingNavigator::at(start);
    let ticker = ManualTicker::default();
    let session = MemoryArea::new();
    let ctx = GateContext::init(
        GateConfig::default(),
        Box::new(durable.open()),
        Box::new(session.open()),
        Rc::clone(&nav) as Rc<dyn Navigator>,
        Box::new(ticker.clone()),
    );
    Tab { ctx, nav, ticker, durable: durable.clone(), session }
}

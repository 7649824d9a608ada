//! Cross-tab settings synchronization.
//!
//! When another tab writes the settings record, this tab reloads it, pushes
//! the new values into any open admin form, and re-runs the gate. Writes made
//! by this tab never arrive here: the storage layer only reports writes from
//! other browsing contexts.

#[cfg(test)]
#[path = "sync_test.rs"]
mod sync_test;

use std::rc::Rc;

use crate::context::GateContext;
use crate::storage::KeyValueStore;

pub struct CrossTabSync;

impl CrossTabSync {
    /// Subscribe `ctx` to external writes of its settings key.
    pub fn install(ctx: &Rc<GateContext>) {
        let weak = Rc::downgrade(ctx);
        let key = ctx.settings().key().to_owned();
        ctx.settings().storage().on_external_change(
            &key,
            Box::new(move |_raw| {
                let Some(ctx) = weak.upgrade() else {
                    return;
                };
                ctx.notify_settings(&ctx.settings().load());
                ctx.evaluate();
            }),
        );
    }
}

//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components only call into [`crate::admin`]; gate decisions stay in
//! [`crate::gate`].

pub mod admin_console;

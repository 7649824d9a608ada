//! Admin console operations: login, logout, maintenance toggle, password change.
//!
//! SYSTEM CONTEXT
//! ==============
//! These are the only write paths into the gate's state. They hold no gate
//! logic of their own; after a successful change they re-run the gate in
//! this tab, since local writes raise no storage event here.
//!
//! ERROR HANDLING
//! ==============
//! Validation failures leave every stored value untouched and carry a
//! user-facing message. Storage failures are returned as
//! [`AdminError::Storage`] so a change that did not persist is never reported
//! as done.

#[cfg(test)]
#[path = "admin_test.rs"]
mod admin_test;

use crate::context::GateContext;
use crate::settings::{Settings, SettingsPatch};
use crate::storage::StorageError;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AdminError {
    #[error("Wrong password.")]
    InvalidPassword,
    #[error("Please log in first.")]
    Unauthorized,
    #[error("Current password is incorrect.")]
    CurrentPasswordMismatch,
    #[error("New password must be at least {min} characters.")]
    PasswordTooShort { min: usize },
    #[error("New password and confirmation do not match.")]
    ConfirmationMismatch,
    #[error("Could not save: {0}")]
    Storage(#[from] StorageError),
}

impl AdminError {
    /// `true` for validation failures the operator can fix by re-entering input.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}

/// Check `candidate` against the stored password and record the result in
/// the session. On success the gate runs immediately so an admin parked on
/// the maintenance page is sent back to where they were going.
///
/// # Errors
///
/// [`AdminError::InvalidPassword`] on mismatch (the tab stays or becomes
/// unauthenticated, even if clearing the flag fails); [`AdminError::Storage`]
/// if a correct password cannot be recorded.
pub fn login(ctx: &GateContext, candidate: &str) -> Result<(), AdminError> {
    if candidate != ctx.settings().load().password {
        if let Err(e) = ctx.session().set_authenticated(false) {
            log::warn!("site-gate: could not clear admin flag after failed login: {e}");
        }
        return Err(AdminError::InvalidPassword);
    }
    ctx.session().set_authenticated(true)?;
    ctx.evaluate();
    Ok(())
}

/// Drop this tab's admin flag and re-run the gate.
///
/// # Errors
///
/// [`AdminError::Storage`] if the session flag cannot be cleared.
pub fn logout(ctx: &GateContext) -> Result<(), AdminError> {
    ctx.session().set_authenticated(false)?;
    ctx.evaluate();
    Ok(())
}

/// Switch maintenance mode and set its message. Requires an authenticated tab.
///
/// # Errors
///
/// [`AdminError::Unauthorized`] when this tab is not logged in;
/// [`AdminError::Storage`] when the settings cannot be written.
pub fn update_maintenance(ctx: &GateContext, enabled: bool, message: &str) -> Result<Settings, AdminError> {
    if !ctx.session().is_authenticated() {
        return Err(AdminError::Unauthorized);
    }
    let saved = ctx.settings().save(SettingsPatch {
        maintenance_enabled: Some(enabled),
        maintenance_message: Some(message.to_owned()),
        ..SettingsPatch::default()
    })?;
    log::info!("site-gate: maintenance {}", if enabled { "enabled" } else { "disabled" });
    ctx.notify_settings(&saved);
    ctx.evaluate();
    Ok(saved)
}

/// Replace the shared password. Only the password field is written.
///
/// # Errors
///
/// Validation errors in this order: [`AdminError::CurrentPasswordMismatch`],
/// [`AdminError::PasswordTooShort`], [`AdminError::ConfirmationMismatch`].
/// [`AdminError::Storage`] when the settings cannot be written.
pub fn change_password(ctx: &GateContext, current: &str, new: &str, confirm: &str) -> Result<(), AdminError> {
    validate_password_change(&ctx.settings().load().password, current, new, confirm, ctx.config().min_password_len)?;
    let saved = ctx.settings().save(SettingsPatch { password: Some(new.to_owned()), ..SettingsPatch::default() })?;
    log::info!("site-gate: admin password changed");
    ctx.notify_settings(&saved);
    ctx.evaluate();
    Ok(())
}

/// Pure validation for [`change_password`].
///
/// # Errors
///
/// See [`change_password`].
pub fn validate_password_change(
    stored: &str,
    current: &str,
    new: &str,
    confirm: &str,
    min_len: usize,
) -> Result<(), AdminError> {
    if current != stored {
        return Err(AdminError::CurrentPasswordMismatch);
    }
    if new.chars().count() < min_len {
        return Err(AdminError::PasswordTooShort { min: min_len });
    }
    if new != confirm {
        return Err(AdminError::ConfirmationMismatch);
    }
    Ok(())
}

//! Admin console: login, maintenance toggle + message, password change.
//!
//! SYSTEM CONTEXT
//! ==============
//! Mounted into any page element carrying `data-admin-console`. Form state is
//! held in signals that are also driven from the gate context's hooks, so a
//! login/logout in this tab or a settings write in another tab re-renders the
//! open form.

#[cfg(test)]
#[path = "admin_console_test.rs"]
mod admin_console_test;

use std::rc::Rc;

use leptos::prelude::*;

use crate::admin::{self, AdminError};
use crate::context::GateContext;

/// Status line shown under a form after a submit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormStatus {
    pub text: String,
    pub is_error: bool,
}

impl FormStatus {
    #[must_use]
    pub fn from_result<T>(result: &Result<T, AdminError>, success: &str) -> Self {
        match result {
            Ok(_) => Self { text: success.to_owned(), is_error: false },
            Err(e) => Self { text: e.to_string(), is_error: true },
        }
    }

    #[must_use]
    pub fn class(&self) -> &'static str {
        if self.is_error { "admin-status admin-status--error" } else { "admin-status" }
    }
}

/// Summary line for the current gate state.
#[must_use]
pub fn maintenance_summary(enabled: bool) -> &'static str {
    if enabled { "Maintenance mode is ON" } else { "Maintenance mode is off" }
}

#[component]
pub fn AdminConsole(ctx: Rc<GateContext>) -> impl IntoView {
    let initial = ctx.settings().load();
    let authed = RwSignal::new(ctx.session().is_authenticated());
    let enabled = RwSignal::new(initial.maintenance_enabled);
    let message = RwSignal::new(initial.maintenance_message);

    ctx.session().on_change(move |value| authed.set(value));
    ctx.on_settings_change(move |settings| {
        enabled.set(settings.maintenance_enabled);
        message.set(settings.maintenance_message.clone());
    });

    let ctx = StoredValue::new_local(ctx);

    let password = RwSignal::new(String::new());
    let login_status = RwSignal::new(FormStatus::default());
    let settings_status = RwSignal::new(FormStatus::default());
    let current_pw = RwSignal::new(String::new());
    let new_pw = RwSignal::new(String::new());
    let confirm_pw = RwSignal::new(String::new());
    let password_status = RwSignal::new(FormStatus::default());

    let on_login = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let candidate = password.get_untracked();
        let result = ctx.with_value(|ctx| admin::login(ctx, &candidate));
        password.set(String::new());
        login_status.set(FormStatus::from_result(&result, "Logged in."));
    };

    let on_logout = move |_: leptos::ev::MouseEvent| {
        let result = ctx.with_value(|ctx| admin::logout(ctx));
        login_status.set(FormStatus::from_result(&result, "Logged out."));
    };

    let on_save_settings = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let (on, text) = (enabled.get_untracked(), message.get_untracked());
        let result = ctx.with_value(|ctx| admin::update_maintenance(ctx, on, &text));
        settings_status.set(FormStatus::from_result(&result, "Settings saved."));
    };

    let on_change_password = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let (current, new, confirm) = (current_pw.get_untracked(), new_pw.get_untracked(), confirm_pw.get_untracked());
        let result = ctx.with_value(|ctx| admin::change_password(ctx, &current, &new, &confirm));
        if result.is_ok() {
            current_pw.set(String::new());
            new_pw.set(String::new());
            confirm_pw.set(String::new());
        }
        password_status.set(FormStatus::from_result(&result, "Password changed."));
    };

    view! {
        <div class="admin-console">
            <Show
                when=move || authed.get()
                fallback=move || view! {
                    <form class="admin-form" on:submit=on_login>
                        <input
                            class="admin-input"
                            type="password"
                            placeholder="Password"
                            prop:value=move || password.get()
                            on:input=move |ev| password.set(event_target_value(&ev))
                        />
                        <button class="admin-button" type="submit">"Log in"</button>
                    </form>
                }
            >
                <p class="admin-summary">{move || maintenance_summary(enabled.get())}</p>
                <form class="admin-form" on:submit=on_save_settings>
                    <label class="admin-toggle">
                        <input
                            type="checkbox"
                            prop:checked=move || enabled.get()
                            on:change=move |ev| enabled.set(event_target_checked(&ev))
                        />
                        "Maintenance mode"
                    </label>
                    <textarea
                        class="admin-input"
                        placeholder="Message shown to visitors"
                        prop:value=move || message.get()
                        on:input=move |ev| message.set(event_target_value(&ev))
                    ></textarea>
                    <button class="admin-button" type="submit">"Save"</button>
                </form>
                <Show when=move || !settings_status.get().text.is_empty()>
                    <p class=move || settings_status.get().class()>{move || settings_status.get().text}</p>
                </Show>
                <form class="admin-form" on:submit=on_change_password>
                    <input
                        class="admin-input"
                        type="password"
                        placeholder="Current password"
                        prop:value=move || current_pw.get()
                        on:input=move |ev| current_pw.set(event_target_value(&ev))
                    />
                    <input
                        class="admin-input"
                        type="password"
                        placeholder="New password"
                        prop:value=move || new_pw.get()
                        on:input=move |ev| new_pw.set(event_target_value(&ev))
                    />
                    <input
                        class="admin-input"
                        type="password"
                        placeholder="Confirm new password"
                        prop:value=move || confirm_pw.get()
                        on:input=move |ev| confirm_pw.set(event_target_value(&ev))
                    />
                    <button class="admin-button" type="submit">"Change password"</button>
                </form>
                <Show when=move || !password_status.get().text.is_empty()>
                    <p class=move || password_status.get().class()>{move || password_status.get().text}</p>
                </Show>
                <button class="admin-button admin-button--secondary" on:click=on_logout>"Log out"</button>
            </Show>
            <Show when=move || !login_status.get().text.is_empty()>
                <p class=move || login_status.get().class()>{move || login_status.get().text}</p>
            </Show>
        </div>
    }
}

/// Mount the console into the page's `[data-admin-console]` element, if any.
#[cfg(feature = "hydrate")]
pub fn mount(ctx: &Rc<GateContext>) {
    use wasm_bindgen::JsCast;

    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let Some(host) = document
        .query_selector("[data-admin-console]")
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok())
    else {
        return;
    };
    let ctx = Rc::clone(ctx);
    let handle = leptos::mount::mount_to(host, move || view! { <AdminConsole ctx=ctx/> });
    handle.forget();
}

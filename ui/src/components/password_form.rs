use client_state::SessionGuard;
use payloads::{ClientError, UserId};
use payloads::requests::{
    CheckPasswordHistory, GeneratePassword, PasswordRequirement, UpdatePassword,
    password_error_message, validate_password,
};
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::components::modal::{BUTTON_PRIMARY, BUTTON_SECONDARY, INPUT_CLASS};
use crate::get_api_client;
use crate::hooks::use_session_guard;

const REUSED_PASSWORD: &str = "You cannot reuse any of your last 5 passwords";

#[derive(Properties, PartialEq)]
pub struct PasswordRequirementsProps {
    pub password: AttrValue,
}

/// Checklist of password rules, ticking off the ones already met.
#[function_component]
pub fn PasswordRequirements(props: &PasswordRequirementsProps) -> Html {
    html! {
        <ul class="text-xs space-y-1">
            {for PasswordRequirement::ALL.iter().map(|requirement| {
                let met = requirement.is_met_by(&props.password);
                let class = if met {
                    "text-green-600 dark:text-green-400"
                } else {
                    "text-neutral-500 dark:text-neutral-400"
                };
                html! {
                    <li {class}>
                        {if met { "✓ " } else { "• " }}
                        {requirement.message()}
                    </li>
                }
            })}
        </ul>
    }
}

/// How the change is authorised.
#[derive(Clone, PartialEq)]
pub enum PasswordChange {
    /// Signed in: the current password proves identity.
    Current { user_id: Option<UserId> },
    /// Recovery link: the decoded token proves identity.
    Reset { token: String },
}

fn report(guard: &Option<SessionGuard>, error: &ClientError) {
    if let Some(guard) = guard {
        guard.report(error);
    }
}

#[derive(Properties, PartialEq)]
pub struct PasswordFormProps {
    pub change: PasswordChange,
    /// Called after a successful update with the server's relogin flag.
    pub on_updated: Callback<bool>,
}

fn password_input(
    label: &'static str,
    value: &UseStateHandle<String>,
    autocomplete: &'static str,
) -> Html {
    let state = value.clone();
    let oninput = Callback::from(move |e: InputEvent| {
        let input: HtmlInputElement = e.target_unchecked_into();
        state.set(input.value());
    });
    html! {
        <label class="block space-y-1">
            <span class="text-sm font-medium text-neutral-700 dark:text-neutral-300">{label}</span>
            <input
                type="password"
                value={(**value).clone()}
                {autocomplete}
                {oninput}
                class={INPUT_CLASS}
            />
        </label>
    }
}

#[function_component]
pub fn PasswordForm(props: &PasswordFormProps) -> Html {
    let current_password = use_state(String::new);
    let new_password = use_state(String::new);
    let confirm_password = use_state(String::new);
    let error = use_state(|| None::<String>);
    let is_saving = use_state(|| false);
    let is_generating = use_state(|| false);
    // A recovery link has no session to expire.
    let guard = use_session_guard();
    let guard = matches!(props.change, PasswordChange::Current { .. })
        .then_some(guard);

    let on_generate = {
        let new_password = new_password.clone();
        let confirm_password = confirm_password.clone();
        let error = error.clone();
        let is_generating = is_generating.clone();
        let guard = guard.clone();
        Callback::from(move |_: MouseEvent| {
            let new_password = new_password.clone();
            let confirm_password = confirm_password.clone();
            let error = error.clone();
            let is_generating = is_generating.clone();
            let guard = guard.clone();
            yew::platform::spawn_local(async move {
                is_generating.set(true);
                match get_api_client()
                    .generate_password(&GeneratePassword::default())
                    .await
                {
                    Ok(generated) => {
                        new_password.set(generated.generated_password.clone());
                        confirm_password.set(generated.generated_password);
                        error.set(None);
                    }
                    Err(e) => {
                        report(&guard, &e);
                        error.set(Some(e.to_string()));
                    }
                }
                is_generating.set(false);
            });
        })
    };

    let onsubmit = {
        let current_password = current_password.clone();
        let new_password = new_password.clone();
        let confirm_password = confirm_password.clone();
        let error = error.clone();
        let is_saving = is_saving.clone();
        let change = props.change.clone();
        let on_updated = props.on_updated.clone();
        let guard = guard.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();

            if let Err(unmet) = validate_password(&new_password) {
                error.set(Some(password_error_message(&unmet)));
                return;
            }
            if *new_password != *confirm_password {
                error.set(Some("Passwords do not match".to_string()));
                return;
            }

            let details = match &change {
                PasswordChange::Current { user_id } => {
                    if current_password.is_empty() {
                        error.set(Some(
                            "Please enter your current password".to_string(),
                        ));
                        return;
                    }
                    UpdatePassword {
                        new_password: (*new_password).clone(),
                        token: None,
                        user_id: *user_id,
                        current_password: Some((*current_password).clone()),
                    }
                }
                PasswordChange::Reset { token } => UpdatePassword {
                    new_password: (*new_password).clone(),
                    token: Some(token.clone()),
                    user_id: None,
                    current_password: None,
                },
            };

            let error = error.clone();
            let is_saving = is_saving.clone();
            let on_updated = on_updated.clone();
            let guard = guard.clone();
            yew::platform::spawn_local(async move {
                is_saving.set(true);
                error.set(None);
                let client = get_api_client();

                if let Some(user_id) = details.user_id {
                    let check = CheckPasswordHistory {
                        user_id,
                        new_password: details.new_password.clone(),
                    };
                    match client.check_password_history(&check).await {
                        Ok(result) if result.is_reused() => {
                            error.set(Some(REUSED_PASSWORD.to_string()));
                            is_saving.set(false);
                            return;
                        }
                        Ok(_) => {}
                        // The update enforces history too.
                        Err(e) => {
                            report(&guard, &e);
                            tracing::warn!("History check failed: {e}");
                        }
                    }
                }

                match client.update_password(&details).await {
                    Ok(result) => on_updated.emit(result.require_relogin),
                    Err(e) => {
                        report(&guard, &e);
                        error.set(Some(e.to_string()));
                    }
                }
                is_saving.set(false);
            });
        })
    };

    let needs_current = matches!(props.change, PasswordChange::Current { .. });

    html! {
        <form {onsubmit} class="space-y-4">
            if needs_current {
                {password_input("Current password", &current_password, "current-password")}
            }
            {password_input("New password", &new_password, "new-password")}
            <PasswordRequirements password={(*new_password).clone()} />
            {password_input("Confirm new password", &confirm_password, "new-password")}
            if let Some(message) = &*error {
                <p class="text-sm text-red-600 dark:text-red-400">{message.clone()}</p>
            }
            <div class="flex gap-3">
                <button
                    type="button"
                    onclick={on_generate}
                    disabled={*is_generating}
                    class={BUTTON_SECONDARY}
                >
                    {if *is_generating { "Generating..." } else { "Generate password" }}
                </button>
                <button type="submit" disabled={*is_saving} class={BUTTON_PRIMARY}>
                    {if *is_saving { "Updating..." } else { "Update password" }}
                </button>
            </div>
        </form>
    }
}

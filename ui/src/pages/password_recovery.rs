use payloads::requests::{PasswordRecovery, is_plausible_email};
use web_sys::HtmlInputElement;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::components::modal::{BUTTON_PRIMARY, BUTTON_SECONDARY, INPUT_CLASS};
use crate::hooks::use_title;
use crate::storage::clear_logging_out;
use crate::{Route, get_api_client};

#[function_component]
pub fn PasswordRecoveryPage() -> Html {
    use_title("Password recovery");
    let email = use_state(String::new);
    let error = use_state(|| None::<String>);
    let sent_to = use_state(|| None::<String>);
    let is_sending = use_state(|| false);

    use_effect_with((), |_| clear_logging_out());

    let oninput = {
        let email = email.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            email.set(input.value());
        })
    };

    // First request and resend differ only in the endpoint.
    let send = {
        let error = error.clone();
        let sent_to = sent_to.clone();
        let is_sending = is_sending.clone();
        Callback::from(move |(address, resend): (String, bool)| {
            let error = error.clone();
            let sent_to = sent_to.clone();
            let is_sending = is_sending.clone();
            yew::platform::spawn_local(async move {
                is_sending.set(true);
                error.set(None);
                let details = PasswordRecovery {
                    email: address.clone(),
                };
                let client = get_api_client();
                let result = if resend {
                    client.resend_password_recovery(&details).await
                } else {
                    client.request_password_recovery(&details).await
                };
                match result {
                    Ok(()) => sent_to.set(Some(address)),
                    Err(e) => error.set(Some(e.to_string())),
                }
                is_sending.set(false);
            });
        })
    };

    let onsubmit = {
        let email = email.clone();
        let error = error.clone();
        let send = send.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let address = email.trim().to_string();
            if !is_plausible_email(&address) {
                error.set(Some("Please enter a valid email address".to_string()));
                return;
            }
            send.emit((address, false));
        })
    };

    let body = match &*sent_to {
        Some(address) => {
            let on_resend = {
                let address = address.clone();
                send.reform(move |_: MouseEvent| (address.clone(), true))
            };
            html! {
                <div class="space-y-4 text-center">
                    <p class="text-neutral-700 dark:text-neutral-300">
                        {format!("If an account exists for {address}, a recovery link is on its way.")}
                    </p>
                    <button onclick={on_resend} disabled={*is_sending} class={BUTTON_SECONDARY}>
                        {if *is_sending { "Sending..." } else { "Resend email" }}
                    </button>
                </div>
            }
        }
        None => html! {
            <form {onsubmit} class="space-y-4">
                <label class="block space-y-1">
                    <span class="text-sm font-medium text-neutral-700 dark:text-neutral-300">{"Email"}</span>
                    <input type="email" value={(*email).clone()} {oninput} class={INPUT_CLASS} />
                </label>
                <button type="submit" disabled={*is_sending} class={classes!(BUTTON_PRIMARY, "w-full")}>
                    {if *is_sending { "Sending..." } else { "Send recovery link" }}
                </button>
            </form>
        },
    };

    html! {
        <div class="flex items-center justify-center min-h-[60vh]">
            <div class="max-w-md w-full space-y-6">
                <div class="text-center">
                    <h1 class="text-3xl font-bold text-neutral-900 dark:text-white mb-2">
                        {"Forgot your password?"}
                    </h1>
                    <p class="text-neutral-600 dark:text-neutral-400">
                        {"We'll email you a link to set a new one."}
                    </p>
                </div>
                {body}
                if let Some(message) = &*error {
                    <p class="text-sm text-center text-red-600 dark:text-red-400">{message.clone()}</p>
                }
                <p class="text-center text-sm">
                    <Link<Route> to={Route::Home} classes="underline">{"Back to sign in"}</Link<Route>>
                </p>
            </div>
        </div>
    }
}

use web_sys::HtmlInputElement;
use yew::prelude::*;
use yew_router::prelude::*;
use yewdux::prelude::*;

use crate::components::modal::{BUTTON_PRIMARY, INPUT_CLASS};
use crate::hooks::use_title;
use crate::storage::clear_logging_out;
use crate::{AuthState, Route, State, auth};

/// Landing page. Signed-in users go straight to their dashboard.
#[function_component]
pub fn HomePage() -> Html {
    let (state, _) = use_store::<State>();
    use_title("Welcome");

    // A public page rendering means any logout redirect has landed.
    use_effect_with((), |_| clear_logging_out());

    match &state.auth_state {
        AuthState::LoggedIn(_) => html! { <Redirect<Route> to={Route::Dashboard} /> },
        AuthState::LoggedOut => html! { <SignIn /> },
        AuthState::Unknown => html! {
            <div class="text-center space-y-4">
                <div class="inline-block animate-spin rounded-full h-8 w-8 border-b-2 border-neutral-900 dark:border-neutral-100"></div>
                <p class="text-neutral-600 dark:text-neutral-400">{"Checking authentication..."}</p>
            </div>
        },
    }
}

#[function_component]
fn SignIn() -> Html {
    html! {
        <div class="flex items-center justify-center min-h-[60vh]">
            <div class="max-w-md w-full space-y-6 text-center">
                <h1 class="text-3xl font-bold text-neutral-900 dark:text-white">
                    {"Admin Console"}
                </h1>
                <p class="text-neutral-600 dark:text-neutral-400">
                    {"Manage users and keep an eye on system health."}
                </p>
                if auth::provider_configured() {
                    <button onclick={Callback::from(|_: MouseEvent| auth::login())} class={BUTTON_PRIMARY}>
                        {"Sign in"}
                    </button>
                } else {
                    <DevSignIn />
                }
                <p class="text-sm">
                    <Link<Route> to={Route::PasswordRecovery} classes="text-neutral-600 dark:text-neutral-400 underline">
                        {"Forgot your password?"}
                    </Link<Route>>
                </p>
            </div>
        </div>
    }
}

/// Without an identity provider the development backend signs in any
/// seeded user by name.
#[function_component]
fn DevSignIn() -> Html {
    let user_name = use_state(|| "admin".to_string());

    let oninput = {
        let user_name = user_name.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            user_name.set(input.value());
        })
    };

    let onsubmit = {
        let user_name = user_name.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if let Some(url) = auth::dev_login_url(user_name.trim()) {
                auth::redirect(url.as_str());
            }
        })
    };

    html! {
        <form {onsubmit} class="space-y-3 text-left">
            <label class="block space-y-1">
                <span class="text-sm font-medium text-neutral-700 dark:text-neutral-300">
                    {"Development user"}
                </span>
                <input type="text" value={(*user_name).clone()} {oninput} class={INPUT_CLASS} />
            </label>
            <button type="submit" class={classes!(BUTTON_PRIMARY, "w-full")}>
                {"Sign in"}
            </button>
        </form>
    }
}

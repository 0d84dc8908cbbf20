use client_state::optimistic::apply_optimistically;
use payloads::requests::UpdatePreferences;
use yew::prelude::*;
use yewdux::prelude::*;

use crate::contexts::use_toast;
use crate::hooks::use_session_guard;
use crate::{State, get_api_client};

/// Flips the theme immediately and saves it to the user's preferences,
/// switching back if the save fails.
#[function_component]
pub fn DarkModeToggle() -> Html {
    let (state, dispatch) = use_store::<State>();
    let toasts = use_toast();
    let guard = use_session_guard();
    let user_id = state.current_user().and_then(|user| user.id);

    let on_toggle = {
        let dispatch = dispatch.clone();
        Callback::from(move |_: MouseEvent| {
            let dispatch = dispatch.clone();
            let toasts = toasts.clone();
            let guard = guard.clone();
            let dark_mode = !dispatch.get().dark_mode;

            yew::platform::spawn_local(async move {
                let result = apply_optimistically(
                    || {
                        let previous = dispatch.get().dark_mode;
                        dispatch.reduce_mut(|s| s.dark_mode = dark_mode);
                        previous
                    },
                    |previous| {
                        dispatch.reduce_mut(|s| s.dark_mode = previous);
                    },
                    || async move {
                        let Some(user_id) = user_id else {
                            return Ok(());
                        };
                        let update = UpdatePreferences {
                            dark_mode: Some(dark_mode),
                            ..Default::default()
                        };
                        let saved = get_api_client()
                            .update_preferences(user_id, &update)
                            .await;
                        guard.check(saved).map(|_| ())
                    },
                )
                .await;

                if let Err(e) = result {
                    tracing::warn!("Saving theme failed: {e}");
                    toasts.error("Failed to update preferences");
                }
            });
        })
    };

    let label = if state.dark_mode { "☀" } else { "☾" };

    html! {
        <button
            onclick={on_toggle}
            title="Toggle dark mode"
            class="p-2 rounded-md text-neutral-600 dark:text-neutral-300 hover:bg-neutral-100 dark:hover:bg-neutral-700"
        >
            {label}
        </button>
    }
}

use yew::prelude::*;
use yewdux::prelude::*;

use crate::storage::is_logging_out;
use crate::{AuthState, State, get_api_client};

/// Resolve the session once on startup, then load the user's theme.
#[hook]
pub fn use_authentication() {
    let (_state, dispatch) = use_store::<State>();

    use_effect_with((), move |_| {
        if is_logging_out() {
            tracing::debug!("Logout in progress, skipping session check");
            dispatch.reduce_mut(State::logout);
            return;
        }

        yew::platform::spawn_local(async move {
            let api_client = get_api_client();
            let Some(user) = api_client.current_user().await else {
                dispatch.reduce_mut(State::logout);
                return;
            };

            let user_id = user.id;
            dispatch.reduce_mut(|state| {
                state.auth_state = AuthState::LoggedIn(user);
            });

            if let Some(user_id) = user_id {
                match api_client.get_preferences(user_id).await {
                    Ok(preferences) => {
                        dispatch.reduce_mut(|state| {
                            state.dark_mode = preferences.dark_mode;
                        });
                    }
                    Err(e) => tracing::warn!("Could not load preferences: {e}"),
                }
            }
        });
    });
}

use payloads::Role;
use payloads::responses::CurrentUser;
use yew::prelude::*;
use yewdux::prelude::*;

use crate::{AuthState, State};

/// Renders its content only for signed-in users holding at least
/// `min_role`. Children mount only once access is settled, so their hooks
/// never fetch for someone who can't see the result.
#[derive(Properties, PartialEq)]
pub struct RequireRoleProps {
    #[prop_or(Role::User)]
    pub min_role: Role,
    #[prop_or_default]
    pub children: Children,
    /// Alternative to children for content that needs the user.
    #[prop_or_default]
    pub render: Option<Callback<CurrentUser, Html>>,
}

#[function_component]
pub fn RequireRole(props: &RequireRoleProps) -> Html {
    let (state, _) = use_store::<State>();

    match &state.auth_state {
        AuthState::Unknown => html! {
            <div class="text-center py-8">
                <div class="inline-block animate-spin rounded-full h-8 w-8 border-2 border-neutral-900 dark:border-neutral-100 border-t-transparent dark:border-t-transparent"></div>
            </div>
        },
        AuthState::LoggedOut => html! {
            <div class="text-center py-12 space-y-4">
                <p class="text-neutral-600 dark:text-neutral-400">
                    {"Please sign in to access this page."}
                </p>
                <button
                    onclick={Callback::from(|_: MouseEvent| crate::auth::login())}
                    class="bg-neutral-900 dark:bg-white text-white dark:text-neutral-900 px-6 py-2 rounded-md font-medium"
                >
                    {"Sign in"}
                </button>
            </div>
        },
        AuthState::LoggedIn(user) if user.highest_role() < props.min_role => {
            tracing::debug!(role = %user.highest_role(), "access denied");
            html! {
                <div class="p-4 rounded-md bg-red-50 dark:bg-red-900/20 border border-red-200 dark:border-red-800">
                    <p class="text-sm text-red-700 dark:text-red-400">
                        {"You do not have permission to view this page."}
                    </p>
                </div>
            }
        }
        AuthState::LoggedIn(user) => match &props.render {
            Some(render) => render.emit(user.clone()),
            None => html! { <>{for props.children.iter()}</> },
        },
    }
}

use payloads::Role;
use yew::prelude::*;
use yew_router::prelude::*;
use yewdux::prelude::*;

use crate::components::DarkModeToggle;
use crate::hooks::use_logout;
use crate::{Route, State};

const LINK_CLASS: &str = "text-sm font-medium text-neutral-600 dark:text-neutral-300 \
                          hover:text-neutral-900 dark:hover:text-white";

#[function_component]
pub fn Header() -> Html {
    let (state, _) = use_store::<State>();
    let logout = use_logout();

    let nav = match state.current_user() {
        Some(user) => {
            let role = user.highest_role();
            html! {
                <nav class="flex items-center space-x-4">
                    <Link<Route> to={Route::Dashboard} classes={LINK_CLASS}>{"Dashboard"}</Link<Route>>
                    if role >= Role::Moderator {
                        <Link<Route> to={Route::Users} classes={LINK_CLASS}>{"Users"}</Link<Route>>
                    }
                    if role == Role::Admin {
                        <Link<Route> to={Route::Metrics} classes={LINK_CLASS}>{"Metrics"}</Link<Route>>
                    }
                    <Link<Route> to={Route::Profile} classes={LINK_CLASS}>{"Profile"}</Link<Route>>
                    <Link<Route> to={Route::Settings} classes={LINK_CLASS}>{"Settings"}</Link<Route>>
                    <span class="text-sm text-neutral-500 dark:text-neutral-400">
                        {user.display_name()}
                    </span>
                    <DarkModeToggle />
                    <button
                        onclick={logout.reform(|_: MouseEvent| ())}
                        class={LINK_CLASS}
                    >
                        {"Log out"}
                    </button>
                </nav>
            }
        }
        None => html! {},
    };

    html! {
        <header class="bg-white dark:bg-neutral-800 border-b border-neutral-200 dark:border-neutral-700">
            <div class="max-w-7xl mx-auto px-4 sm:px-6 lg:px-8">
                <div class="flex justify-between items-center h-16">
                    <Link<Route> to={Route::Home} classes="text-xl font-semibold text-neutral-900 dark:text-white">
                        {"Admin Console"}
                    </Link<Route>>
                    {nav}
                </div>
            </div>
        </header>
    }
}

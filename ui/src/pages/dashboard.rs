use payloads::Role;
use payloads::responses::CurrentUser;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::Route;
use crate::components::{MetricsPanel, RequireRole, UsersTable};
use crate::hooks::use_title;

/// One dashboard per role: admins manage users and watch the system,
/// moderators browse the directory, users see their own account.
#[function_component]
pub fn DashboardPage() -> Html {
    use_title("Dashboard");

    let render = Callback::from(|user: CurrentUser| match user.highest_role() {
        Role::Admin => html! { <AdminDashboard /> },
        Role::Moderator => html! { <ModeratorDashboard /> },
        Role::User => html! { <UserDashboard {user} /> },
    });

    html! { <RequireRole {render} /> }
}

#[function_component]
fn AdminDashboard() -> Html {
    html! {
        <div class="space-y-10">
            <MetricsPanel />
            <UsersTable />
        </div>
    }
}

#[function_component]
fn ModeratorDashboard() -> Html {
    html! { <UsersTable read_only=true /> }
}

#[derive(Properties, PartialEq)]
struct UserDashboardProps {
    user: CurrentUser,
}

#[function_component]
fn UserDashboard(props: &UserDashboardProps) -> Html {
    let user = &props.user;
    let roles = user
        .roles
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    html! {
        <div class="max-w-2xl space-y-6">
            <h1 class="text-3xl font-bold">
                {format!("Welcome, {}", user.display_name())}
            </h1>
            <dl class="grid grid-cols-3 gap-y-3 text-sm">
                <dt class="text-neutral-500 dark:text-neutral-400">{"Email"}</dt>
                <dd class="col-span-2">
                    {&user.email}
                    if !user.email_verified {
                        <span class="ml-2 text-xs text-amber-600 dark:text-amber-400">
                            {"unverified"}
                        </span>
                    }
                </dd>
                <dt class="text-neutral-500 dark:text-neutral-400">{"Roles"}</dt>
                <dd class="col-span-2">{roles}</dd>
            </dl>
            <div class="flex gap-4 text-sm">
                <Link<Route> to={Route::Profile} classes="underline">{"Edit profile"}</Link<Route>>
                <Link<Route> to={Route::Password} classes="underline">{"Change password"}</Link<Route>>
            </div>
        </div>
    }
}

use client_state::fetch::error_message;
use client_state::format::format_date;
use client_state::optimistic::apply_optimistically;
use client_state::sort::{USERS_PER_PAGE, page, page_count};
use client_state::{SortDirection, SortSettings, UserSortField, sort_users};
use jiff::tz::TimeZone;
use payloads::requests::UpdateUser;
use payloads::{User, UserId, UserStatus};
use yew::prelude::*;

use crate::components::modal::BUTTON_PRIMARY;
use crate::components::{
    AddUserModal, ConfirmDialog, EditUserModal, ErrorPanel, PaginationControls,
    RefreshControls,
};
use crate::contexts::use_toast;
use crate::hooks::{use_session_guard, use_sort_settings, use_user_data};
use crate::users_service::users_service;

#[derive(Clone, PartialEq)]
enum Dialog {
    None,
    Add,
    Edit(User),
    Delete(User),
}

fn set_status(users: &mut [User], user_id: UserId, status: UserStatus) {
    if let Some(user) = users.iter_mut().find(|user| user.id == user_id) {
        user.status = status;
    }
}

fn replace_user(users: &mut [User], updated: User) {
    if let Some(user) = users.iter_mut().find(|user| user.id == updated.id) {
        *user = updated;
    }
}

#[derive(Properties, PartialEq)]
pub struct UsersTableProps {
    /// Moderators see the directory but cannot change it.
    #[prop_or_default]
    pub read_only: bool,
}

/// The user directory: sortable, paginated, polled on the user's schedule.
#[function_component]
pub fn UsersTable(props: &UsersTableProps) -> Html {
    let users = use_user_data();
    let (sort, on_sort) = use_sort_settings();
    let current_page = use_state(|| 1usize);
    let dialog = use_state(|| Dialog::None);
    let is_deleting = use_state(|| false);
    let delete_error = use_state(|| None::<String>);
    let toasts = use_toast();
    let guard = use_session_guard();

    let close_dialog = {
        let dialog = dialog.clone();
        let delete_error = delete_error.clone();
        Callback::from(move |_| {
            delete_error.set(None);
            dialog.set(Dialog::None);
        })
    };

    let on_created = {
        let toasts = toasts.clone();
        let refresh = users.refresh.clone();
        Callback::from(move |_| {
            toasts.success("User created");
            refresh.emit(());
        })
    };

    let on_saved = {
        let coordinator = users.coordinator.clone();
        let dialog = dialog.clone();
        let toasts = toasts.clone();
        Callback::from(move |updated: User| {
            coordinator.update_data(|users| replace_user(users, updated));
            toasts.success("User updated");
            dialog.set(Dialog::None);
        })
    };

    let on_confirm_delete = {
        let dialog = dialog.clone();
        let is_deleting = is_deleting.clone();
        let delete_error = delete_error.clone();
        let refresh = users.refresh.clone();
        let toasts = toasts.clone();
        let guard = guard.clone();
        Callback::from(move |_| {
            let Dialog::Delete(user) = (*dialog).clone() else {
                return;
            };
            let dialog = dialog.clone();
            let is_deleting = is_deleting.clone();
            let delete_error = delete_error.clone();
            let refresh = refresh.clone();
            let toasts = toasts.clone();
            let guard = guard.clone();
            yew::platform::spawn_local(async move {
                is_deleting.set(true);
                match guard.check(users_service().delete(user.id).await) {
                    Ok(()) => {
                        toasts.success(format!("Deleted {}", user.user_name));
                        dialog.set(Dialog::None);
                        refresh.emit(());
                    }
                    Err(e) => delete_error.set(Some(error_message(
                        &e,
                        "Failed to delete user",
                    ))),
                }
                is_deleting.set(false);
            });
        })
    };

    let on_toggle_status = {
        let coordinator = users.coordinator.clone();
        let toasts = toasts.clone();
        let guard = guard.clone();
        Callback::from(move |user: User| {
            let coordinator = coordinator.clone();
            let toasts = toasts.clone();
            let guard = guard.clone();
            let next = if user.status == UserStatus::Active {
                UserStatus::Inactive
            } else {
                UserStatus::Active
            };
            let user_id = user.id;
            let previous = user.status;
            let patch = UpdateUser {
                status: Some(next.clone()),
                ..Default::default()
            };
            yew::platform::spawn_local(async move {
                let result = apply_optimistically(
                    || {
                        coordinator.update_data(|users| {
                            set_status(users, user_id, next)
                        });
                        previous
                    },
                    |previous| {
                        coordinator.update_data(|users| {
                            set_status(users, user_id, previous)
                        });
                    },
                    || async move {
                        let service = users_service();
                        guard.check(service.update(user_id, &patch).await)
                    },
                )
                .await;
                if let Err(e) = result {
                    toasts.error(error_message(&e, "Failed to update user"));
                }
            });
        })
    };

    let controls = html! {
        <RefreshControls
            last_updated={users.state.last_updated}
            is_updating={users.state.is_updating}
            settings={users.settings}
            on_refresh={users.refresh.clone()}
            on_settings_change={users.update_settings.clone()}
            on_reset={users.reset_settings.clone()}
        />
    };

    let body = match (&users.state.data, &users.state.error) {
        (None, Some(error)) => html! {
            <ErrorPanel message={error.clone()} on_retry={users.refresh.clone()} />
        },
        (None, None) => html! {
            <p class="text-center py-12 text-neutral-600 dark:text-neutral-400">
                {"Loading users..."}
            </p>
        },
        (Some(rows), error) => {
            let sorted = sort_users(rows, sort);
            let pages = page_count(sorted.len(), USERS_PER_PAGE);
            let shown = page(&sorted, *current_page, USERS_PER_PAGE);
            let on_page_change = {
                let current_page = current_page.clone();
                Callback::from(move |p| current_page.set(p))
            };
            html! {
                <>
                    if let Some(error) = error {
                        <div class="mb-4">
                            <ErrorPanel
                                message={error.clone()}
                                on_dismiss={users.dismiss_error.clone()}
                            />
                        </div>
                    }
                    <div class="overflow-x-auto">
                        <table class="min-w-full text-sm">
                            <thead>
                                <tr class="border-b border-neutral-200 dark:border-neutral-700">
                                    {for UserSortField::ALL.iter().map(|field| {
                                        header_cell(*field, sort, on_sort.clone())
                                    })}
                                    if !props.read_only {
                                        <th class="px-3 py-2 text-right">{"Actions"}</th>
                                    }
                                </tr>
                            </thead>
                            <tbody>
                                {for shown.iter().map(|user| row(
                                    user,
                                    props.read_only,
                                    &dialog,
                                    &on_toggle_status,
                                ))}
                            </tbody>
                        </table>
                    </div>
                    if sorted.is_empty() {
                        <p class="text-center py-8 text-neutral-500">{"No users found"}</p>
                    }
                    <PaginationControls
                        page={(*current_page).clamp(1, pages.max(1))}
                        page_count={pages}
                        total={sorted.len()}
                        per_page={USERS_PER_PAGE}
                        {on_page_change}
                    />
                </>
            }
        }
    };

    let modal = match &*dialog {
        Dialog::None => html! {},
        Dialog::Add => html! {
            <AddUserModal on_close={close_dialog.clone()} {on_created} />
        },
        Dialog::Edit(user) => html! {
            <EditUserModal user={user.clone()} on_close={close_dialog.clone()} {on_saved} />
        },
        Dialog::Delete(user) => html! {
            <ConfirmDialog
                title="Delete user"
                message={format!(
                    "This permanently removes {} ({}).",
                    user.full_name(),
                    user.user_name,
                )}
                confirm_text="Delete"
                on_confirm={on_confirm_delete}
                on_close={close_dialog.clone()}
                is_loading={*is_deleting}
                error_message={(*delete_error).clone().map(AttrValue::from)}
            />
        },
    };

    let on_add = {
        let dialog = dialog.clone();
        Callback::from(move |_: MouseEvent| dialog.set(Dialog::Add))
    };

    html! {
        <section class="space-y-4">
            <div class="flex flex-wrap items-center justify-between gap-4">
                <h2 class="text-2xl font-bold">{"Users"}</h2>
                <div class="flex items-center gap-4">
                    {controls}
                    if !props.read_only {
                        <button onclick={on_add} class={BUTTON_PRIMARY}>{"Add user"}</button>
                    }
                </div>
            </div>
            {body}
            {modal}
        </section>
    }
}

fn header_cell(
    field: UserSortField,
    sort: SortSettings,
    on_sort: Callback<UserSortField>,
) -> Html {
    let arrow = match (sort.field == field, sort.direction) {
        (false, _) => "",
        (true, SortDirection::Asc) => " ▲",
        (true, SortDirection::Desc) => " ▼",
    };
    html! {
        <th
            onclick={Callback::from(move |_: MouseEvent| on_sort.emit(field))}
            class="px-3 py-2 text-left font-medium cursor-pointer select-none"
        >
            {field.label()}{arrow}
        </th>
    }
}

fn row(
    user: &User,
    read_only: bool,
    dialog: &UseStateHandle<Dialog>,
    on_toggle_status: &Callback<User>,
) -> Html {
    let tz = TimeZone::system();
    let roles = user
        .roles
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    let actions = if read_only {
        html! {}
    } else {
        let on_edit = {
            let dialog = dialog.clone();
            let user = user.clone();
            Callback::from(move |_: MouseEvent| dialog.set(Dialog::Edit(user.clone())))
        };
        let on_delete = {
            let dialog = dialog.clone();
            let user = user.clone();
            Callback::from(move |_: MouseEvent| dialog.set(Dialog::Delete(user.clone())))
        };
        let on_toggle = {
            let on_toggle_status = on_toggle_status.clone();
            let user = user.clone();
            Callback::from(move |_: MouseEvent| on_toggle_status.emit(user.clone()))
        };
        let toggle_label = if user.status == UserStatus::Active {
            "Deactivate"
        } else {
            "Activate"
        };
        html! {
            <td class="px-3 py-2 text-right space-x-3 whitespace-nowrap">
                <button onclick={on_toggle} class="text-neutral-600 dark:text-neutral-300 hover:underline">
                    {toggle_label}
                </button>
                <button onclick={on_edit} class="text-neutral-600 dark:text-neutral-300 hover:underline">
                    {"Edit"}
                </button>
                <button onclick={on_delete} class="text-red-600 dark:text-red-400 hover:underline">
                    {"Delete"}
                </button>
            </td>
        }
    };

    html! {
        <tr key={user.id.0} class="border-b border-neutral-100 dark:border-neutral-800">
            <td class="px-3 py-2 font-medium">{&user.user_name}</td>
            <td class="px-3 py-2">{&user.first_name}</td>
            <td class="px-3 py-2">{&user.last_name}</td>
            <td class="px-3 py-2">{&user.email}</td>
            <td class="px-3 py-2">{roles}</td>
            <td class="px-3 py-2">{user.status.to_string()}</td>
            <td class="px-3 py-2">{format_date(user.created_at, &tz)}</td>
            <td class="px-3 py-2">{format_date(user.last_login, &tz)}</td>
            {actions}
        </tr>
    }
}

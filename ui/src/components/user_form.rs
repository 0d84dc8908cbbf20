use payloads::requests::{GeneratePassword, NewUser, UpdateUser};
use payloads::{Role, User, UserStatus};
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

use crate::components::modal::{BUTTON_PRIMARY, BUTTON_SECONDARY, INPUT_CLASS, Modal};
use crate::get_api_client;
use crate::hooks::use_session_guard;
use crate::users_service::users_service;

const ROLES: [Role; 3] = [Role::User, Role::Moderator, Role::Admin];
const STATUSES: [UserStatus; 3] =
    [UserStatus::Active, UserStatus::Inactive, UserStatus::Pending];

#[derive(Clone, PartialEq)]
struct UserFields {
    first_name: String,
    last_name: String,
    user_name: String,
    email: String,
    role: Role,
    status: UserStatus,
}

impl UserFields {
    fn blank() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            user_name: String::new(),
            email: String::new(),
            role: Role::User,
            status: UserStatus::Pending,
        }
    }

    fn from_user(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            user_name: user.user_name.clone(),
            email: user.email.clone(),
            role: user.highest_role(),
            status: user.status.clone(),
        }
    }

    /// Only the fields that differ from `user`.
    fn patch_for(&self, user: &User) -> UpdateUser {
        let changed = |new: &str, old: &str| {
            (new.trim() != old).then(|| new.trim().to_string())
        };
        UpdateUser {
            first_name: changed(&self.first_name, &user.first_name),
            last_name: changed(&self.last_name, &user.last_name),
            user_name: changed(&self.user_name, &user.user_name),
            email: changed(&self.email, &user.email),
            roles: (user.roles != [self.role]).then(|| vec![self.role]),
            status: (self.status != user.status).then(|| self.status.clone()),
        }
    }
}

fn text_input(
    label: &'static str,
    value: &str,
    fields: &UseStateHandle<UserFields>,
    set: fn(&mut UserFields, String),
) -> Html {
    let fields = fields.clone();
    let oninput = Callback::from(move |e: InputEvent| {
        let input: HtmlInputElement = e.target_unchecked_into();
        let mut next = (*fields).clone();
        set(&mut next, input.value());
        fields.set(next);
    });
    html! {
        <label class="block space-y-1">
            <span class="text-sm font-medium text-neutral-700 dark:text-neutral-300">{label}</span>
            <input type="text" value={value.to_string()} {oninput} class={INPUT_CLASS} />
        </label>
    }
}

fn role_select(fields: &UseStateHandle<UserFields>) -> Html {
    let current = fields.role;
    let fields = fields.clone();
    let onchange = Callback::from(move |e: Event| {
        let select: HtmlSelectElement = e.target_unchecked_into();
        if let Some(role) = Role::parse(&select.value()) {
            let mut next = (*fields).clone();
            next.role = role;
            fields.set(next);
        }
    });
    html! {
        <label class="block space-y-1">
            <span class="text-sm font-medium text-neutral-700 dark:text-neutral-300">{"Role"}</span>
            <select {onchange} class={INPUT_CLASS}>
                {for ROLES.iter().map(|role| html! {
                    <option value={role.to_string()} selected={*role == current}>
                        {role.to_string()}
                    </option>
                })}
            </select>
        </label>
    }
}

fn status_select(fields: &UseStateHandle<UserFields>) -> Html {
    let current = fields.status.clone();
    let fields = fields.clone();
    let onchange = Callback::from(move |e: Event| {
        let select: HtmlSelectElement = e.target_unchecked_into();
        let mut next = (*fields).clone();
        next.status = UserStatus::from(select.value());
        fields.set(next);
    });
    html! {
        <label class="block space-y-1">
            <span class="text-sm font-medium text-neutral-700 dark:text-neutral-300">{"Status"}</span>
            <select {onchange} class={INPUT_CLASS}>
                {for STATUSES.iter().map(|status| html! {
                    <option value={status.to_string()} selected={*status == current}>
                        {status.to_string()}
                    </option>
                })}
            </select>
        </label>
    }
}

fn name_fields(fields: &UseStateHandle<UserFields>) -> Html {
    html! {
        <>
            <div class="grid grid-cols-2 gap-3">
                {text_input("First name", &fields.first_name, fields, |f, v| f.first_name = v)}
                {text_input("Last name", &fields.last_name, fields, |f, v| f.last_name = v)}
            </div>
            {text_input("Username", &fields.user_name, fields, |f, v| f.user_name = v)}
            {text_input("Email", &fields.email, fields, |f, v| f.email = v)}
        </>
    }
}

#[derive(Properties, PartialEq)]
pub struct AddUserModalProps {
    pub on_close: Callback<()>,
    pub on_created: Callback<()>,
}

/// Creates a pending user with a generated password, then shows the
/// password once so it can be handed over.
#[function_component]
pub fn AddUserModal(props: &AddUserModalProps) -> Html {
    let fields = use_state(UserFields::blank);
    let error = use_state(|| None::<String>);
    let is_saving = use_state(|| false);
    let created_password = use_state(|| None::<String>);
    let guard = use_session_guard();

    let on_submit = {
        let fields = fields.clone();
        let error = error.clone();
        let is_saving = is_saving.clone();
        let created_password = created_password.clone();
        let on_created = props.on_created.clone();
        let guard = guard.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let mut details = NewUser {
                first_name: fields.first_name.trim().to_string(),
                last_name: fields.last_name.trim().to_string(),
                user_name: fields.user_name.trim().to_string(),
                email: fields.email.trim().to_string(),
                password: String::new(),
                roles: vec![fields.role],
                status: UserStatus::Pending,
            };
            if let Err(message) = details.validate() {
                error.set(Some(message.to_string()));
                return;
            }

            let error = error.clone();
            let is_saving = is_saving.clone();
            let created_password = created_password.clone();
            let on_created = on_created.clone();
            let guard = guard.clone();
            yew::platform::spawn_local(async move {
                is_saving.set(true);
                error.set(None);

                let generated = get_api_client()
                    .generate_password(&GeneratePassword::default())
                    .await;
                let result = match generated {
                    Ok(generated) => {
                        details.password = generated.generated_password;
                        users_service().create(&details).await
                    }
                    Err(e) => Err(e),
                };

                match guard.check(result) {
                    Ok(created) => {
                        tracing::info!(user_id = %created.id, "user created");
                        created_password.set(Some(details.password));
                        on_created.emit(());
                    }
                    Err(e) => error.set(Some(e.to_string())),
                }
                is_saving.set(false);
            });
        })
    };

    let body = match &*created_password {
        Some(password) => html! {
            <div class="space-y-4">
                <p class="text-sm text-neutral-600 dark:text-neutral-400">
                    {"User created. Share this temporary password with them; it will not be shown again."}
                </p>
                <p class="font-mono text-sm p-3 rounded-md bg-neutral-100 dark:bg-neutral-900 break-all">
                    {password}
                </p>
                <div class="flex justify-end">
                    <button onclick={props.on_close.reform(|_: MouseEvent| ())} class={BUTTON_PRIMARY}>
                        {"Done"}
                    </button>
                </div>
            </div>
        },
        None => html! {
            <form onsubmit={on_submit} class="space-y-4">
                {name_fields(&fields)}
                {role_select(&fields)}
                if let Some(message) = &*error {
                    <p class="text-sm text-red-600 dark:text-red-400">{message}</p>
                }
                <div class="flex justify-end gap-3">
                    <button
                        type="button"
                        onclick={props.on_close.reform(|_: MouseEvent| ())}
                        class={BUTTON_SECONDARY}
                    >
                        {"Cancel"}
                    </button>
                    <button type="submit" disabled={*is_saving} class={BUTTON_PRIMARY}>
                        {if *is_saving { "Creating..." } else { "Create user" }}
                    </button>
                </div>
            </form>
        },
    };

    html! {
        <Modal title="Add user" on_close={props.on_close.clone()}>
            {body}
        </Modal>
    }
}

#[derive(Properties, PartialEq)]
pub struct EditUserModalProps {
    pub user: User,
    pub on_close: Callback<()>,
    pub on_saved: Callback<User>,
}

#[function_component]
pub fn EditUserModal(props: &EditUserModalProps) -> Html {
    let fields = {
        let user = props.user.clone();
        use_state(move || UserFields::from_user(&user))
    };
    let error = use_state(|| None::<String>);
    let is_saving = use_state(|| false);
    let latest = use_state(|| props.user.clone());
    let guard = use_session_guard();

    // The table row may be a poll behind; diff against the current record.
    {
        let latest = latest.clone();
        let guard = guard.clone();
        use_effect_with(props.user.id, move |user_id| {
            let user_id = *user_id;
            yew::platform::spawn_local(async move {
                match guard.check(users_service().get(user_id).await) {
                    Ok(user) => latest.set(user),
                    Err(e) => tracing::warn!("Reloading user failed: {e}"),
                }
            });
        });
    }

    let on_submit = {
        let fields = fields.clone();
        let error = error.clone();
        let is_saving = is_saving.clone();
        let user = (*latest).clone();
        let on_saved = props.on_saved.clone();
        let on_close = props.on_close.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let patch = fields.patch_for(&user);
            if patch.is_empty() {
                on_close.emit(());
                return;
            }
            if patch.email.as_deref().is_some_and(|email| {
                !payloads::requests::is_plausible_email(email)
            }) {
                error.set(Some("Please enter a valid email address".into()));
                return;
            }

            let error = error.clone();
            let is_saving = is_saving.clone();
            let on_saved = on_saved.clone();
            let user_id = user.id;
            let guard = guard.clone();
            yew::platform::spawn_local(async move {
                is_saving.set(true);
                error.set(None);
                match guard.check(users_service().update(user_id, &patch).await) {
                    Ok(updated) => on_saved.emit(updated),
                    Err(e) => error.set(Some(e.to_string())),
                }
                is_saving.set(false);
            });
        })
    };

    html! {
        <Modal title={format!("Edit {}", props.user.user_name)} on_close={props.on_close.clone()}>
            <form onsubmit={on_submit} class="space-y-4">
                {name_fields(&fields)}
                <div class="grid grid-cols-2 gap-3">
                    {role_select(&fields)}
                    {status_select(&fields)}
                </div>
                if let Some(message) = &*error {
                    <p class="text-sm text-red-600 dark:text-red-400">{message}</p>
                }
                <div class="flex justify-end gap-3">
                    <button
                        type="button"
                        onclick={props.on_close.reform(|_: MouseEvent| ())}
                        class={BUTTON_SECONDARY}
                    >
                        {"Cancel"}
                    </button>
                    <button type="submit" disabled={*is_saving} class={BUTTON_PRIMARY}>
                        {if *is_saving { "Saving..." } else { "Save" }}
                    </button>
                </div>
            </form>
        </Modal>
    }
}

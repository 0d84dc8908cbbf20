use payloads::responses::{Profile, SocialMedia};
use payloads::{StatusCode, UserId};
use web_sys::{HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;

use crate::components::ErrorPanel;
use crate::components::modal::{BUTTON_PRIMARY, INPUT_CLASS};
use crate::contexts::use_toast;
use crate::get_api_client;
use crate::hooks::use_session_guard;

/// Blank input clears the field.
fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// A labelled text input bound to an optional string inside `state`.
pub(crate) fn optional_input<T: Clone + 'static>(
    label: &'static str,
    input_type: &'static str,
    value: Option<String>,
    state: &UseStateHandle<T>,
    set: fn(&mut T, Option<String>),
) -> Html {
    let state = state.clone();
    let oninput = Callback::from(move |e: InputEvent| {
        let input: HtmlInputElement = e.target_unchecked_into();
        let mut next = (*state).clone();
        set(&mut next, non_empty(input.value()));
        state.set(next);
    });
    html! {
        <label class="block space-y-1">
            <span class="text-sm font-medium text-neutral-700 dark:text-neutral-300">{label}</span>
            <input
                type={input_type}
                value={value.unwrap_or_default()}
                {oninput}
                class={INPUT_CLASS}
            />
        </label>
    }
}

fn social(profile: &mut Profile) -> &mut SocialMedia {
    profile.social_media.get_or_insert_with(SocialMedia::default)
}

fn social_value(
    profile: &Profile,
    get: fn(&SocialMedia) -> &Option<String>,
) -> Option<String> {
    profile.social_media.as_ref().and_then(|s| get(s).clone())
}

#[derive(Properties, PartialEq)]
pub struct ProfileFormProps {
    pub user_id: UserId,
}

/// Personal details and social links for one user.
#[function_component]
pub fn ProfileForm(props: &ProfileFormProps) -> Html {
    let profile = use_state(Profile::default);
    let is_loading = use_state(|| true);
    let is_saving = use_state(|| false);
    let load_error = use_state(|| None::<String>);
    let save_error = use_state(|| None::<String>);
    let toasts = use_toast();
    let guard = use_session_guard();

    {
        let profile = profile.clone();
        let is_loading = is_loading.clone();
        let load_error = load_error.clone();
        let guard = guard.clone();
        use_effect_with(props.user_id, move |user_id| {
            let user_id = *user_id;
            yew::platform::spawn_local(async move {
                match guard.check(get_api_client().get_profile(user_id).await) {
                    Ok(loaded) => profile.set(loaded),
                    // No profile yet; saving creates one.
                    Err(e) if e.status() == Some(StatusCode::NOT_FOUND) => {}
                    Err(e) => load_error.set(Some(e.to_string())),
                }
                is_loading.set(false);
            });
        });
    }

    let on_bio_input = {
        let profile = profile.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlTextAreaElement = e.target_unchecked_into();
            let mut next = (*profile).clone();
            next.bio = non_empty(input.value());
            profile.set(next);
        })
    };

    let onsubmit = {
        let profile = profile.clone();
        let is_saving = is_saving.clone();
        let save_error = save_error.clone();
        let user_id = props.user_id;
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let profile = profile.clone();
            let is_saving = is_saving.clone();
            let save_error = save_error.clone();
            let toasts = toasts.clone();
            let guard = guard.clone();
            let update = (*profile).clone();
            yew::platform::spawn_local(async move {
                is_saving.set(true);
                save_error.set(None);
                let saved = get_api_client().update_profile(user_id, &update).await;
                match guard.check(saved) {
                    Ok(saved) => {
                        profile.set(saved);
                        toasts.success("Profile saved");
                    }
                    Err(e) => save_error.set(Some(e.to_string())),
                }
                is_saving.set(false);
            });
        })
    };

    if *is_loading {
        return html! {
            <p class="text-neutral-600 dark:text-neutral-400">{"Loading profile..."}</p>
        };
    }
    if let Some(message) = &*load_error {
        return html! { <ErrorPanel message={message.clone()} /> };
    }

    let p = &*profile;
    html! {
        <form {onsubmit} class="space-y-4">
            <div class="grid md:grid-cols-2 gap-4">
                {optional_input("Phone", "tel", p.phone.clone(), &profile, |p, v| p.phone = v)}
                {optional_input(
                    "Date of birth",
                    "date",
                    p.date_of_birth.clone(),
                    &profile,
                    |p, v| p.date_of_birth = v,
                )}
                {optional_input("Gender", "text", p.gender.clone(), &profile, |p, v| p.gender = v)}
                {optional_input("Website", "url", p.website.clone(), &profile, |p, v| p.website = v)}
                {optional_input(
                    "Avatar URL",
                    "url",
                    p.avatar_url.clone(),
                    &profile,
                    |p, v| p.avatar_url = v,
                )}
            </div>
            <label class="block space-y-1">
                <span class="text-sm font-medium text-neutral-700 dark:text-neutral-300">{"Bio"}</span>
                <textarea
                    rows="3"
                    value={p.bio.clone().unwrap_or_default()}
                    oninput={on_bio_input}
                    class={INPUT_CLASS}
                />
            </label>

            <h3 class="font-semibold pt-2">{"Social media"}</h3>
            <div class="grid md:grid-cols-2 gap-4">
                {optional_input(
                    "Twitter",
                    "text",
                    social_value(p, |s| &s.twitter),
                    &profile,
                    |p, v| social(p).twitter = v,
                )}
                {optional_input(
                    "LinkedIn",
                    "text",
                    social_value(p, |s| &s.linkedin),
                    &profile,
                    |p, v| social(p).linkedin = v,
                )}
                {optional_input(
                    "GitHub",
                    "text",
                    social_value(p, |s| &s.github),
                    &profile,
                    |p, v| social(p).github = v,
                )}
                {optional_input(
                    "Instagram",
                    "text",
                    social_value(p, |s| &s.instagram),
                    &profile,
                    |p, v| social(p).instagram = v,
                )}
            </div>

            if let Some(message) = &*save_error {
                <p class="text-sm text-red-600 dark:text-red-400">{message.clone()}</p>
            }
            <button type="submit" disabled={*is_saving} class={BUTTON_PRIMARY}>
                {if *is_saving { "Saving..." } else { "Save profile" }}
            </button>
        </form>
    }
}

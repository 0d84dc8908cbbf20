use client_state::settings::REFRESH_INTERVALS;
use client_state::{Feature, RefreshSettings, SettingsStore};
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;
use yewdux::prelude::*;

use crate::components::modal::BUTTON_SECONDARY;
use crate::components::{DarkModeToggle, RequireRole};
use crate::contexts::use_toast;
use crate::hooks::use_title;
use crate::storage::BrowserStorage;
use crate::State;

fn store() -> SettingsStore<BrowserStorage> {
    SettingsStore::new(BrowserStorage::local())
}

#[function_component]
pub fn SettingsPage() -> Html {
    use_title("Settings");

    html! {
        <RequireRole>
            <div class="max-w-2xl space-y-8">
                <h1 class="text-3xl font-bold">{"Settings"}</h1>
                <section class="flex items-center justify-between">
                    <div>
                        <h2 class="font-semibold">{"Appearance"}</h2>
                        <p class="text-sm text-neutral-500 dark:text-neutral-400">
                            {"Dark mode is saved to your account."}
                        </p>
                    </div>
                    <DarkModeToggle />
                </section>
                <section class="space-y-4">
                    <h2 class="font-semibold">{"Automatic refresh"}</h2>
                    <FeatureSettings feature={Feature::Dashboard} label="System health" />
                    <FeatureSettings feature={Feature::Users} label="Users" />
                </section>
                <SortReset />
            </div>
        </RequireRole>
    }
}

#[derive(Properties, PartialEq)]
struct FeatureSettingsProps {
    feature: Feature,
    label: AttrValue,
}

/// Stored refresh settings for one feature. Pages pick them up on mount.
#[function_component]
fn FeatureSettings(props: &FeatureSettingsProps) -> Html {
    let (state, _) = use_store::<State>();
    let owner = state.owner_id();
    let feature = props.feature;
    let settings = {
        let owner = owner.clone();
        use_state(move || store().load(feature, &owner))
    };

    {
        let settings = settings.clone();
        use_effect_with(owner.clone(), move |owner| {
            settings.set(store().load(feature, owner));
        });
    }

    let save = {
        let settings = settings.clone();
        let owner = owner.clone();
        Callback::from(move |next: RefreshSettings| {
            store().save(feature, &owner, next);
            settings.set(next);
        })
    };

    let on_enabled = {
        let current = *settings;
        save.reform(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            RefreshSettings {
                enabled: input.checked(),
                ..current
            }
        })
    };

    let on_interval = {
        let current = *settings;
        let save = save.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            if let Ok(interval) = select.value().parse() {
                save.emit(RefreshSettings { interval, ..current });
            }
        })
    };

    let on_reset = {
        let settings = settings.clone();
        Callback::from(move |_: MouseEvent| {
            store().clear(feature, &owner);
            settings.set(feature.defaults());
        })
    };

    html! {
        <div class="flex flex-wrap items-center gap-4 text-sm">
            <span class="w-32 font-medium">{&props.label}</span>
            <label class="flex items-center gap-2">
                <input type="checkbox" checked={settings.enabled} onchange={on_enabled} />
                {"Enabled"}
            </label>
            <select
                onchange={on_interval}
                disabled={!settings.enabled}
                class="px-2 py-1 rounded-md border border-neutral-300 dark:border-neutral-600 bg-white dark:bg-neutral-700"
            >
                {for REFRESH_INTERVALS.iter().map(|minutes| html! {
                    <option value={minutes.to_string()} selected={*minutes == settings.interval}>
                        {format!("Every {minutes} min")}
                    </option>
                })}
            </select>
            <button onclick={on_reset} class="underline text-neutral-600 dark:text-neutral-300">
                {"Reset to Default"}
            </button>
        </div>
    }
}

#[function_component]
fn SortReset() -> Html {
    let (state, _) = use_store::<State>();
    let toasts = use_toast();
    let owner = state.owner_id();

    let onclick = Callback::from(move |_: MouseEvent| {
        store().clear_sort(&owner);
        toasts.success("Table sorting reset");
    });

    html! {
        <section class="flex items-center justify-between">
            <div>
                <h2 class="font-semibold">{"Users table"}</h2>
                <p class="text-sm text-neutral-500 dark:text-neutral-400">
                    {"Sort order is remembered on this device."}
                </p>
            </div>
            <button {onclick} class={BUTTON_SECONDARY}>{"Reset sorting"}</button>
        </section>
    }
}

use client_state::format::format_last_refresh;
use client_state::settings::REFRESH_INTERVALS;
use client_state::RefreshSettings;
use jiff::Timestamp;
use jiff::tz::TimeZone;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

const MOBILE_BREAKPOINT: f64 = 768.0;
const DESKTOP_WIDTH: f64 = 280.0;
const MOBILE_MAX_WIDTH: f64 = 400.0;
const MOBILE_MARGIN: f64 = 32.0;

#[derive(Properties, PartialEq)]
pub struct RefreshControlsProps {
    pub last_updated: Option<Timestamp>,
    pub is_updating: bool,
    pub settings: RefreshSettings,
    pub on_refresh: Callback<()>,
    pub on_settings_change: Callback<RefreshSettings>,
    pub on_reset: Callback<()>,
}

/// Popover CSS for the current viewport: full width of the parent less a
/// margin on phones, a fixed width anchored right otherwise.
fn popover_style(viewport_width: f64, parent_width: f64) -> String {
    if viewport_width < MOBILE_BREAKPOINT {
        let width = MOBILE_MAX_WIDTH.min(parent_width - MOBILE_MARGIN).max(0.0);
        format!("width: {width}px; left: 50%; transform: translateX(-50%);")
    } else {
        format!("width: {DESKTOP_WIDTH}px; right: 0;")
    }
}

fn measure(container: &NodeRef) -> String {
    let viewport = web_sys::window()
        .and_then(|w| w.inner_width().ok())
        .and_then(|w| w.as_f64())
        .unwrap_or(DESKTOP_WIDTH + MOBILE_BREAKPOINT);
    let parent = container
        .cast::<web_sys::Element>()
        .and_then(|e| e.parent_element())
        .map(|p| f64::from(p.client_width()))
        .unwrap_or(viewport);
    popover_style(viewport, parent)
}

/// Last refresh time, a manual refresh button, and a popover for the
/// automatic refresh settings.
#[function_component]
pub fn RefreshControls(props: &RefreshControlsProps) -> Html {
    let open = use_state(|| false);
    let style = use_state(String::new);
    let container = use_node_ref();

    let on_toggle_popover = {
        let open = open.clone();
        let style = style.clone();
        let container = container.clone();
        Callback::from(move |_: MouseEvent| {
            if !*open {
                style.set(measure(&container));
            }
            open.set(!*open);
        })
    };

    let on_enabled_change = {
        let settings = props.settings;
        let on_change = props.on_settings_change.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            on_change.emit(RefreshSettings {
                enabled: input.checked(),
                ..settings
            });
        })
    };

    let on_interval_change = {
        let settings = props.settings;
        let on_change = props.on_settings_change.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            match select.value().parse() {
                Ok(interval) => on_change.emit(RefreshSettings {
                    interval,
                    ..settings
                }),
                Err(_) => tracing::warn!("Bad interval {}", select.value()),
            }
        })
    };

    let last_refresh =
        format_last_refresh(props.last_updated, &TimeZone::system());

    html! {
        <div ref={container} class="relative flex items-center gap-3 text-sm">
            <span class="text-neutral-600 dark:text-neutral-400">
                {format!("Last updated: {last_refresh}")}
            </span>
            <button
                onclick={props.on_refresh.reform(|_: MouseEvent| ())}
                disabled={props.is_updating}
                class="px-3 py-1 rounded-md border border-neutral-300 dark:border-neutral-600 \
                       hover:bg-neutral-50 dark:hover:bg-neutral-700 \
                       disabled:opacity-50 disabled:cursor-not-allowed"
            >
                {if props.is_updating { "Refreshing..." } else { "Refresh" }}
            </button>
            <button
                onclick={on_toggle_popover}
                title="Refresh settings"
                class="px-2 py-1 rounded-md hover:bg-neutral-100 dark:hover:bg-neutral-700"
            >
                {"⚙"}
            </button>

            if *open {
                <div
                    style={(*style).clone()}
                    class="absolute top-full mt-2 z-40 p-4 space-y-4 rounded-lg shadow-lg \
                           bg-white dark:bg-neutral-800 border border-neutral-200 dark:border-neutral-700"
                >
                    <label class="flex items-center justify-between">
                        <span>{"Auto-refresh"}</span>
                        <input
                            type="checkbox"
                            checked={props.settings.enabled}
                            onchange={on_enabled_change}
                        />
                    </label>
                    <label class="flex items-center justify-between gap-3">
                        <span>{"Interval"}</span>
                        <select
                            onchange={on_interval_change}
                            disabled={!props.settings.enabled}
                            class="px-2 py-1 rounded-md border border-neutral-300 dark:border-neutral-600 bg-white dark:bg-neutral-700"
                        >
                            {for REFRESH_INTERVALS.iter().map(|minutes| html! {
                                <option
                                    value={minutes.to_string()}
                                    selected={*minutes == props.settings.interval}
                                >
                                    {if *minutes == 1 {
                                        "1 minute".to_string()
                                    } else {
                                        format!("{minutes} minutes")
                                    }}
                                </option>
                            })}
                        </select>
                    </label>
                    <p class="text-xs text-neutral-500 dark:text-neutral-400">
                        {"Settings are saved automatically"}
                    </p>
                    <button
                        onclick={props.on_reset.reform(|_: MouseEvent| ())}
                        class="text-xs font-medium underline text-neutral-600 dark:text-neutral-300"
                    >
                        {"Reset to Default"}
                    </button>
                </div>
            }
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::popover_style;

    #[test]
    fn phones_get_a_centred_popover_within_the_parent() {
        assert_eq!(
            popover_style(375.0, 343.0),
            "width: 311px; left: 50%; transform: translateX(-50%);"
        );
        assert_eq!(
            popover_style(700.0, 700.0),
            "width: 400px; left: 50%; transform: translateX(-50%);"
        );
    }

    #[test]
    fn desktops_get_a_fixed_width() {
        assert_eq!(popover_style(1280.0, 600.0), "width: 280px; right: 0;");
    }
}

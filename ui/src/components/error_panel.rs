use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct ErrorPanelProps {
    pub message: AttrValue,
    /// Shown as "Try again" when set.
    #[prop_or_default]
    pub on_retry: Option<Callback<()>>,
    /// Shown as "Dismiss" when set.
    #[prop_or_default]
    pub on_dismiss: Option<Callback<()>>,
}

#[function_component]
pub fn ErrorPanel(props: &ErrorPanelProps) -> Html {
    html! {
        <div class="p-4 rounded-md bg-red-50 dark:bg-red-900/20 border border-red-200 dark:border-red-800">
            <div class="flex items-start justify-between gap-4">
                <p class="text-sm text-red-700 dark:text-red-400">{&props.message}</p>
                <div class="flex gap-3 shrink-0">
                    if let Some(on_retry) = &props.on_retry {
                        <button
                            onclick={on_retry.reform(|_: MouseEvent| ())}
                            class="text-sm font-medium text-red-700 dark:text-red-300 underline"
                        >
                            {"Try again"}
                        </button>
                    }
                    if let Some(on_dismiss) = &props.on_dismiss {
                        <button
                            onclick={on_dismiss.reform(|_: MouseEvent| ())}
                            class="text-sm text-red-500 dark:text-red-400"
                        >
                            {"Dismiss"}
                        </button>
                    }
                </div>
            </div>
        </div>
    }
}

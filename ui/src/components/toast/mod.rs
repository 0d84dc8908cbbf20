use crate::contexts::toast::{Toast, ToastContext, ToastKind, use_toast};
use yew::prelude::*;

#[function_component]
pub fn ToastContainer() -> Html {
    let Some(context) = use_context::<ToastContext>() else {
        return html! {};
    };
    if context.toasts.is_empty() {
        return html! {};
    }

    html! {
        <div class="fixed top-4 right-4 z-50 space-y-3 max-w-sm w-full">
            {for context.toasts.iter().map(|toast| html! {
                <ToastItem key={toast.id} toast={toast.clone()} />
            })}
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct ToastItemProps {
    toast: Toast,
}

#[function_component]
fn ToastItem(props: &ToastItemProps) -> Html {
    let toasts = use_toast();
    let toast = &props.toast;

    let (colors, icon) = match toast.kind {
        ToastKind::Error => (
            "bg-red-50 dark:bg-red-900 border-red-200 dark:border-red-800 \
             text-red-700 dark:text-red-400",
            "✕",
        ),
        ToastKind::Warning => (
            "bg-amber-50 dark:bg-amber-900 border-amber-200 \
             dark:border-amber-800 text-amber-700 dark:text-amber-300",
            "!",
        ),
        ToastKind::Success => (
            "bg-green-50 dark:bg-green-900 border-green-200 \
             dark:border-green-800 text-green-700 dark:text-green-400",
            "✓",
        ),
    };

    let on_close = {
        let id = toast.id;
        Callback::from(move |_: MouseEvent| toasts.remove(id))
    };

    html! {
        <div class={classes!("p-4", "rounded-lg", "border", "shadow-lg", colors)}>
            <div class="flex items-start space-x-3">
                <span class="text-sm font-medium">{icon}</span>
                <p class="flex-1 text-sm font-medium leading-5">{&toast.message}</p>
                <button
                    onclick={on_close}
                    class="text-neutral-400 hover:text-neutral-600 dark:hover:text-neutral-200"
                    title="Dismiss"
                >
                    {"×"}
                </button>
            </div>
        </div>
    }
}

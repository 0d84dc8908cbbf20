use wasm_bindgen::JsCast;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct ModalProps {
    pub title: AttrValue,
    pub children: Children,
    /// Backdrop click or the close button.
    pub on_close: Callback<()>,
    #[prop_or_else(|| AttrValue::from("max-w-md"))]
    pub max_width: AttrValue,
}

#[function_component]
pub fn Modal(props: &ModalProps) -> Html {
    let backdrop_ref = use_node_ref();

    let on_backdrop_click = {
        let on_close = props.on_close.clone();
        let backdrop_ref = backdrop_ref.clone();
        Callback::from(move |e: MouseEvent| {
            let clicked_backdrop = backdrop_ref
                .cast::<web_sys::Element>()
                .zip(e.target())
                .is_some_and(|(backdrop, target)| {
                    target.dyn_ref::<web_sys::Element>() == Some(&backdrop)
                });
            if clicked_backdrop {
                on_close.emit(());
            }
        })
    };

    html! {
        <div
            ref={backdrop_ref}
            onclick={on_backdrop_click}
            class="fixed inset-0 bg-black bg-opacity-50 z-50 flex items-center justify-center p-4"
        >
            <div class={classes!(
                "bg-white", "dark:bg-neutral-800", "rounded-lg", "shadow-xl",
                "w-full", "p-6", props.max_width.to_string()
            )}>
                <div class="flex justify-between items-center mb-4">
                    <h3 class="text-lg font-semibold text-neutral-900 dark:text-neutral-100">
                        {&props.title}
                    </h3>
                    <button
                        onclick={props.on_close.reform(|_: MouseEvent| ())}
                        class="text-neutral-400 hover:text-neutral-600 dark:hover:text-neutral-200"
                        title="Close"
                    >
                        {"×"}
                    </button>
                </div>
                {for props.children.iter()}
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ConfirmDialogProps {
    pub title: AttrValue,
    pub message: AttrValue,
    pub confirm_text: AttrValue,
    pub on_confirm: Callback<()>,
    pub on_close: Callback<()>,
    #[prop_or_default]
    pub is_loading: bool,
    #[prop_or_default]
    pub error_message: Option<AttrValue>,
}

/// Yes/no confirmation for destructive actions.
#[function_component]
pub fn ConfirmDialog(props: &ConfirmDialogProps) -> Html {
    html! {
        <Modal title={props.title.clone()} on_close={props.on_close.clone()}>
            <p class="text-sm text-neutral-600 dark:text-neutral-400">
                {&props.message}
            </p>
            if let Some(error) = &props.error_message {
                <p class="mt-3 text-sm text-red-600 dark:text-red-400">{error}</p>
            }
            <div class="flex justify-end gap-3 mt-6">
                <button
                    onclick={props.on_close.reform(|_: MouseEvent| ())}
                    disabled={props.is_loading}
                    class={BUTTON_SECONDARY}
                >
                    {"Cancel"}
                </button>
                <button
                    onclick={props.on_confirm.reform(|_: MouseEvent| ())}
                    disabled={props.is_loading}
                    class="px-4 py-2 text-sm font-medium text-white bg-red-600 hover:bg-red-700 rounded-md disabled:opacity-50 disabled:cursor-not-allowed"
                >
                    {if props.is_loading { "Processing..." } else { props.confirm_text.as_str() }}
                </button>
            </div>
        </Modal>
    }
}

pub const BUTTON_PRIMARY: &str = "px-4 py-2 text-sm font-medium rounded-md \
    bg-neutral-900 dark:bg-white text-white dark:text-neutral-900 \
    hover:bg-neutral-800 dark:hover:bg-neutral-100 \
    disabled:opacity-50 disabled:cursor-not-allowed";

pub const BUTTON_SECONDARY: &str = "px-4 py-2 text-sm font-medium rounded-md \
    text-neutral-700 dark:text-neutral-300 bg-white dark:bg-neutral-700 \
    border border-neutral-300 dark:border-neutral-600 \
    hover:bg-neutral-50 dark:hover:bg-neutral-600 \
    disabled:opacity-50 disabled:cursor-not-allowed";

pub const INPUT_CLASS: &str = "w-full px-3 py-2 text-sm rounded-md \
    border border-neutral-300 dark:border-neutral-600 \
    bg-white dark:bg-neutral-700 text-neutral-900 dark:text-neutral-100 \
    focus:outline-none focus:ring-2 focus:ring-neutral-500";

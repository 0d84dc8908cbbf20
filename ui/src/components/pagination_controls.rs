use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct Props {
    /// 1-based
    pub page: usize,
    pub page_count: usize,
    pub total: usize,
    pub per_page: usize,
    pub on_page_change: Callback<usize>,
}

#[function_component]
pub fn PaginationControls(props: &Props) -> Html {
    let Props {
        page,
        page_count,
        total,
        per_page,
        ..
    } = *props;

    if page_count <= 1 {
        return html! {};
    }

    let on_previous = {
        let on_page_change = props.on_page_change.clone();
        Callback::from(move |_: MouseEvent| {
            on_page_change.emit(page.saturating_sub(1).max(1))
        })
    };
    let on_next = {
        let on_page_change = props.on_page_change.clone();
        Callback::from(move |_: MouseEvent| {
            on_page_change.emit((page + 1).min(page_count))
        })
    };

    let first = (page - 1) * per_page + 1;
    let last = (page * per_page).min(total);

    let button_class = "px-4 py-2 border border-neutral-300 dark:border-neutral-600 \
                        rounded-md text-sm font-medium text-neutral-700 \
                        dark:text-neutral-300 bg-white dark:bg-neutral-700 \
                        hover:bg-neutral-50 dark:hover:bg-neutral-600 \
                        disabled:opacity-50 disabled:cursor-not-allowed";

    html! {
        <div class="flex items-center justify-between mt-4 pt-4 \
                    border-t border-neutral-200 dark:border-neutral-700">
            <button onclick={on_previous} disabled={page <= 1} class={button_class}>
                {"Previous"}
            </button>
            <span class="text-sm text-neutral-600 dark:text-neutral-400">
                {format!("Showing {first}-{last} of {total} (page {page} of {page_count})")}
            </span>
            <button onclick={on_next} disabled={page >= page_count} class={button_class}>
                {"Next"}
            </button>
        </div>
    }
}

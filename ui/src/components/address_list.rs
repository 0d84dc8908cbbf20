use client_state::optimistic::apply_optimistically;
use payloads::UserId;
use payloads::responses::Address;
use yew::prelude::*;

use crate::components::ErrorPanel;
use crate::components::modal::{BUTTON_PRIMARY, BUTTON_SECONDARY};
use crate::components::profile_form::optional_input;
use crate::contexts::use_toast;
use crate::get_api_client;
use crate::hooks::use_session_guard;

fn without(addresses: &[Address], index: usize) -> Vec<Address> {
    let mut next = addresses.to_vec();
    if index < next.len() {
        next.remove(index);
    }
    next
}

fn with_replaced(
    addresses: &[Address],
    index: usize,
    address: Address,
) -> Vec<Address> {
    let mut next = addresses.to_vec();
    match next.get_mut(index) {
        Some(slot) => *slot = address,
        None => next.push(address),
    }
    next
}

/// Draft being edited: `index` is `None` for a new address.
#[derive(Clone, PartialEq)]
struct Draft {
    index: Option<usize>,
    address: Address,
}

#[derive(Properties, PartialEq)]
pub struct AddressListProps {
    pub user_id: UserId,
}

/// The user's addresses. Changes show up immediately and are rolled back
/// if the server rejects them.
#[function_component]
pub fn AddressList(props: &AddressListProps) -> Html {
    let addresses = use_state(Vec::<Address>::new);
    let load_error = use_state(|| None::<String>);
    let draft = use_state(|| None::<Draft>);
    let toasts = use_toast();
    let guard = use_session_guard();

    {
        let addresses = addresses.clone();
        let load_error = load_error.clone();
        let guard = guard.clone();
        use_effect_with(props.user_id, move |user_id| {
            let user_id = *user_id;
            yew::platform::spawn_local(async move {
                match guard.check(get_api_client().list_addresses(user_id).await) {
                    Ok(loaded) => addresses.set(loaded),
                    Err(e) => load_error.set(Some(e.to_string())),
                }
            });
        });
    }

    let on_save = {
        let addresses = addresses.clone();
        let draft = draft.clone();
        let toasts = toasts.clone();
        let guard = guard.clone();
        let user_id = props.user_id;
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let Some(Draft { index, address }) = (*draft).clone() else {
                return;
            };
            draft.set(None);

            let previous = (*addresses).clone();
            let addresses = addresses.clone();
            let toasts = toasts.clone();
            let guard = guard.clone();
            yew::platform::spawn_local(async move {
                let position = index.unwrap_or(previous.len());
                let result = apply_optimistically(
                    || {
                        addresses.set(with_replaced(
                            &previous,
                            position,
                            address.clone(),
                        ));
                        previous.clone()
                    },
                    |previous| addresses.set(previous),
                    || async {
                        let client = get_api_client();
                        let saved = match address.id {
                            Some(address_id) => {
                                client
                                    .update_address(user_id, address_id, &address)
                                    .await
                            }
                            None => client.create_address(user_id, &address).await,
                        };
                        guard.check(saved)
                    },
                )
                .await;

                match result {
                    Ok(saved) => {
                        addresses.set(with_replaced(&previous, position, saved))
                    }
                    Err(e) => {
                        tracing::warn!("Saving address failed: {e}");
                        toasts.error(format!("Failed to save address: {e}"));
                    }
                }
            });
        })
    };

    let on_delete = {
        let addresses = addresses.clone();
        let toasts = toasts.clone();
        let guard = guard.clone();
        let user_id = props.user_id;
        Callback::from(move |index: usize| {
            let previous = (*addresses).clone();
            let Some(address_id) =
                previous.get(index).and_then(|address| address.id)
            else {
                return;
            };
            let addresses = addresses.clone();
            let toasts = toasts.clone();
            let guard = guard.clone();
            yew::platform::spawn_local(async move {
                let result = apply_optimistically(
                    || {
                        addresses.set(without(&previous, index));
                        previous.clone()
                    },
                    |previous| addresses.set(previous),
                    || async {
                        let deleted = get_api_client()
                            .delete_address(user_id, address_id)
                            .await;
                        guard.check(deleted)
                    },
                )
                .await;
                if let Err(e) = result {
                    tracing::warn!("Deleting address failed: {e}");
                    toasts.error(format!("Failed to delete address: {e}"));
                }
            });
        })
    };

    if let Some(message) = &*load_error {
        return html! { <ErrorPanel message={message.clone()} /> };
    }

    let on_add = {
        let draft = draft.clone();
        Callback::from(move |_: MouseEvent| {
            draft.set(Some(Draft {
                index: None,
                address: Address::default(),
            }))
        })
    };

    let on_cancel = {
        let draft = draft.clone();
        Callback::from(move |_: MouseEvent| draft.set(None))
    };

    html! {
        <div class="space-y-4">
            <ul class="divide-y divide-neutral-200 dark:divide-neutral-700">
                {for addresses.iter().enumerate().map(|(index, address)| {
                    let on_edit = {
                        let draft = draft.clone();
                        let address = address.clone();
                        Callback::from(move |_: MouseEvent| {
                            draft.set(Some(Draft {
                                index: Some(index),
                                address: address.clone(),
                            }))
                        })
                    };
                    let on_remove = on_delete.reform(move |_: MouseEvent| index);
                    html! {
                        <li class="py-3 flex items-center justify-between gap-4">
                            <span class="text-sm">{address.summary()}</span>
                            <span class="space-x-3 text-sm whitespace-nowrap">
                                <button onclick={on_edit} class="hover:underline">{"Edit"}</button>
                                if address.id.is_some() {
                                    <button onclick={on_remove} class="text-red-600 dark:text-red-400 hover:underline">
                                        {"Delete"}
                                    </button>
                                }
                            </span>
                        </li>
                    }
                })}
            </ul>
            if addresses.is_empty() {
                <p class="text-sm text-neutral-500">{"No addresses yet"}</p>
            }

            if let Some(current) = &*draft {
                <form onsubmit={on_save} class="space-y-3 p-4 rounded-lg border border-neutral-200 dark:border-neutral-700">
                    {draft_fields(current, &draft)}
                    <div class="flex justify-end gap-3">
                        <button
                            type="button"
                            onclick={on_cancel}
                            class={BUTTON_SECONDARY}
                        >
                            {"Cancel"}
                        </button>
                        <button type="submit" class={BUTTON_PRIMARY}>{"Save address"}</button>
                    </div>
                </form>
            } else {
                <button onclick={on_add} class={BUTTON_SECONDARY}>{"Add address"}</button>
            }
        </div>
    }
}

fn draft_fields(current: &Draft, draft: &UseStateHandle<Option<Draft>>) -> Html {
    let a = &current.address;

    html! {
        <div class="grid md:grid-cols-2 gap-3">
            {optional_input("Street", "text", a.street.clone(), draft, |d, v| {
                if let Some(d) = d { d.address.street = v }
            })}
            {optional_input("City", "text", a.city.clone(), draft, |d, v| {
                if let Some(d) = d { d.address.city = v }
            })}
            {optional_input("State", "text", a.state.clone(), draft, |d, v| {
                if let Some(d) = d { d.address.state = v }
            })}
            {optional_input("Postal code", "text", a.postal_code.clone(), draft, |d, v| {
                if let Some(d) = d { d.address.postal_code = v }
            })}
            {optional_input("Country", "text", a.country.clone(), draft, |d, v| {
                if let Some(d) = d { d.address.country = v }
            })}
        </div>
    }
}

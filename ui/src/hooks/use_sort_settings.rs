use client_state::{SettingsStore, SortSettings, UserSortField};
use yew::prelude::*;
use yewdux::prelude::*;

use crate::State;
use crate::storage::BrowserStorage;

/// The users table's sort order, persisted per user. Clicking the current
/// column flips direction; another column starts ascending.
#[hook]
pub fn use_sort_settings() -> (SortSettings, Callback<UserSortField>) {
    let (state, _) = use_store::<State>();
    let owner = state.owner_id();
    let sort = use_state(SortSettings::default);

    {
        let sort = sort.clone();
        use_effect_with(owner.clone(), move |owner| {
            sort.set(SettingsStore::new(BrowserStorage::local()).load_sort(owner));
        });
    }

    let on_sort = {
        let sort = sort.clone();
        Callback::from(move |field: UserSortField| {
            let next = sort.toggled(field);
            SettingsStore::new(BrowserStorage::local()).save_sort(&owner, next);
            sort.set(next);
        })
    };

    (*sort, on_sort)
}

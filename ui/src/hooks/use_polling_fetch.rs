use client_state::{
    Feature, FetchCoordinator, FetchState, PollingTimer, RefreshSettings,
    SettingsStore, TimeSource,
};
use futures::future::LocalBoxFuture;
use payloads::ClientError;
use yew::prelude::*;
use yewdux::prelude::*;

use super::use_session_guard;
use crate::State;
use crate::scheduler::IntervalScheduler;
use crate::storage::BrowserStorage;

/// State of a polled resource plus the controls the refresh UI needs.
pub struct PollingFetch<T: Clone + 'static> {
    pub state: FetchState<T>,
    pub settings: RefreshSettings,
    /// Manual refresh: shows the loading flag and restarts the countdown.
    pub refresh: Callback<()>,
    pub update_settings: Callback<RefreshSettings>,
    pub reset_settings: Callback<()>,
    pub dismiss_error: Callback<()>,
    pub coordinator: FetchCoordinator<T>,
}

impl<T: Clone + 'static> PollingFetch<T> {
    /// Refresh after a write without restarting polling.
    pub fn reload(&self) {
        yew::platform::spawn_local(self.coordinator.run(false));
    }
}

fn settings_store() -> SettingsStore<BrowserStorage> {
    SettingsStore::new(BrowserStorage::local())
}

/// Fetch on mount, then keep the data fresh on the cadence the user picked
/// for `feature`.
///
/// Polling ticks refresh silently. A 401 from any request logs the user
/// out. Everything is torn down on unmount: the timer is cleared and the
/// request in flight is abandoned.
#[hook]
pub fn use_polling_fetch<T, F>(
    feature: Feature,
    fallback_message: &'static str,
    fetcher: F,
) -> PollingFetch<T>
where
    T: Clone + 'static,
    F: Fn() -> LocalBoxFuture<'static, Result<T, ClientError>> + 'static,
{
    let (state, _) = use_store::<State>();
    let guard = use_session_guard();
    let owner = state.owner_id();
    let snapshot = use_state(FetchState::<T>::default);
    let settings = {
        let owner = owner.clone();
        use_state(move || settings_store().load(feature, &owner))
    };

    let coordinator = use_memo((), move |_| {
        FetchCoordinator::new(fetcher, TimeSource::new(), fallback_message)
    });

    let timer = {
        let coordinator = coordinator.clone();
        let initial = *settings;
        use_memo((), move |_| {
            let coordinator = (*coordinator).clone();
            PollingTimer::new(IntervalScheduler, initial, move || {
                tracing::debug!("polling tick");
                yew::platform::spawn_local(coordinator.run(false));
            })
        })
    };

    // Mount: subscribe, fetch, start polling. Unmount: tear it all down.
    {
        let coordinator = coordinator.clone();
        let timer = timer.clone();
        let snapshot = snapshot.clone();
        use_effect_with((), move |_| {
            coordinator.subscribe(move |state| snapshot.set(state.clone()));
            coordinator.on_auth_error(move || guard.expire());
            yew::platform::spawn_local(coordinator.run(true));
            timer.start();

            move || {
                timer.dispose();
                coordinator.cancel();
                coordinator.unsubscribe();
            }
        });
    }

    // Settings are per user; reload them once the user is known.
    {
        let settings = settings.clone();
        let timer = timer.clone();
        use_effect_with(owner.clone(), move |owner| {
            let loaded = settings_store().load(feature, owner);
            settings.set(loaded);
            timer.update(loaded);
        });
    }

    let refresh = {
        let coordinator = coordinator.clone();
        let timer = timer.clone();
        Callback::from(move |_| {
            let coordinator = coordinator.clone();
            let timer = timer.clone();
            yew::platform::spawn_local(async move {
                // Skipped when unmount cancelled the request.
                if coordinator.request(true).await {
                    timer.reset();
                }
            });
        })
    };

    let update_settings = {
        let settings = settings.clone();
        let timer = timer.clone();
        let owner = owner.clone();
        Callback::from(move |new_settings: RefreshSettings| {
            settings_store().save(feature, &owner, new_settings);
            settings.set(new_settings);
            timer.update(new_settings);
        })
    };

    let reset_settings = {
        let settings = settings.clone();
        let timer = timer.clone();
        Callback::from(move |_| {
            settings_store().clear(feature, &owner);
            let defaults = feature.defaults();
            settings.set(defaults);
            timer.update(defaults);
        })
    };

    let dismiss_error = {
        let coordinator = coordinator.clone();
        Callback::from(move |_| coordinator.dismiss_error())
    };

    PollingFetch {
        state: (*snapshot).clone(),
        settings: *settings,
        refresh,
        update_settings,
        reset_settings,
        dismiss_error,
        coordinator: (*coordinator).clone(),
    }
}

use client_state::Feature;
use futures::FutureExt;
use payloads::User;
use yew::prelude::*;

use super::{PollingFetch, use_polling_fetch};
use crate::users_service::users_service;

/// The user directory, refreshed on the users table's schedule.
#[hook]
pub fn use_user_data() -> PollingFetch<Vec<User>> {
    use_polling_fetch(Feature::Users, "Failed to fetch users", || {
        let service = users_service();
        async move { service.list().await }.boxed_local()
    })
}

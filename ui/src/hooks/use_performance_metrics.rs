use client_state::Feature;
use futures::FutureExt;
use jiff::{SignedDuration, Timestamp};
use payloads::requests::MetricsWindow;
use payloads::responses::PerformanceData;
use yew::prelude::*;

use super::{PollingFetch, use_polling_fetch};
use crate::get_api_client;

/// Performance samples for the last day, refreshed on the dashboard's
/// schedule.
#[hook]
pub fn use_performance_metrics() -> PollingFetch<PerformanceData> {
    use_polling_fetch(
        Feature::Dashboard,
        "Failed to fetch performance metrics",
        || {
            let end_time = Timestamp::now();
            let window = MetricsWindow {
                start_time: end_time
                    .checked_sub(SignedDuration::from_hours(24))
                    .ok(),
                end_time: Some(end_time),
            };
            async move {
                let api_client = get_api_client();
                api_client.get_metrics(&window).await
            }
            .boxed_local()
        },
    )
}

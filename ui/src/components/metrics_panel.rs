use client_state::format::{
    format_millis, format_percent, format_seconds,
};
use client_state::metrics::{
    StatusLevel, auth_split, connection_series, endpoint_rows, health_score,
    ip_rows, system_status, time_series, utilization,
};
use jiff::Timestamp;
use jiff::tz::TimeZone;
use payloads::responses::{DailySummary, PerformanceData};
use yew::prelude::*;

use crate::components::{ErrorPanel, RefreshControls};
use crate::hooks::use_performance_metrics;

const CARD_CLASS: &str = "p-4 rounded-lg border border-neutral-200 dark:border-neutral-700 \
                          bg-white dark:bg-neutral-800";

fn level_class(level: StatusLevel) -> &'static str {
    match level {
        StatusLevel::Normal => "text-green-600 dark:text-green-400",
        StatusLevel::Warning => "text-amber-600 dark:text-amber-400",
        StatusLevel::Critical => "text-red-600 dark:text-red-400",
    }
}

fn clock(timestamp: Timestamp, tz: &TimeZone) -> String {
    timestamp.to_zoned(tz.clone()).strftime("%H:%M").to_string()
}

#[derive(Properties, PartialEq)]
pub struct MetricsPanelProps {
    /// Include the series and per-endpoint/per-client breakdowns.
    #[prop_or_default]
    pub detailed: bool,
}

/// System health for the last day, polled on the dashboard's schedule.
#[function_component]
pub fn MetricsPanel(props: &MetricsPanelProps) -> Html {
    let metrics = use_performance_metrics();

    let body = match (&metrics.state.data, &metrics.state.error) {
        (None, Some(error)) => html! {
            <ErrorPanel message={error.clone()} on_retry={metrics.refresh.clone()} />
        },
        (None, None) => html! {
            <p class="text-center py-12 text-neutral-600 dark:text-neutral-400">
                {"Loading metrics..."}
            </p>
        },
        (Some(data), error) => html! {
            <>
                if let Some(error) = error {
                    <ErrorPanel
                        message={error.clone()}
                        on_dismiss={metrics.dismiss_error.clone()}
                    />
                }
                {summary_cards(&data.summary.last_24h)}
                if props.detailed {
                    {series_tables(data)}
                    {breakdown_tables(&data.summary.last_24h)}
                }
            </>
        },
    };

    html! {
        <section class="space-y-4">
            <div class="flex flex-wrap items-center justify-between gap-4">
                <h2 class="text-2xl font-bold">{"System health"}</h2>
                <RefreshControls
                    last_updated={metrics.state.last_updated}
                    is_updating={metrics.state.is_updating}
                    settings={metrics.settings}
                    on_refresh={metrics.refresh.clone()}
                    on_settings_change={metrics.update_settings.clone()}
                    on_reset={metrics.reset_settings.clone()}
                />
            </div>
            {body}
        </section>
    }
}

fn card(label: &'static str, value: String, level: Option<StatusLevel>) -> Html {
    html! {
        <div class={CARD_CLASS}>
            <p class="text-sm text-neutral-500 dark:text-neutral-400">{label}</p>
            <p class="text-2xl font-semibold">{value}</p>
            if let Some(level) = level {
                <p class={classes!("text-xs", "font-medium", level_class(level))}>
                    {level.label()}
                </p>
            }
        </div>
    }
}

fn summary_cards(summary: &DailySummary) -> Html {
    let status = system_status(summary);
    let auth = auth_split(summary);
    let score = health_score(summary);
    let score_level = StatusLevel::classify(100.0 - score, 30.0, 50.0);

    html! {
        <div class="grid grid-cols-2 md:grid-cols-4 gap-4">
            {card("Health score", format!("{score:.0}"), Some(score_level))}
            {card("CPU", format_percent(summary.avg_cpu_usage), Some(status.cpu))}
            {card("Memory", format_percent(summary.avg_memory_usage), Some(status.memory))}
            {card("Disk", format_percent(summary.avg_disk_usage), None)}
            {card(
                "Response time",
                format_millis(summary.avg_response_time),
                Some(status.response_time),
            )}
            {card("Error rate", format_percent(summary.error_rate), Some(status.error_rate))}
            {card(
                "Connection load",
                format_percent(utilization(summary)),
                Some(status.connections),
            )}
            {card(
                "Authenticated",
                format!("{}% of {}", auth.rate(), auth.total()),
                None,
            )}
            {card("Requests", summary.total_requests.to_string(), None)}
            {card("Unique clients", summary.unique_ips.to_string(), None)}
            {card(
                "Avg connection",
                format_seconds(summary.avg_connection_duration),
                None,
            )}
            {card(
                "Peak connections",
                summary.max_active_connections.to_string(),
                None,
            )}
        </div>
    }
}

const TH: &str = "px-3 py-2 text-left font-medium";
const TD: &str = "px-3 py-2";

fn series_tables(data: &PerformanceData) -> Html {
    let tz = TimeZone::system();
    let resources = time_series(data);
    let connections = connection_series(data);

    html! {
        <div class="grid md:grid-cols-2 gap-4">
            <div class={CARD_CLASS}>
                <h3 class="font-semibold mb-2">{"Resources"}</h3>
                <table class="min-w-full text-sm">
                    <thead>
                        <tr>
                            <th class={TH}>{"Time"}</th>
                            <th class={TH}>{"CPU"}</th>
                            <th class={TH}>{"Memory"}</th>
                            <th class={TH}>{"Disk"}</th>
                            <th class={TH}>{"Duration"}</th>
                        </tr>
                    </thead>
                    <tbody>
                        {for resources.iter().map(|point| html! {
                            <tr key={point.timestamp.as_second()}>
                                <td class={TD}>{clock(point.timestamp, &tz)}</td>
                                <td class={TD}>{format_percent(point.cpu)}</td>
                                <td class={TD}>{format_percent(point.memory)}</td>
                                <td class={TD}>{format_percent(point.disk)}</td>
                                <td class={TD}>{format_seconds(point.duration)}</td>
                            </tr>
                        })}
                    </tbody>
                </table>
            </div>
            <div class={CARD_CLASS}>
                <h3 class="font-semibold mb-2">{"Connections"}</h3>
                <table class="min-w-full text-sm">
                    <thead>
                        <tr>
                            <th class={TH}>{"Time"}</th>
                            <th class={TH}>{"Total"}</th>
                            <th class={TH}>{"Authenticated"}</th>
                            <th class={TH}>{"Anonymous"}</th>
                        </tr>
                    </thead>
                    <tbody>
                        {for connections.iter().map(|point| html! {
                            <tr key={point.timestamp.as_second()}>
                                <td class={TD}>{clock(point.timestamp, &tz)}</td>
                                <td class={TD}>{point.total.to_string()}</td>
                                <td class={TD}>{point.authenticated.to_string()}</td>
                                <td class={TD}>{point.anonymous.to_string()}</td>
                            </tr>
                        })}
                    </tbody>
                </table>
            </div>
        </div>
    }
}

fn breakdown_tables(summary: &DailySummary) -> Html {
    let endpoints = endpoint_rows(summary);
    let clients = ip_rows(summary);

    html! {
        <div class="grid md:grid-cols-2 gap-4">
            <div class={CARD_CLASS}>
                <h3 class="font-semibold mb-2">{"Endpoints"}</h3>
                <table class="min-w-full text-sm">
                    <thead>
                        <tr>
                            <th class={TH}>{"Endpoint"}</th>
                            <th class={TH}>{"Requests"}</th>
                            <th class={TH}>{"Avg duration"}</th>
                            <th class={TH}>{"Auth rate"}</th>
                        </tr>
                    </thead>
                    <tbody>
                        {for endpoints.iter().map(|row| html! {
                            <tr key={row.endpoint.clone()}>
                                <td class={classes!(TD, "font-mono")}>{&row.endpoint}</td>
                                <td class={TD}>{row.requests.to_string()}</td>
                                <td class={TD}>{format_millis(row.avg_duration)}</td>
                                <td class={TD}>{format_percent(row.auth_rate)}</td>
                            </tr>
                        })}
                    </tbody>
                </table>
            </div>
            <div class={CARD_CLASS}>
                <h3 class="font-semibold mb-2">{"Clients"}</h3>
                <table class="min-w-full text-sm">
                    <thead>
                        <tr>
                            <th class={TH}>{"IP"}</th>
                            <th class={TH}>{"Requests"}</th>
                            <th class={TH}>{"Endpoints"}</th>
                            <th class={TH}>{"Rate limited"}</th>
                        </tr>
                    </thead>
                    <tbody>
                        {for clients.iter().map(|row| html! {
                            <tr key={row.ip.clone()}>
                                <td class={classes!(TD, "font-mono")}>{&row.ip}</td>
                                <td class={TD}>{row.requests.to_string()}</td>
                                <td class={TD}>{row.endpoint_count.to_string()}</td>
                                <td class={TD}>{row.rate_limited_count.to_string()}</td>
                            </tr>
                        })}
                    </tbody>
                </table>
            </div>
        </div>
    }
}

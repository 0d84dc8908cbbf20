//! Shapes the performance endpoint's payload into rows and series for the
//! metrics dashboard.

use jiff::Timestamp;
use payloads::responses::{DailySummary, PerformanceData, PerformanceMetric};

/// Charts show at most this many of the most recent samples.
pub const SERIES_LEN: usize = 24;

#[derive(Debug, Clone, PartialEq)]
pub struct ResourcePoint {
    pub timestamp: Timestamp,
    pub cpu: f64,
    pub memory: f64,
    pub disk: f64,
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionPoint {
    pub timestamp: Timestamp,
    pub total: u64,
    pub authenticated: u64,
    pub anonymous: u64,
}

fn recent(metrics: &[PerformanceMetric]) -> Vec<&PerformanceMetric> {
    let mut sorted: Vec<&PerformanceMetric> = metrics.iter().collect();
    sorted.sort_by_key(|metric| metric.timestamp);
    let skip = sorted.len().saturating_sub(SERIES_LEN);
    sorted.split_off(skip)
}

/// Resource usage over time, oldest first.
pub fn time_series(data: &PerformanceData) -> Vec<ResourcePoint> {
    recent(&data.metrics)
        .into_iter()
        .map(|metric| ResourcePoint {
            timestamp: metric.timestamp,
            cpu: metric.cpu_usage,
            memory: metric.memory_usage,
            disk: metric.disk_usage,
            duration: metric.avg_connection_duration,
        })
        .collect()
}

pub fn connection_series(data: &PerformanceData) -> Vec<ConnectionPoint> {
    recent(&data.metrics)
        .into_iter()
        .map(|metric| ConnectionPoint {
            timestamp: metric.timestamp,
            total: metric.active_connections,
            authenticated: metric.authenticated_connections,
            anonymous: metric.anonymous_connections,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthSplit {
    pub authenticated: u64,
    pub anonymous: u64,
}

impl AuthSplit {
    pub fn total(&self) -> u64 {
        self.authenticated + self.anonymous
    }

    pub fn rate(&self) -> String {
        auth_rate(self.authenticated, self.anonymous)
    }
}

pub fn auth_split(summary: &DailySummary) -> AuthSplit {
    AuthSplit {
        authenticated: summary.authenticated_connections,
        anonymous: summary.anonymous_connections,
    }
}

/// Share of authenticated connections as a percentage with one decimal,
/// "0.0" when there were none at all.
pub fn auth_rate(authenticated: u64, anonymous: u64) -> String {
    let total = authenticated + anonymous;
    if total == 0 {
        return "0.0".to_string();
    }
    format!("{:.1}", authenticated as f64 / total as f64 * 100.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct EndpointRow {
    pub endpoint: String,
    pub requests: u64,
    pub avg_duration: f64,
    pub auth_rate: f64,
}

/// Busiest endpoints first.
pub fn endpoint_rows(summary: &DailySummary) -> Vec<EndpointRow> {
    let mut rows: Vec<EndpointRow> = summary
        .endpoint_stats
        .iter()
        .map(|(endpoint, stat)| EndpointRow {
            endpoint: endpoint.clone(),
            requests: stat.requests,
            avg_duration: stat.avg_duration,
            auth_rate: stat.auth_rate,
        })
        .collect();
    rows.sort_by(|a, b| b.requests.cmp(&a.requests));
    rows
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpRow {
    pub ip: String,
    pub requests: u64,
    pub endpoint_count: usize,
    pub rate_limited_count: u64,
}

/// Busiest clients first.
pub fn ip_rows(summary: &DailySummary) -> Vec<IpRow> {
    let mut rows: Vec<IpRow> = summary
        .ip_stats
        .iter()
        .map(|(ip, stat)| IpRow {
            ip: ip.clone(),
            requests: stat.requests,
            endpoint_count: stat.endpoints.len(),
            rate_limited_count: stat.rate_limited_count,
        })
        .collect();
    rows.sort_by(|a, b| b.requests.cmp(&a.requests));
    rows
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Normal,
    Warning,
    Critical,
}

impl StatusLevel {
    /// Levels trip when the value is strictly above the threshold.
    pub fn classify(value: f64, warning: f64, critical: f64) -> Self {
        if value > critical {
            Self::Critical
        } else if value > warning {
            Self::Warning
        } else {
            Self::Normal
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Warning => "Warning",
            Self::Critical => "Critical",
        }
    }
}

/// Status of each headline figure, using the dashboard's fixed thresholds.
pub struct SystemStatus {
    pub cpu: StatusLevel,
    pub memory: StatusLevel,
    pub connections: StatusLevel,
    pub error_rate: StatusLevel,
    pub response_time: StatusLevel,
}

pub fn system_status(summary: &DailySummary) -> SystemStatus {
    SystemStatus {
        cpu: StatusLevel::classify(summary.avg_cpu_usage, 60.0, 80.0),
        memory: StatusLevel::classify(summary.avg_memory_usage, 60.0, 80.0),
        connections: StatusLevel::classify(utilization(summary), 70.0, 90.0),
        error_rate: StatusLevel::classify(summary.error_rate, 1.0, 5.0),
        response_time: StatusLevel::classify(
            summary.avg_response_time,
            500.0,
            1000.0,
        ),
    }
}

/// Average as a percentage of peak concurrent connections.
pub fn utilization(summary: &DailySummary) -> f64 {
    if summary.max_active_connections == 0 {
        return 0.0;
    }
    summary.avg_active_connections / summary.max_active_connections as f64
        * 100.0
}

/// Blend of headroom scores, clamped to 0..=100.
pub fn health_score(summary: &DailySummary) -> f64 {
    let scores = [
        100.0 - summary.avg_cpu_usage,
        100.0 - summary.avg_memory_usage,
        100.0 - summary.error_rate * 20.0,
        (100.0 - summary.avg_response_time / 10.0).max(0.0),
        100.0 - utilization(summary),
    ];
    let average = scores.iter().sum::<f64>() / scores.len() as f64;
    average.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use payloads::responses::{EndpointStat, IpStat};
    use std::collections::BTreeMap;

    fn sample(minute: i64, active: u64) -> PerformanceMetric {
        PerformanceMetric {
            timestamp: Timestamp::from_second(minute * 60).unwrap(),
            cpu_usage: minute as f64,
            memory_usage: 50.0,
            disk_usage: 70.0,
            avg_connection_duration: 1.5,
            active_connections: active,
            authenticated_connections: active / 2,
            anonymous_connections: active - active / 2,
            response_time: None,
            endpoint: None,
            http_status: None,
        }
    }

    #[test]
    fn series_are_sorted_and_truncated() {
        // 30 samples, newest first
        let data = PerformanceData {
            metrics: (0..30).rev().map(|m| sample(m, 10)).collect(),
            ..Default::default()
        };
        let series = time_series(&data);
        assert_eq!(series.len(), SERIES_LEN);
        assert_eq!(series[0].cpu, 6.0);
        assert_eq!(series[SERIES_LEN - 1].cpu, 29.0);

        let connections = connection_series(&data);
        assert_eq!(connections.len(), SERIES_LEN);
        assert_eq!(connections[0].total, 10);
        assert_eq!(connections[0].authenticated + connections[0].anonymous, 10);
    }

    #[test]
    fn short_series_are_kept_whole() {
        let data = PerformanceData {
            metrics: vec![sample(2, 4), sample(1, 3)],
            ..Default::default()
        };
        let totals: Vec<u64> =
            connection_series(&data).iter().map(|p| p.total).collect();
        assert_eq!(totals, vec![3, 4]);
    }

    #[test]
    fn auth_rate_formatting() {
        assert_eq!(auth_rate(0, 0), "0.0");
        assert_eq!(auth_rate(1, 2), "33.3");
        assert_eq!(auth_rate(5, 0), "100.0");

        let summary = DailySummary {
            authenticated_connections: 3,
            anonymous_connections: 1,
            ..Default::default()
        };
        let split = auth_split(&summary);
        assert_eq!(split.total(), 4);
        assert_eq!(split.rate(), "75.0");
    }

    #[test]
    fn rows_sorted_by_requests_descending() {
        let endpoint = |requests| EndpointStat {
            requests,
            avg_duration: 0.1,
            auth_rate: 50.0,
        };
        let ip = |requests| IpStat {
            requests,
            endpoints: vec!["/api/users".into()],
            rate_limited_count: 0,
        };
        let summary = DailySummary {
            endpoint_stats: BTreeMap::from([
                ("/a".to_string(), endpoint(5)),
                ("/b".to_string(), endpoint(50)),
                ("/c".to_string(), endpoint(20)),
            ]),
            ip_stats: BTreeMap::from([
                ("10.0.0.1".to_string(), ip(1)),
                ("10.0.0.2".to_string(), ip(9)),
            ]),
            ..Default::default()
        };

        let endpoints: Vec<_> = endpoint_rows(&summary)
            .into_iter()
            .map(|row| row.endpoint)
            .collect();
        assert_eq!(endpoints, vec!["/b", "/c", "/a"]);

        let ips = ip_rows(&summary);
        assert_eq!(ips[0].ip, "10.0.0.2");
        assert_eq!(ips[0].endpoint_count, 1);
    }

    #[test]
    fn status_levels_and_health() {
        assert_eq!(StatusLevel::classify(60.0, 60.0, 80.0), StatusLevel::Normal);
        assert_eq!(StatusLevel::classify(60.5, 60.0, 80.0), StatusLevel::Warning);
        assert_eq!(StatusLevel::classify(81.0, 60.0, 80.0), StatusLevel::Critical);

        let idle = DailySummary::default();
        assert_eq!(utilization(&idle), 0.0);
        assert_eq!(health_score(&idle), 100.0);
        assert_eq!(system_status(&idle).cpu, StatusLevel::Normal);

        let busy = DailySummary {
            avg_cpu_usage: 100.0,
            avg_memory_usage: 100.0,
            error_rate: 10.0,
            avg_response_time: 2000.0,
            avg_active_connections: 10.0,
            max_active_connections: 10,
            ..Default::default()
        };
        assert_eq!(health_score(&busy), 0.0);
        assert_eq!(system_status(&busy).connections, StatusLevel::Critical);
    }
}

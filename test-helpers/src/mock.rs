//! Realistic data for the development server: a directory of users across
//! every role and status, profiles with addresses, and a day of performance
//! samples with endpoint and client breakdowns.

use crate::TestApp;
use jiff::{Span, Timestamp};
use payloads::responses::{
    Address, DailySummary, EndpointStat, IpStat, PerformanceData,
    PerformanceMetric, PerformanceSummary, Profile, SocialMedia,
};
use payloads::{Role, User, UserId, UserStatus};
use std::collections::BTreeMap;

const ENDPOINTS: [&str; 5] = [
    "/api/users",
    "/api/auth/me",
    "/api/performance/metrics",
    "/api/users/{id}/profile",
    "/api/users/{id}/preferences",
];

pub struct DevDataset {
    pub users: Vec<User>,
    pub metric_count: usize,
}

impl DevDataset {
    /// Adds extra users and a day of metrics on top of the fixtures every
    /// [`TestApp`] starts with.
    pub fn create(app: &TestApp) -> Self {
        tracing::info!("👥 Creating user directory");
        let people = [
            ("Dana", "Okafor", Role::User, UserStatus::Active),
            ("Eitan", "Rosen", Role::User, UserStatus::Inactive),
            ("Farah", "Haddad", Role::Moderator, UserStatus::Active),
            ("Goran", "Petrov", Role::User, UserStatus::Pending),
            ("Hana", "Sato", Role::Admin, UserStatus::Active),
            ("Ines", "Duarte", Role::User, UserStatus::Active),
            ("Jonas", "Berg", Role::User, UserStatus::Other("suspended".into())),
            ("Kemi", "Adeyemi", Role::User, UserStatus::Active),
            ("Lior", "Levi", Role::Moderator, UserStatus::Inactive),
            ("Mara", "Novak", Role::User, UserStatus::Active),
            ("Niko", "Laine", Role::User, UserStatus::Pending),
        ];

        let now = Timestamp::now();
        let mut users = Vec::with_capacity(people.len());
        for (i, (first, last, role, status)) in people.into_iter().enumerate() {
            let user_name = format!("{}.{}", first, last).to_lowercase();
            let user = app.state.insert_user(
                User {
                    id: UserId(0),
                    email: format!("{user_name}@example.com"),
                    user_name,
                    first_name: first.into(),
                    last_name: last.into(),
                    roles: vec![role],
                    status,
                    created_at: Some(now - Span::new().hours(24 * (i as i64 + 1))),
                    last_login: (i % 3 != 0)
                        .then(|| now - Span::new().hours(i as i64 * 5)),
                },
                "Initial-password-123!",
            );
            users.push(user);
        }

        tracing::info!("🏠 Adding profiles and addresses");
        let admin = app.fixtures.admin.id;
        {
            let mut store = app.state.store();
            store.profiles.insert(
                admin,
                Profile {
                    id: Some(1),
                    user_id: Some(admin),
                    bio: Some("Keeps the lights on.".into()),
                    website: Some("https://example.com/alice".into()),
                    social_media: Some(SocialMedia {
                        github: Some("alice-admin".into()),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            );
        }
        let address = Address {
            street: Some("12 Harbour St".into()),
            city: Some("Wellington".into()),
            state: None,
            country: Some("New Zealand".into()),
            postal_code: Some("6011".into()),
            ..Default::default()
        };
        app.state.insert_address(admin, address);

        tracing::info!("📈 Generating 24 hours of performance samples");
        let metrics = sample_metrics(now, 48);
        let metric_count = metrics.metrics.len();
        app.state.store().metrics = metrics;

        Self {
            users,
            metric_count,
        }
    }

    pub fn print_summary(&self, app: &TestApp) {
        tracing::info!("📋 Available test data:");
        for fixture in [
            &app.fixtures.admin,
            &app.fixtures.moderator,
            &app.fixtures.member,
        ] {
            tracing::info!(
                "   🔑 {} ({}) - sign in: {}/api/auth/callback?code={}",
                fixture.full_name(),
                fixture.highest_role(),
                app.address(),
                fixture.user_name
            );
        }
        tracing::info!("   👤 {} additional users", self.users.len());
        tracing::info!("   📊 {} performance samples", self.metric_count);
    }
}

/// `count` samples spread evenly over the last 24 hours, oldest first, with
/// a matching daily summary.
pub fn sample_metrics(now: Timestamp, count: usize) -> PerformanceData {
    let step_minutes = (24 * 60 / count.max(1)) as i64;
    let metrics: Vec<PerformanceMetric> = (0..count)
        .map(|i| {
            let age = (count - i) as i64 * step_minutes;
            let wave = (i % 12) as f64;
            let authenticated = 8 + (i % 5) as u64 * 3;
            let anonymous = 2 + (i % 4) as u64;
            PerformanceMetric {
                timestamp: now - Span::new().minutes(age),
                cpu_usage: 20.0 + wave * 4.5,
                memory_usage: 45.0 + wave * 1.5,
                disk_usage: 61.0 + i as f64 * 0.05,
                avg_connection_duration: 1.2 + wave * 0.1,
                active_connections: authenticated + anonymous,
                authenticated_connections: authenticated,
                anonymous_connections: anonymous,
                response_time: Some(80.0 + wave * 12.0),
                endpoint: Some(ENDPOINTS[i % ENDPOINTS.len()].to_string()),
                http_status: Some(if i % 17 == 0 { 500 } else { 200 }),
            }
        })
        .collect();

    let len = metrics.len().max(1) as f64;
    let mean = |f: fn(&PerformanceMetric) -> f64| {
        metrics.iter().map(f).sum::<f64>() / len
    };
    let authenticated: u64 =
        metrics.iter().map(|m| m.authenticated_connections).sum();
    let anonymous: u64 = metrics.iter().map(|m| m.anonymous_connections).sum();
    let errors = metrics
        .iter()
        .filter(|m| m.http_status.is_some_and(|s| s >= 500))
        .count();

    let endpoint_stats: BTreeMap<String, EndpointStat> = ENDPOINTS
        .iter()
        .enumerate()
        .map(|(i, endpoint)| {
            let stat = EndpointStat {
                requests: 1200 / (i as u64 + 1),
                avg_duration: 0.05 * (i as f64 + 1.0),
                auth_rate: 100.0 - i as f64 * 7.5,
            };
            (endpoint.to_string(), stat)
        })
        .collect();
    let ip_stats: BTreeMap<String, IpStat> = (1..=6u64)
        .map(|n| {
            let stat = IpStat {
                requests: 900 / n,
                endpoints: ENDPOINTS[..(n as usize % ENDPOINTS.len()) + 1]
                    .iter()
                    .map(|e| e.to_string())
                    .collect(),
                rate_limited_count: if n == 6 { 14 } else { 0 },
            };
            (format!("10.0.0.{n}"), stat)
        })
        .collect();

    let summary = DailySummary {
        avg_cpu_usage: mean(|m| m.cpu_usage),
        avg_memory_usage: mean(|m| m.memory_usage),
        avg_disk_usage: mean(|m| m.disk_usage),
        avg_response_time: mean(|m| m.response_time.unwrap_or_default()),
        total_requests: endpoint_stats.values().map(|s| s.requests).sum(),
        error_rate: errors as f64 / len * 100.0,
        avg_active_connections: mean(|m| m.active_connections as f64),
        max_active_connections: metrics
            .iter()
            .map(|m| m.active_connections)
            .max()
            .unwrap_or_default(),
        total_unique_connections: authenticated + anonymous,
        authenticated_connections: authenticated,
        anonymous_connections: anonymous,
        avg_connection_duration: mean(|m| m.avg_connection_duration),
        unique_ips: ip_stats.len() as u64,
        endpoint_stats,
        ip_stats,
    };

    PerformanceData {
        metrics,
        summary: PerformanceSummary { last_24h: summary },
    }
}

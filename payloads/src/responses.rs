use crate::{AddressId, Role, UserId, lenient_timestamp, role_list};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedUser {
    pub id: UserId,
}

/// The signed-in user as reported by the session backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Console user id, when the identity is linked to a console account.
    #[serde(default)]
    pub id: Option<UserId>,
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default, with = "role_list")]
    pub roles: Vec<Role>,
}

impl CurrentUser {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }

    pub fn highest_role(&self) -> Role {
        Role::highest(&self.roles)
    }

    /// Identifier used to namespace per-user browser settings.
    pub fn owner_id(&self) -> String {
        match self.id {
            Some(id) => id.to_string(),
            None => self.sub.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialMedia {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(
        default,
        rename = "GitHub",
        alias = "github",
        skip_serializing_if = "Option::is_none"
    )]
    pub github: Option<String>,
    #[serde(
        default,
        rename = "Instagram",
        alias = "instagram",
        skip_serializing_if = "Option::is_none"
    )]
    pub instagram: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sms: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivacySettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_visibility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_email: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_phone: Option<bool>,
}

/// Extended profile of a user. Also used as the update payload, where
/// absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_media: Option<SocialMedia>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_preferences: Option<NotificationPreferences>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_settings: Option<PrivacySettings>,
}

/// A postal address. Also used as the create/update payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AddressId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

impl Address {
    /// One-line rendering, skipping empty parts.
    pub fn summary(&self) -> String {
        [
            &self.street,
            &self.city,
            &self.state,
            &self.postal_code,
            &self.country,
        ]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub id: i64,
    pub user_id: UserId,
    pub dark_mode: bool,
    #[serde(default)]
    pub theme_preferences: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPassword {
    pub generated_password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePasswordResult {
    #[serde(default)]
    pub require_relogin: bool,
    #[serde(default)]
    pub detail: Option<String>,
}

pub const PASSWORD_IN_HISTORY: &str = "Password found in history";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordHistoryCheck {
    #[serde(default)]
    pub detail: Option<String>,
}

impl PasswordHistoryCheck {
    pub fn is_reused(&self) -> bool {
        self.detail.as_deref() == Some(PASSWORD_IN_HISTORY)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutResponse {
    #[serde(default)]
    pub logout_url: Option<String>,
}

/// One sample of server health.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetric {
    #[serde(with = "lenient_timestamp")]
    pub timestamp: Timestamp,
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub disk_usage: f64,
    #[serde(default)]
    pub avg_connection_duration: f64,
    #[serde(default)]
    pub active_connections: u64,
    #[serde(default)]
    pub authenticated_connections: u64,
    #[serde(default)]
    pub anonymous_connections: u64,
    #[serde(default)]
    pub response_time: Option<f64>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub http_status: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointStat {
    pub requests: u64,
    pub avg_duration: f64,
    pub auth_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpStat {
    pub requests: u64,
    #[serde(default)]
    pub endpoints: Vec<String>,
    #[serde(default)]
    pub rate_limited_count: u64,
}

/// Aggregates over the trailing 24 hours.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailySummary {
    pub avg_cpu_usage: f64,
    pub avg_memory_usage: f64,
    pub avg_disk_usage: f64,
    pub avg_response_time: f64,
    pub total_requests: u64,
    pub error_rate: f64,
    pub avg_active_connections: f64,
    pub max_active_connections: u64,
    pub total_unique_connections: u64,
    pub authenticated_connections: u64,
    pub anonymous_connections: u64,
    pub avg_connection_duration: f64,
    pub unique_ips: u64,
    pub endpoint_stats: BTreeMap<String, EndpointStat>,
    pub ip_stats: BTreeMap<String, IpStat>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub last_24h: DailySummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceData {
    pub metrics: Vec<PerformanceMetric>,
    pub summary: PerformanceSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn social_media_accepts_original_casing() {
        let social: SocialMedia = serde_json::from_str(
            r#"{"twitter": "@ada", "GitHub": "ada", "instagram": "ada.pics"}"#,
        )
        .unwrap();
        assert_eq!(social.github.as_deref(), Some("ada"));
        assert_eq!(social.instagram.as_deref(), Some("ada.pics"));
        assert_eq!(social.linkedin, None);
    }

    #[test]
    fn profile_patch_omits_unset_fields() {
        let patch = Profile {
            bio: Some("Analyst".into()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"bio":"Analyst"}"#);
    }

    #[test]
    fn address_summary_skips_blank_parts() {
        let address = Address {
            street: Some("1 Main St".into()),
            city: Some("  ".into()),
            country: Some("NZ".into()),
            ..Default::default()
        };
        assert_eq!(address.summary(), "1 Main St, NZ");
    }

    #[test]
    fn current_user_owner_id_prefers_console_id() {
        let mut user: CurrentUser = serde_json::from_str(
            r#"{"sub": "auth0|abc", "email": "a@example.com", "roles": ["admin"]}"#,
        )
        .unwrap();
        assert_eq!(user.owner_id(), "auth0|abc");
        assert_eq!(user.display_name(), "a@example.com");
        user.id = Some(UserId(3));
        assert_eq!(user.owner_id(), "3");
    }

    #[test]
    fn daily_summary_tolerates_missing_fields() {
        let data: PerformanceData = serde_json::from_str(
            r#"{"metrics": [{"timestamp": "2025-01-01T12:00:00",
                "cpu_usage": 1.5, "memory_usage": 2.0, "disk_usage": 3.0}],
                "summary": {"last_24h": {"unique_ips": 4}}}"#,
        )
        .unwrap();
        assert_eq!(data.summary.last_24h.unique_ips, 4);
        assert!(data.summary.last_24h.endpoint_stats.is_empty());
        assert_eq!(data.metrics[0].active_connections, 0);
    }
}

pub mod api_client;
pub mod requests;
pub mod responses;

pub use api_client::{APIClient, ClientError};
pub use reqwest::StatusCode;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(transparent)]
pub struct UserId(pub i64);

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(transparent)]
pub struct AddressId(pub i64);

/// Console roles, ordered by privilege.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[display("user")]
    User,
    #[display("moderator")]
    Moderator,
    #[display("admin")]
    Admin,
}

impl Role {
    /// Case-insensitive parse of a role name as sent by the backend
    /// ("ADMIN", "admin", " Admin ").
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "moderator" => Some(Self::Moderator),
            "user" => Some(Self::User),
            _ => None,
        }
    }

    /// The most privileged role in the list, or `Role::User` if empty.
    pub fn highest(roles: &[Role]) -> Role {
        roles.iter().copied().max().unwrap_or(Role::User)
    }
}

/// Account status. Unknown values from the backend are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserStatus {
    Active,
    Inactive,
    Pending,
    Other(String),
}

impl UserStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Pending => "pending",
            Self::Other(value) => value,
        }
    }
}

impl From<String> for UserStatus {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "active" => Self::Active,
            "inactive" => Self::Inactive,
            "pending" => Self::Pending,
            _ => Self::Other(value),
        }
    }
}

impl From<UserStatus> for String {
    fn from(status: UserStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user as listed in the admin console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(with = "role_list")]
    pub roles: Vec<Role>,
    pub status: UserStatus,
    #[serde(default, with = "lenient_timestamp::option")]
    pub created_at: Option<Timestamp>,
    #[serde(default, with = "lenient_timestamp::option")]
    pub last_login: Option<Timestamp>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn highest_role(&self) -> Role {
        Role::highest(&self.roles)
    }
}

/// Roles arrive either as a JSON list or as a comma-separated string.
/// Unrecognised role names are dropped.
pub mod role_list {
    use super::Role;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        List(Vec<String>),
        Joined(String),
    }

    pub fn serialize<S: Serializer>(
        roles: &[Role],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        roles.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Role>, D::Error> {
        let names = match Wire::deserialize(deserializer)? {
            Wire::List(names) => names,
            Wire::Joined(joined) => {
                joined.split(',').map(str::to_string).collect()
            }
        };
        Ok(names.iter().filter_map(|name| Role::parse(name)).collect())
    }
}

/// Timestamps from the backend sometimes lack an offset; those are UTC.
pub mod lenient_timestamp {
    use jiff::{Timestamp, civil::DateTime, tz::TimeZone};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(value: &str) -> Option<Timestamp> {
        if let Ok(timestamp) = value.parse::<Timestamp>() {
            return Some(timestamp);
        }
        let civil = value.parse::<DateTime>().ok()?;
        civil.to_zoned(TimeZone::UTC).ok().map(|z| z.timestamp())
    }

    pub fn serialize<S: Serializer>(
        timestamp: &Timestamp,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(timestamp)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Timestamp, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid timestamp: {raw}"))
        })
    }

    pub mod option {
        use jiff::Timestamp;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            timestamp: &Option<Timestamp>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match timestamp {
                Some(timestamp) => serializer.collect_str(timestamp),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Timestamp>, D::Error> {
            let raw = Option::<String>::deserialize(deserializer)?;
            match raw {
                None => Ok(None),
                Some(raw) if raw.is_empty() => Ok(None),
                Some(raw) => super::parse(&raw).map(Some).ok_or_else(|| {
                    serde::de::Error::custom(format!("invalid timestamp: {raw}"))
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_json(roles: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "id": 7,
            "user_name": "jdoe",
            "first_name": "Jane",
            "last_name": "Doe",
            "email": "jane@example.com",
            "roles": roles,
            "status": "ACTIVE",
            "created_at": "2024-03-01T10:00:00",
        })
    }

    #[test]
    fn roles_accept_list_and_joined_string() {
        let from_list: User =
            serde_json::from_value(user_json(serde_json::json!(["ADMIN"])))
                .unwrap();
        assert_eq!(from_list.roles, vec![Role::Admin]);

        let from_string: User = serde_json::from_value(user_json(
            serde_json::json!("user, moderator, unknown"),
        ))
        .unwrap();
        assert_eq!(from_string.roles, vec![Role::User, Role::Moderator]);
        assert_eq!(from_string.highest_role(), Role::Moderator);
    }

    #[test]
    fn status_is_case_insensitive_and_keeps_unknown_values() {
        let user: User =
            serde_json::from_value(user_json(serde_json::json!([]))).unwrap();
        assert_eq!(user.status, UserStatus::Active);
        assert_eq!(
            UserStatus::from("Suspended".to_string()),
            UserStatus::Other("Suspended".into())
        );
    }

    #[test]
    fn naive_timestamps_are_utc() {
        let user: User =
            serde_json::from_value(user_json(serde_json::json!([]))).unwrap();
        let expected: Timestamp = "2024-03-01T10:00:00Z".parse().unwrap();
        assert_eq!(user.created_at, Some(expected));
        assert_eq!(user.last_login, None);
    }

    #[test]
    fn highest_role_defaults_to_user() {
        assert_eq!(Role::highest(&[]), Role::User);
        assert_eq!(Role::highest(&[Role::Moderator, Role::Admin]), Role::Admin);
    }
}

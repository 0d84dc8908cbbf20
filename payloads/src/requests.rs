use crate::{Role, UserStatus};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

pub const PASSWORD_MIN_LEN: usize = 16;
pub const PASSWORD_SPECIAL_CHARACTERS: &str = "!@#$%^&*(),.?\":{}|<>";

/// A single unmet password rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordRequirement {
    MinLength,
    Uppercase,
    Lowercase,
    Digit,
    Special,
}

impl PasswordRequirement {
    pub const ALL: [PasswordRequirement; 5] = [
        Self::MinLength,
        Self::Uppercase,
        Self::Lowercase,
        Self::Digit,
        Self::Special,
    ];

    pub fn message(&self) -> &'static str {
        match self {
            Self::MinLength => "Password must be at least 16 characters long",
            Self::Uppercase => "Must contain an uppercase letter",
            Self::Lowercase => "Must contain a lowercase letter",
            Self::Digit => "Must contain a number",
            Self::Special => "Must contain a special character",
        }
    }

    pub fn is_met_by(&self, password: &str) -> bool {
        match self {
            Self::MinLength => password.chars().count() >= PASSWORD_MIN_LEN,
            Self::Uppercase => password.chars().any(|c| c.is_ascii_uppercase()),
            Self::Lowercase => password.chars().any(|c| c.is_ascii_lowercase()),
            Self::Digit => password.chars().any(|c| c.is_ascii_digit()),
            Self::Special => password
                .chars()
                .any(|c| PASSWORD_SPECIAL_CHARACTERS.contains(c)),
        }
    }
}

/// Validate a new password, returning every unmet requirement.
pub fn validate_password(
    password: &str,
) -> Result<(), Vec<PasswordRequirement>> {
    let unmet: Vec<_> = PasswordRequirement::ALL
        .into_iter()
        .filter(|requirement| !requirement.is_met_by(password))
        .collect();
    if unmet.is_empty() { Ok(()) } else { Err(unmet) }
}

/// Join unmet requirements into a single sentence list for display.
pub fn password_error_message(unmet: &[PasswordRequirement]) -> String {
    unmet
        .iter()
        .map(PasswordRequirement::message)
        .collect::<Vec<_>>()
        .join(". ")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
    pub email: String,
    pub password: String,
    pub roles: Vec<Role>,
    pub status: UserStatus,
}

impl NewUser {
    /// Check the fields the form can verify before hitting the API.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty()
        {
            return Err("First and last name are required");
        }
        if self.user_name.trim().is_empty() {
            return Err("Username is required");
        }
        if !is_plausible_email(&self.email) {
            return Err("Please enter a valid email address");
        }
        if self.roles.is_empty() {
            return Err("Select a role");
        }
        Ok(())
    }
}

pub fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}

/// Partial update of a user; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<Role>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
}

impl UpdateUser {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Options for server-side password generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratePassword {
    pub length: u32,
    pub use_upper: bool,
    pub use_lower: bool,
    pub use_numbers: bool,
    pub use_special: bool,
}

impl Default for GeneratePassword {
    fn default() -> Self {
        Self {
            length: PASSWORD_MIN_LEN as u32,
            use_upper: true,
            use_lower: true,
            use_numbers: true,
            use_special: true,
        }
    }
}

/// Password change, either via a reset token or the current password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatePassword {
    pub new_password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<crate::UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckPasswordHistory {
    pub user_id: crate::UserId,
    pub new_password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordRecovery {
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdatePreferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dark_mode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_preferences: Option<serde_json::Value>,
}

/// Optional time window for the metrics endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricsWindow {
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
}

impl MetricsWindow {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(start) = self.start_time {
            pairs.push(("start_time", start.to_string()));
        }
        if let Some(end) = self.end_time {
            pairs.push(("end_time", end.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_rules_report_every_unmet_requirement() {
        assert_eq!(
            validate_password("short"),
            Err(vec![
                PasswordRequirement::MinLength,
                PasswordRequirement::Uppercase,
                PasswordRequirement::Digit,
                PasswordRequirement::Special,
            ])
        );
        assert_eq!(validate_password("Abcdefghijklmn1!"), Ok(()));
    }

    #[test]
    fn password_error_message_joins_rules() {
        let message = password_error_message(&[
            PasswordRequirement::Digit,
            PasswordRequirement::Special,
        ]);
        assert_eq!(
            message,
            "Must contain a number. Must contain a special character"
        );
    }

    #[test]
    fn empty_update_serializes_to_empty_object() {
        let patch = UpdateUser::default();
        assert!(patch.is_empty());
        assert_eq!(serde_json::to_string(&patch).unwrap(), "{}");

        let patch = UpdateUser {
            status: Some(UserStatus::Inactive),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&patch).unwrap(),
            r#"{"status":"inactive"}"#
        );
    }

    #[test]
    fn new_user_validation() {
        let mut user = NewUser {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            user_name: "ada".into(),
            email: "ada@example.com".into(),
            password: "x".into(),
            roles: vec![Role::User],
            status: UserStatus::Pending,
        };
        assert_eq!(user.validate(), Ok(()));
        user.email = "ada@localhost".into();
        assert_eq!(user.validate(), Err("Please enter a valid email address"));
    }

    #[test]
    fn metrics_window_only_includes_set_bounds() {
        let window = MetricsWindow {
            start_time: Some("2025-01-01T00:00:00Z".parse().unwrap()),
            end_time: None,
        };
        assert_eq!(
            window.query_pairs(),
            vec![("start_time", "2025-01-01T00:00:00Z".to_string())]
        );
    }
}

use crate::{AddressId, User, UserId, requests, responses};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

type ReqwestResult = Result<reqwest::Response, reqwest::Error>;

/// Shown when a failed response carries no usable message.
pub const GENERIC_ERROR_MESSAGE: &str = "Request failed";

/// An API client for interfacing with the admin backend.
///
/// Requests always carry browser credentials (the session cookie) and, when
/// set, a bearer token.
pub struct APIClient {
    pub address: String,
    pub inner_client: reqwest::Client,
    pub token: Option<SecretString>,
}

/// Helper methods for http actions
impl APIClient {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            inner_client: reqwest::Client::new(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    fn format_url(&self, path: &str) -> String {
        format!("{}/api/{path}", &self.address)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let request = self.inner_client.request(method, self.format_url(path));

        #[cfg(target_arch = "wasm32")]
        let request = request.fetch_credentials_include();

        match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    async fn get(&self, path: &str) -> ReqwestResult {
        self.request(Method::GET, path).send().await
    }

    async fn get_with_query(
        &self,
        path: &str,
        query: &impl Serialize,
    ) -> ReqwestResult {
        self.request(Method::GET, path).query(query).send().await
    }

    async fn post(&self, path: &str, body: &impl Serialize) -> ReqwestResult {
        self.request(Method::POST, path).json(body).send().await
    }

    async fn empty_post(&self, path: &str) -> ReqwestResult {
        self.request(Method::POST, path).send().await
    }

    async fn put(&self, path: &str, body: &impl Serialize) -> ReqwestResult {
        self.request(Method::PUT, path).json(body).send().await
    }

    async fn patch(&self, path: &str, body: &impl Serialize) -> ReqwestResult {
        self.request(Method::PATCH, path).json(body).send().await
    }

    async fn delete(&self, path: &str) -> ReqwestResult {
        self.request(Method::DELETE, path).send().await
    }
}

/// User directory
impl APIClient {
    pub async fn health_check(&self) -> Result<(), ClientError> {
        let response = self.get("health_check").await?;
        ok_empty(response).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>, ClientError> {
        let response = self.get("users").await?;
        ok_body(response).await
    }

    pub async fn get_user(&self, user_id: UserId) -> Result<User, ClientError> {
        let response = self.get(&format!("users/{user_id}")).await?;
        ok_body(response).await
    }

    pub async fn update_user(
        &self,
        user_id: UserId,
        patch: &requests::UpdateUser,
    ) -> Result<User, ClientError> {
        let response = self.put(&format!("users/{user_id}"), patch).await?;
        ok_body(response).await
    }

    pub async fn delete_user(&self, user_id: UserId) -> Result<(), ClientError> {
        let response = self.delete(&format!("users/{user_id}")).await?;
        ok_empty(response).await
    }

    pub async fn create_user(
        &self,
        details: &requests::NewUser,
    ) -> Result<responses::CreatedUser, ClientError> {
        let response = self.post("users", details).await?;
        ok_body(response).await
    }
}

/// Profiles, addresses and preferences
impl APIClient {
    pub async fn get_profile(
        &self,
        user_id: UserId,
    ) -> Result<responses::Profile, ClientError> {
        let response = self.get(&format!("users/{user_id}/profile")).await?;
        ok_body(response).await
    }

    pub async fn update_profile(
        &self,
        user_id: UserId,
        patch: &responses::Profile,
    ) -> Result<responses::Profile, ClientError> {
        let response =
            self.put(&format!("users/{user_id}/profile"), patch).await?;
        ok_body(response).await
    }

    pub async fn list_addresses(
        &self,
        user_id: UserId,
    ) -> Result<Vec<responses::Address>, ClientError> {
        let response = self.get(&format!("users/{user_id}/addresses")).await?;
        ok_body(response).await
    }

    pub async fn create_address(
        &self,
        user_id: UserId,
        address: &responses::Address,
    ) -> Result<responses::Address, ClientError> {
        let response = self
            .post(&format!("users/{user_id}/addresses"), address)
            .await?;
        ok_body(response).await
    }

    pub async fn update_address(
        &self,
        user_id: UserId,
        address_id: AddressId,
        address: &responses::Address,
    ) -> Result<responses::Address, ClientError> {
        let response = self
            .put(&format!("users/{user_id}/addresses/{address_id}"), address)
            .await?;
        ok_body(response).await
    }

    pub async fn delete_address(
        &self,
        user_id: UserId,
        address_id: AddressId,
    ) -> Result<(), ClientError> {
        let response = self
            .delete(&format!("users/{user_id}/addresses/{address_id}"))
            .await?;
        ok_empty(response).await
    }

    pub async fn get_preferences(
        &self,
        user_id: UserId,
    ) -> Result<responses::UserPreferences, ClientError> {
        let response =
            self.get(&format!("users/{user_id}/preferences")).await?;
        ok_body(response).await
    }

    pub async fn update_preferences(
        &self,
        user_id: UserId,
        update: &requests::UpdatePreferences,
    ) -> Result<responses::UserPreferences, ClientError> {
        let response = self
            .patch(&format!("users/{user_id}/preferences"), update)
            .await?;
        ok_body(response).await
    }
}

/// Session and password management
impl APIClient {
    /// The signed-in user, or None if there is no valid session. Failures
    /// of any kind are treated as "not signed in".
    pub async fn current_user(&self) -> Option<responses::CurrentUser> {
        let response = match self.get("auth/me").await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Error fetching current user: {e}");
                return None;
            }
        };
        match ok_body(response).await {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::debug!("No current user: {e}");
                None
            }
        }
    }

    pub async fn logout(&self) -> Result<responses::LogoutResponse, ClientError> {
        let response = self.empty_post("auth/logout").await?;
        ok_body(response).await
    }

    pub async fn generate_password(
        &self,
        options: &requests::GeneratePassword,
    ) -> Result<responses::GeneratedPassword, ClientError> {
        let response = self.post("auth/generate-password", options).await?;
        ok_body(response).await
    }

    pub async fn check_password_history(
        &self,
        details: &requests::CheckPasswordHistory,
    ) -> Result<responses::PasswordHistoryCheck, ClientError> {
        let response =
            self.post("auth/check-password-history", details).await?;
        ok_body(response).await
    }

    pub async fn update_password(
        &self,
        details: &requests::UpdatePassword,
    ) -> Result<responses::UpdatePasswordResult, ClientError> {
        let response = self.post("auth/update-password", details).await?;
        ok_body(response).await
    }

    pub async fn request_password_recovery(
        &self,
        details: &requests::PasswordRecovery,
    ) -> Result<(), ClientError> {
        let response = self.post("auth/password-recovery", details).await?;
        ok_empty(response).await
    }

    pub async fn resend_password_recovery(
        &self,
        details: &requests::PasswordRecovery,
    ) -> Result<(), ClientError> {
        let response =
            self.post("auth/resend-password-recovery", details).await?;
        ok_empty(response).await
    }
}

/// Performance metrics
impl APIClient {
    pub async fn get_metrics(
        &self,
        window: &requests::MetricsWindow,
    ) -> Result<responses::PerformanceData, ClientError> {
        let response = self
            .get_with_query("performance/metrics", &window.query_pairs())
            .await?;
        ok_body(response).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Credentials are missing, invalid or expired.
    #[error("Session expired. Please log in again.")]
    Unauthorized,
    /// Authenticated, but not allowed to perform the action.
    #[error("You do not have permission to perform this action.")]
    Forbidden,
    /// The service rejected the input. `details` holds the raw response body
    /// for field-level display.
    #[error("{message}")]
    Validation {
        message: String,
        details: serde_json::Value,
    },
    /// An unhandled API error to display, containing the response message.
    #[error("{1}")]
    APIError(StatusCode, String),
    #[error("Network error. Please check your connection.")]
    Network(#[from] reqwest::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            Self::Forbidden => Some(StatusCode::FORBIDDEN),
            Self::Validation { .. } => None,
            Self::APIError(status, _) => Some(*status),
            Self::Network(e) => e.status(),
        }
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Classify a failed response from its status code and body text.
///
/// The message comes from the body's `detail` or `message` field, else
/// [`GENERIC_ERROR_MESSAGE`]; a body that isn't JSON (a proxy's HTML error
/// page, say) is never shown. A `detail` list (one entry per
/// invalid field) or a 422 status is a validation failure.
pub fn classify_error(status: StatusCode, body: &str) -> ClientError {
    match status {
        StatusCode::UNAUTHORIZED => return ClientError::Unauthorized,
        StatusCode::FORBIDDEN => return ClientError::Forbidden,
        _ => {}
    }

    let json = serde_json::from_str::<serde_json::Value>(body).ok();
    let detail = json.as_ref().and_then(|json| json.get("detail"));

    if let Some(serde_json::Value::Array(entries)) = detail {
        let message = entries
            .iter()
            .filter_map(|entry| entry.get("msg").and_then(|m| m.as_str()))
            .collect::<Vec<_>>()
            .join(", ");
        let message = if message.is_empty() {
            "Validation failed".to_string()
        } else {
            message
        };
        return ClientError::Validation {
            message,
            details: json.unwrap_or_default(),
        };
    }

    let field_message = |field: &str| {
        json.as_ref()
            .and_then(|json| json.get(field))
            .and_then(|value| value.as_str())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };
    let message = field_message("detail")
        .or_else(|| field_message("message"))
        .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());

    if status == StatusCode::UNPROCESSABLE_ENTITY {
        return ClientError::Validation {
            message,
            details: json.unwrap_or_default(),
        };
    }
    ClientError::APIError(status, message)
}

async fn error_from(response: reqwest::Response) -> ClientError {
    let status = response.status();
    match response.text().await {
        Ok(body) => classify_error(status, &body),
        Err(e) => e.into(),
    }
}

/// Deserialize a successful request into the desired type, or return an
/// appropriate error.
pub async fn ok_body<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    if !response.status().is_success() {
        return Err(error_from(response).await);
    }
    Ok(response.json::<T>().await?)
}

/// Check that an empty response is OK, returning a ClientError if not.
pub async fn ok_empty(response: reqwest::Response) -> Result<(), ClientError> {
    if !response.status().is_success() {
        return Err(error_from(response).await);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_statuses_ignore_body() {
        assert!(matches!(
            classify_error(StatusCode::UNAUTHORIZED, r#"{"detail":"x"}"#),
            ClientError::Unauthorized
        ));
        assert!(matches!(
            classify_error(StatusCode::FORBIDDEN, ""),
            ClientError::Forbidden
        ));
    }

    #[test]
    fn detail_then_message_then_generic() {
        let e = classify_error(
            StatusCode::BAD_REQUEST,
            r#"{"detail":"Email taken","message":"ignored"}"#,
        );
        assert_eq!(e.to_string(), "Email taken");

        let e = classify_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"message":"Database offline"}"#,
        );
        assert_eq!(e.to_string(), "Database offline");

        let e = classify_error(
            StatusCode::BAD_GATEWAY,
            "<html><body><h1>502 Bad Gateway</h1></body></html>",
        );
        assert_eq!(e.to_string(), GENERIC_ERROR_MESSAGE);
        assert_eq!(e.status(), Some(StatusCode::BAD_GATEWAY));

        let e = classify_error(StatusCode::NOT_FOUND, "{}");
        assert_eq!(e.to_string(), GENERIC_ERROR_MESSAGE);
        assert_eq!(e.status(), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn detail_list_is_a_validation_error() {
        let body = r#"{"detail":[
            {"loc":["body","email"],"msg":"invalid email"},
            {"loc":["body","user_name"],"msg":"too short"}
        ]}"#;
        match classify_error(StatusCode::BAD_REQUEST, body) {
            ClientError::Validation { message, details } => {
                assert_eq!(message, "invalid email, too short");
                assert!(details["detail"].is_array());
            }
            other => panic!("Expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn unprocessable_entity_is_a_validation_error() {
        match classify_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail":"bad postal code"}"#,
        ) {
            ClientError::Validation { message, .. } => {
                assert_eq!(message, "bad postal code")
            }
            other => panic!("Expected Validation, got {other:?}"),
        }
    }
}

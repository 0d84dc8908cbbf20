//! Sign-in redirect and the logout sequence.
//!
//! The backend owns the session cookie; the browser only ever navigates to
//! the identity provider and back.

use payloads::responses::LogoutResponse;
use reqwest::Url;
use yewdux::prelude::*;

use crate::storage::{self, BrowserStorage};
use crate::{State, api_address, get_api_client};

const AUTH_DOMAIN: Option<&str> = option_env!("AUTH_DOMAIN");
const AUTH_CLIENT_ID: Option<&str> = option_env!("AUTH_CLIENT_ID");
const AUTH_AUDIENCE: Option<&str> = option_env!("AUTH_AUDIENCE");

/// Whether an identity provider was configured at build time. Without one
/// the console signs in through the development backend directly.
pub fn provider_configured() -> bool {
    AUTH_DOMAIN.is_some() && AUTH_CLIENT_ID.is_some()
}

fn callback_url() -> String {
    format!("{}/api/auth/callback", api_address())
}

/// The provider's authorize URL, returning to the backend's callback.
pub fn login_url() -> Option<Url> {
    let (domain, client_id) = AUTH_DOMAIN.zip(AUTH_CLIENT_ID)?;
    let mut params = vec![
        ("response_type", "code".to_string()),
        ("client_id", client_id.to_string()),
        ("redirect_uri", callback_url()),
        ("scope", "openid profile email".to_string()),
    ];
    if let Some(audience) = AUTH_AUDIENCE {
        params.push(("audience", audience.to_string()));
    }
    Url::parse_with_params(&format!("https://{domain}/authorize"), &params)
        .inspect_err(|e| tracing::error!("Invalid login URL: {e}"))
        .ok()
}

/// Sign in as a seeded user on the development backend, which treats the
/// authorization code as a user name.
pub fn dev_login_url(user_name: &str) -> Option<Url> {
    Url::parse_with_params(&callback_url(), &[("code", user_name)])
        .inspect_err(|e| tracing::error!("Invalid login URL: {e}"))
        .ok()
}

pub fn redirect(url: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Err(e) = window.location().set_href(url) {
        tracing::error!("Navigation to {url} failed: {e:?}");
    }
}

/// Send the browser to the identity provider, or back to the landing page's
/// development sign-in when none is configured.
pub fn login() {
    match login_url() {
        Some(url) => redirect(url.as_str()),
        None => {
            tracing::debug!("No identity provider configured");
            redirect("/");
        }
    }
}

/// End the session and leave the app.
///
/// The logout flag is raised first so a page load racing the redirect does
/// not ask the API for the current user. Local settings are wiped.
pub async fn logout(dispatch: Dispatch<State>) {
    storage::set_logging_out();
    if let Err(e) = BrowserStorage::local().clear() {
        tracing::warn!("Could not clear local storage: {e}");
    }

    let target = match get_api_client().logout().await {
        Ok(LogoutResponse {
            logout_url: Some(url),
        }) => url,
        Ok(LogoutResponse { logout_url: None }) => "/".to_string(),
        Err(e) => {
            tracing::warn!("Logout request failed: {e}");
            "/".to_string()
        }
    };

    dispatch.reduce_mut(State::logout);
    redirect(&target);
}

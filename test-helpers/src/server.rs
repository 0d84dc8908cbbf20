//! In-memory mock of the admin REST API.
//!
//! Sessions are opaque tokens accepted either as a bearer token or as the
//! `access_token` cookie. Role checks follow the production service: only
//! admins manage users and read metrics, moderators may list users, and
//! everyone may manage their own profile.

use actix_cors::Cors;
use base64::{Engine, engine::general_purpose::STANDARD};
use actix_web::cookie::Cookie;
use actix_web::dev::{HttpServiceFactory, Server};
use actix_web::http::{StatusCode, header};
use actix_web::{
    App, HttpRequest, HttpResponse, HttpServer, ResponseError, body::BoxBody,
    delete, get, patch, post, put, web,
};
use jiff::Timestamp;
use payloads::requests::{self, PASSWORD_SPECIAL_CHARACTERS};
use payloads::responses::{
    Address, CreatedUser, CurrentUser, GeneratedPassword, LogoutResponse,
    PASSWORD_IN_HISTORY, PasswordHistoryCheck, PerformanceData, Profile,
    UpdatePasswordResult, UserPreferences,
};
use payloads::{AddressId, Role, User, UserId, lenient_timestamp};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::net::TcpListener;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Number of previous passwords that may not be reused.
pub const PASSWORD_HISTORY_LEN: usize = 5;

pub struct Config {
    /// set to "0.0.0.0" for public access, "127.0.0.1" for local dev
    pub ip: String,
    /// set to 0 to get an os-assigned port
    pub port: u16,
    /// List of allowed CORS origins. Use "*" to allow any origin.
    pub allowed_origins: Vec<String>,
    /// Where the login callback redirects once a session cookie is set.
    pub frontend_url: String,
    /// Returned by `/auth/logout` for the client to navigate to.
    pub logout_url: String,
}

impl Config {
    /// Loopback on an OS-assigned port, for tests.
    pub fn local() -> Self {
        Self {
            ip: "127.0.0.1".into(),
            port: 0,
            allowed_origins: vec!["*".to_string()],
            frontend_url: "http://localhost:8080".into(),
            logout_url: "http://localhost:8080/".into(),
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        use std::env::var;

        let allowed_origins = var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let frontend_url = var("FRONTEND_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());

        Ok(Config {
            ip: var("IP_ADDRESS").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: match var("PORT") {
                Ok(port) => port.parse()?,
                Err(_) => 8000,
            },
            allowed_origins,
            logout_url: var("LOGOUT_URL")
                .unwrap_or_else(|_| format!("{frontend_url}/")),
            frontend_url,
        })
    }
}

/// Build the server, but not await it.
///
/// Returns the port that the server has bound to by modifying the config.
pub fn build(
    config: &mut Config,
    state: web::Data<MockState>,
) -> std::io::Result<Server> {
    let allowed_origins = config.allowed_origins.clone();

    // OS assigns the port if binding to 0
    let listener = TcpListener::bind(format!("{}:{}", config.ip, config.port))?;
    config.port = listener.local_addr()?.port();
    let server = HttpServer::new(move || {
        let cors = if allowed_origins.iter().any(|origin| origin == "*") {
            Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .supports_credentials()
        } else {
            allowed_origins.iter().fold(
                Cors::default()
                    .allow_any_method()
                    .allow_any_header()
                    .supports_credentials(),
                |cors, origin| cors.allowed_origin(origin),
            )
        };

        App::new()
            .wrap(cors)
            .service(api_services())
            .app_data(state.clone())
    })
    .listen(listener)?
    .run();
    Ok(server)
}

pub fn api_services() -> impl HttpServiceFactory {
    web::scope("/api")
        .service(health_check)
        .service(list_users)
        .service(get_user)
        .service(create_user)
        .service(update_user)
        .service(delete_user)
        .service(get_profile)
        .service(update_profile)
        .service(list_addresses)
        .service(create_address)
        .service(update_address)
        .service(delete_address)
        .service(get_preferences)
        .service(update_preferences)
        .service(current_user)
        .service(login_callback)
        .service(logout)
        .service(generate_password)
        .service(check_password_history)
        .service(update_password)
        .service(password_recovery)
        .service(resend_password_recovery)
        .service(performance_metrics)
}

/// Everything the mock backend knows, behind one lock.
#[derive(Default)]
pub struct Store {
    pub users: BTreeMap<UserId, User>,
    pub profiles: HashMap<UserId, Profile>,
    pub addresses: BTreeMap<AddressId, Address>,
    pub preferences: HashMap<UserId, UserPreferences>,
    /// Most recent last.
    pub password_history: HashMap<UserId, Vec<String>>,
    pub metrics: PerformanceData,
    /// Emails that asked for a recovery link, in order.
    pub recovery_requests: Vec<String>,
    sessions: HashMap<String, UserId>,
    reset_tokens: HashMap<String, UserId>,
    injected_failures: VecDeque<(StatusCode, String)>,
    next_user_id: i64,
    next_address_id: i64,
}

pub struct MockState {
    store: Mutex<Store>,
    frontend_url: String,
    logout_url: String,
}

impl MockState {
    pub fn new(config: &Config) -> Self {
        Self {
            store: Mutex::new(Store::default()),
            frontend_url: config.frontend_url.clone(),
            logout_url: config.logout_url.clone(),
        }
    }

    pub fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The next request fails with this status and raw body, regardless of
    /// credentials. Failures queue up in order.
    pub fn fail_next(&self, status: StatusCode, body: impl Into<String>) {
        self.store()
            .injected_failures
            .push_back((status, body.into()));
    }

    /// Add a user directly, bypassing role checks.
    pub fn insert_user(
        &self,
        mut user: User,
        password: impl Into<String>,
    ) -> User {
        let mut store = self.store();
        store.next_user_id += 1;
        user.id = UserId(store.next_user_id);
        store.password_history.insert(user.id, vec![password.into()]);
        store.users.insert(user.id, user.clone());
        user
    }

    pub fn insert_address(
        &self,
        user_id: UserId,
        mut address: Address,
    ) -> Address {
        let mut store = self.store();
        store.next_address_id += 1;
        let address_id = AddressId(store.next_address_id);
        address.id = Some(address_id);
        address.user_id = Some(user_id);
        store.addresses.insert(address_id, address.clone());
        address
    }

    pub fn issue_session(&self, user_id: UserId) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        self.store().sessions.insert(token.clone(), user_id);
        token
    }

    /// The outstanding password reset token for an email, if any.
    pub fn reset_token_for(&self, email: &str) -> Option<String> {
        let store = self.store();
        let user_id = store
            .users
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))?
            .id;
        store
            .reset_tokens
            .iter()
            .find(|(_, id)| **id == user_id)
            .map(|(token, _)| token.clone())
    }

    fn take_injected(&self) -> Result<(), MockError> {
        match self.store().injected_failures.pop_front() {
            Some((status, body)) => Err(MockError::Injected(status, body)),
            None => Ok(()),
        }
    }

    /// For endpoints that need no session.
    fn public(&self) -> Result<(), MockError> {
        self.take_injected()
    }

    fn authenticate(&self, request: &HttpRequest) -> Result<User, MockError> {
        self.take_injected()?;
        let token = session_token(request).ok_or(MockError::Unauthorized)?;
        let store = self.store();
        let user_id = store
            .sessions
            .get(&token)
            .ok_or(MockError::Unauthorized)?;
        store
            .users
            .get(user_id)
            .cloned()
            .ok_or(MockError::Unauthorized)
    }
}

fn session_token(request: &HttpRequest) -> Option<String> {
    let bearer = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string());
    bearer.or_else(|| {
        request
            .cookie("access_token")
            .map(|cookie| cookie.value().to_string())
    })
}

fn require_role(user: &User, allowed: &[Role]) -> Result<(), MockError> {
    if allowed.contains(&user.highest_role()) {
        Ok(())
    } else {
        Err(MockError::Forbidden)
    }
}

fn require_self_or_admin(user: &User, target: UserId) -> Result<(), MockError> {
    if user.id == target || user.highest_role() == Role::Admin {
        Ok(())
    } else {
        Err(MockError::Forbidden)
    }
}

#[derive(Debug, Serialize)]
pub struct FieldError {
    pub loc: Vec<String>,
    pub msg: String,
}

impl FieldError {
    fn new(loc: &[&str], msg: impl Into<String>) -> Self {
        Self {
            loc: loc.iter().map(|part| part.to_string()).collect(),
            msg: msg.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MockError {
    #[error("Not authenticated")]
    Unauthorized,
    #[error("Not enough permissions")]
    Forbidden,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Validation failed")]
    Validation(Vec<FieldError>),
    #[error("{1}")]
    Injected(StatusCode, String),
}

impl ResponseError for MockError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Injected(status, _) => *status,
        }
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        match self {
            Self::Injected(status, body) => {
                HttpResponse::build(*status).body(body.clone())
            }
            Self::Validation(errors) => {
                HttpResponse::build(self.status_code())
                    .json(serde_json::json!({ "detail": errors }))
            }
            _ => HttpResponse::build(self.status_code())
                .json(serde_json::json!({ "detail": self.to_string() })),
        }
    }
}

#[get("/health_check")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().body("healthy")
}

#[tracing::instrument(skip_all)]
#[get("/users")]
pub async fn list_users(
    request: HttpRequest,
    state: web::Data<MockState>,
) -> Result<HttpResponse, MockError> {
    let user = state.authenticate(&request)?;
    require_role(&user, &[Role::Admin, Role::Moderator])?;
    let users: Vec<User> = state.store().users.values().cloned().collect();
    Ok(HttpResponse::Ok().json(users))
}

#[tracing::instrument(skip(request, state))]
#[get("/users/{user_id}")]
pub async fn get_user(
    request: HttpRequest,
    path: web::Path<i64>,
    state: web::Data<MockState>,
) -> Result<HttpResponse, MockError> {
    let user = state.authenticate(&request)?;
    let target = UserId(path.into_inner());
    if user.id != target {
        require_role(&user, &[Role::Admin, Role::Moderator])?;
    }
    let found = state
        .store()
        .users
        .get(&target)
        .cloned()
        .ok_or(MockError::NotFound("User"))?;
    Ok(HttpResponse::Ok().json(found))
}

#[tracing::instrument(skip_all)]
#[post("/users")]
pub async fn create_user(
    request: HttpRequest,
    body: web::Json<requests::NewUser>,
    state: web::Data<MockState>,
) -> Result<HttpResponse, MockError> {
    let user = state.authenticate(&request)?;
    require_role(&user, &[Role::Admin])?;
    let details = body.into_inner();

    let mut invalid = Vec::new();
    if !requests::is_plausible_email(&details.email) {
        invalid.push(FieldError::new(&["body", "email"], "invalid email"));
    }
    if details.user_name.trim().is_empty() {
        invalid.push(FieldError::new(&["body", "user_name"], "required"));
    }
    if !invalid.is_empty() {
        return Err(MockError::Validation(invalid));
    }

    let taken = state.store().users.values().any(|existing| {
        existing.user_name.eq_ignore_ascii_case(&details.user_name)
            || existing.email.eq_ignore_ascii_case(&details.email)
    });
    if taken {
        return Err(MockError::BadRequest(
            "Username or email already exists".into(),
        ));
    }

    let created = state.insert_user(
        User {
            id: UserId(0),
            user_name: details.user_name,
            first_name: details.first_name,
            last_name: details.last_name,
            email: details.email,
            roles: details.roles,
            status: details.status,
            created_at: Some(Timestamp::now()),
            last_login: None,
        },
        details.password,
    );
    tracing::info!(user_id = %created.id, "created user");
    Ok(HttpResponse::Created().json(CreatedUser { id: created.id }))
}

#[tracing::instrument(skip(request, body, state))]
#[put("/users/{user_id}")]
pub async fn update_user(
    request: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<requests::UpdateUser>,
    state: web::Data<MockState>,
) -> Result<HttpResponse, MockError> {
    let user = state.authenticate(&request)?;
    require_role(&user, &[Role::Admin])?;
    let target = UserId(path.into_inner());
    let patch = body.into_inner();

    let mut store = state.store();
    if let Some(email) = &patch.email {
        if !requests::is_plausible_email(email) {
            return Err(MockError::Validation(vec![FieldError::new(
                &["body", "email"],
                "invalid email",
            )]));
        }
        let taken = store.users.values().any(|existing| {
            existing.id != target && existing.email.eq_ignore_ascii_case(email)
        });
        if taken {
            return Err(MockError::BadRequest("Email already exists".into()));
        }
    }
    let existing = store
        .users
        .get_mut(&target)
        .ok_or(MockError::NotFound("User"))?;
    if let Some(first_name) = patch.first_name {
        existing.first_name = first_name;
    }
    if let Some(last_name) = patch.last_name {
        existing.last_name = last_name;
    }
    if let Some(user_name) = patch.user_name {
        existing.user_name = user_name;
    }
    if let Some(email) = patch.email {
        existing.email = email;
    }
    if let Some(roles) = patch.roles {
        existing.roles = roles;
    }
    if let Some(status) = patch.status {
        existing.status = status;
    }
    Ok(HttpResponse::Ok().json(existing.clone()))
}

#[tracing::instrument(skip(request, state))]
#[delete("/users/{user_id}")]
pub async fn delete_user(
    request: HttpRequest,
    path: web::Path<i64>,
    state: web::Data<MockState>,
) -> Result<HttpResponse, MockError> {
    let user = state.authenticate(&request)?;
    require_role(&user, &[Role::Admin])?;
    let target = UserId(path.into_inner());
    if target == user.id {
        return Err(MockError::BadRequest(
            "You cannot delete your own account".into(),
        ));
    }

    let mut store = state.store();
    store
        .users
        .remove(&target)
        .ok_or(MockError::NotFound("User"))?;
    store.profiles.remove(&target);
    store.preferences.remove(&target);
    store.password_history.remove(&target);
    store
        .addresses
        .retain(|_, address| address.user_id != Some(target));
    store.sessions.retain(|_, id| *id != target);
    Ok(HttpResponse::NoContent().finish())
}

fn ensure_user_exists(
    state: &MockState,
    user_id: UserId,
) -> Result<(), MockError> {
    if state.store().users.contains_key(&user_id) {
        Ok(())
    } else {
        Err(MockError::NotFound("User"))
    }
}

#[tracing::instrument(skip(request, state))]
#[get("/users/{user_id}/profile")]
pub async fn get_profile(
    request: HttpRequest,
    path: web::Path<i64>,
    state: web::Data<MockState>,
) -> Result<HttpResponse, MockError> {
    let user = state.authenticate(&request)?;
    let target = UserId(path.into_inner());
    require_self_or_admin(&user, target)?;
    ensure_user_exists(&state, target)?;

    let profile = state
        .store()
        .profiles
        .get(&target)
        .cloned()
        .unwrap_or_else(|| Profile {
            user_id: Some(target),
            ..Default::default()
        });
    Ok(HttpResponse::Ok().json(profile))
}

#[tracing::instrument(skip(request, body, state))]
#[put("/users/{user_id}/profile")]
pub async fn update_profile(
    request: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<Profile>,
    state: web::Data<MockState>,
) -> Result<HttpResponse, MockError> {
    let user = state.authenticate(&request)?;
    let target = UserId(path.into_inner());
    require_self_or_admin(&user, target)?;
    ensure_user_exists(&state, target)?;
    let patch = body.into_inner();

    let mut store = state.store();
    let next_id = store.profiles.len() as i64 + 1;
    let profile = store.profiles.entry(target).or_insert_with(|| Profile {
        id: Some(next_id),
        user_id: Some(target),
        ..Default::default()
    });
    macro_rules! merge {
        ($($field:ident),*) => {
            $(if patch.$field.is_some() {
                profile.$field = patch.$field;
            })*
        };
    }
    merge!(
        date_of_birth,
        gender,
        phone,
        avatar_url,
        bio,
        website,
        social_media,
        notification_preferences,
        privacy_settings
    );
    Ok(HttpResponse::Ok().json(profile.clone()))
}

#[tracing::instrument(skip(request, state))]
#[get("/users/{user_id}/addresses")]
pub async fn list_addresses(
    request: HttpRequest,
    path: web::Path<i64>,
    state: web::Data<MockState>,
) -> Result<HttpResponse, MockError> {
    let user = state.authenticate(&request)?;
    let target = UserId(path.into_inner());
    require_self_or_admin(&user, target)?;
    ensure_user_exists(&state, target)?;

    let addresses: Vec<Address> = state
        .store()
        .addresses
        .values()
        .filter(|address| address.user_id == Some(target))
        .cloned()
        .collect();
    Ok(HttpResponse::Ok().json(addresses))
}

fn validate_address(address: &Address) -> Result<(), MockError> {
    let missing: Vec<FieldError> = [
        ("street", &address.street),
        ("city", &address.city),
        ("country", &address.country),
    ]
    .into_iter()
    .filter(|(_, value)| value.as_deref().is_none_or(|v| v.trim().is_empty()))
    .map(|(field, _)| FieldError::new(&["body", field], "field required"))
    .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(MockError::Validation(missing))
    }
}

#[tracing::instrument(skip(request, body, state))]
#[post("/users/{user_id}/addresses")]
pub async fn create_address(
    request: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<Address>,
    state: web::Data<MockState>,
) -> Result<HttpResponse, MockError> {
    let user = state.authenticate(&request)?;
    let target = UserId(path.into_inner());
    require_self_or_admin(&user, target)?;
    ensure_user_exists(&state, target)?;
    let address = body.into_inner();
    validate_address(&address)?;
    let created = state.insert_address(target, address);
    Ok(HttpResponse::Ok().json(created))
}

#[tracing::instrument(skip(request, body, state))]
#[put("/users/{user_id}/addresses/{address_id}")]
pub async fn update_address(
    request: HttpRequest,
    path: web::Path<(i64, i64)>,
    body: web::Json<Address>,
    state: web::Data<MockState>,
) -> Result<HttpResponse, MockError> {
    let user = state.authenticate(&request)?;
    let (target, address_id) = path.into_inner();
    let (target, address_id) = (UserId(target), AddressId(address_id));
    require_self_or_admin(&user, target)?;
    let mut address = body.into_inner();
    validate_address(&address)?;

    let mut store = state.store();
    let existing = store
        .addresses
        .get_mut(&address_id)
        .filter(|existing| existing.user_id == Some(target))
        .ok_or(MockError::NotFound("Address"))?;
    address.id = Some(address_id);
    address.user_id = Some(target);
    *existing = address.clone();
    Ok(HttpResponse::Ok().json(address))
}

#[tracing::instrument(skip(request, state))]
#[delete("/users/{user_id}/addresses/{address_id}")]
pub async fn delete_address(
    request: HttpRequest,
    path: web::Path<(i64, i64)>,
    state: web::Data<MockState>,
) -> Result<HttpResponse, MockError> {
    let user = state.authenticate(&request)?;
    let (target, address_id) = path.into_inner();
    let (target, address_id) = (UserId(target), AddressId(address_id));
    require_self_or_admin(&user, target)?;

    let mut store = state.store();
    let owned = store
        .addresses
        .get(&address_id)
        .is_some_and(|address| address.user_id == Some(target));
    if !owned {
        return Err(MockError::NotFound("Address"));
    }
    store.addresses.remove(&address_id);
    Ok(HttpResponse::NoContent().finish())
}

fn default_preferences(user_id: UserId) -> UserPreferences {
    UserPreferences {
        id: user_id.0,
        user_id,
        dark_mode: false,
        theme_preferences: serde_json::json!({}),
    }
}

#[tracing::instrument(skip(request, state))]
#[get("/users/{user_id}/preferences")]
pub async fn get_preferences(
    request: HttpRequest,
    path: web::Path<i64>,
    state: web::Data<MockState>,
) -> Result<HttpResponse, MockError> {
    let user = state.authenticate(&request)?;
    let target = UserId(path.into_inner());
    require_self_or_admin(&user, target)?;
    ensure_user_exists(&state, target)?;

    let preferences = state
        .store()
        .preferences
        .entry(target)
        .or_insert_with(|| default_preferences(target))
        .clone();
    Ok(HttpResponse::Ok().json(preferences))
}

#[tracing::instrument(skip(request, body, state))]
#[patch("/users/{user_id}/preferences")]
pub async fn update_preferences(
    request: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<requests::UpdatePreferences>,
    state: web::Data<MockState>,
) -> Result<HttpResponse, MockError> {
    let user = state.authenticate(&request)?;
    let target = UserId(path.into_inner());
    require_self_or_admin(&user, target)?;
    ensure_user_exists(&state, target)?;
    let update = body.into_inner();

    let mut store = state.store();
    let preferences = store
        .preferences
        .entry(target)
        .or_insert_with(|| default_preferences(target));
    if let Some(dark_mode) = update.dark_mode {
        preferences.dark_mode = dark_mode;
    }
    if let Some(theme_preferences) = update.theme_preferences {
        preferences.theme_preferences = theme_preferences;
    }
    Ok(HttpResponse::Ok().json(preferences.clone()))
}

#[tracing::instrument(skip_all)]
#[get("/auth/me")]
pub async fn current_user(
    request: HttpRequest,
    state: web::Data<MockState>,
) -> Result<HttpResponse, MockError> {
    let user = state.authenticate(&request)?;
    Ok(HttpResponse::Ok().json(CurrentUser {
        id: Some(user.id),
        sub: format!("mock|{}", user.id),
        email: user.email.clone(),
        name: Some(user.full_name()),
        picture: None,
        email_verified: true,
        roles: user.roles,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// The mock identity provider's code is simply the user name.
    code: String,
}

/// Stand-in for the identity provider redirect: sets the session cookie and
/// sends the browser to the dashboard.
#[tracing::instrument(skip(state))]
#[get("/auth/callback")]
pub async fn login_callback(
    query: web::Query<CallbackQuery>,
    state: web::Data<MockState>,
) -> Result<HttpResponse, MockError> {
    state.public()?;
    let user_id = state
        .store()
        .users
        .values()
        .find(|user| user.user_name == query.code)
        .map(|user| user.id)
        .ok_or_else(|| MockError::BadRequest("Unknown login code".into()))?;
    let token = state.issue_session(user_id);
    let cookie = Cookie::build("access_token", token)
        .path("/")
        .http_only(true)
        .finish();
    Ok(HttpResponse::TemporaryRedirect()
        .cookie(cookie)
        .insert_header((
            header::LOCATION,
            format!("{}/dashboard", state.frontend_url),
        ))
        .finish())
}

#[tracing::instrument(skip_all)]
#[post("/auth/logout")]
pub async fn logout(
    request: HttpRequest,
    state: web::Data<MockState>,
) -> Result<HttpResponse, MockError> {
    state.public()?;
    if let Some(token) = session_token(&request) {
        state.store().sessions.remove(&token);
    }
    let mut removal = Cookie::build("access_token", "").path("/").finish();
    removal.make_removal();
    Ok(HttpResponse::Ok().cookie(removal).json(LogoutResponse {
        logout_url: Some(state.logout_url.clone()),
    }))
}

/// Cycle through the enabled character classes so that each appears at
/// least once, picking characters with uuid randomness.
fn random_password(
    options: &requests::GeneratePassword,
) -> Result<String, MockError> {
    let pools: Vec<&str> = [
        (options.use_upper, "ABCDEFGHJKLMNPQRSTUVWXYZ"),
        (options.use_lower, "abcdefghijkmnopqrstuvwxyz"),
        (options.use_numbers, "23456789"),
        (options.use_special, PASSWORD_SPECIAL_CHARACTERS),
    ]
    .into_iter()
    .filter_map(|(enabled, pool)| enabled.then_some(pool))
    .collect();
    if pools.is_empty() {
        return Err(MockError::BadRequest(
            "At least one character set must be selected".into(),
        ));
    }

    let length = (options.length as usize).clamp(pools.len(), 128);
    let mut entropy = Vec::with_capacity(length + 16);
    while entropy.len() < length {
        entropy.extend_from_slice(uuid::Uuid::new_v4().as_bytes());
    }
    Ok((0..length)
        .map(|i| {
            let pool = pools[i % pools.len()].as_bytes();
            pool[entropy[i] as usize % pool.len()] as char
        })
        .collect())
}

#[tracing::instrument(skip_all)]
#[post("/auth/generate-password")]
pub async fn generate_password(
    request: HttpRequest,
    body: web::Json<requests::GeneratePassword>,
    state: web::Data<MockState>,
) -> Result<HttpResponse, MockError> {
    state.authenticate(&request)?;
    let generated_password = random_password(&body)?;
    Ok(HttpResponse::Ok().json(GeneratedPassword { generated_password }))
}

#[tracing::instrument(skip_all)]
#[post("/auth/check-password-history")]
pub async fn check_password_history(
    request: HttpRequest,
    body: web::Json<requests::CheckPasswordHistory>,
    state: web::Data<MockState>,
) -> Result<HttpResponse, MockError> {
    let user = state.authenticate(&request)?;
    require_self_or_admin(&user, body.user_id)?;
    let reused = state
        .store()
        .password_history
        .get(&body.user_id)
        .is_some_and(|history| history.contains(&body.new_password));
    let detail = if reused {
        PASSWORD_IN_HISTORY.to_string()
    } else {
        "Password not found in history".to_string()
    };
    Ok(HttpResponse::Ok().json(PasswordHistoryCheck {
        detail: Some(detail),
    }))
}

#[tracing::instrument(skip_all)]
#[post("/auth/update-password")]
pub async fn update_password(
    request: HttpRequest,
    body: web::Json<requests::UpdatePassword>,
    state: web::Data<MockState>,
) -> Result<HttpResponse, MockError> {
    let body = body.into_inner();
    let user_id = match &body.token {
        Some(token) => {
            state.public()?;
            state.store().reset_tokens.get(token).copied().ok_or_else(|| {
                MockError::BadRequest("Invalid or expired reset token".into())
            })?
        }
        None => {
            let user = state.authenticate(&request)?;
            let target = body.user_id.unwrap_or(user.id);
            require_self_or_admin(&user, target)?;
            target
        }
    };

    if let Err(unmet) = requests::validate_password(&body.new_password) {
        return Err(MockError::BadRequest(requests::password_error_message(
            &unmet,
        )));
    }

    let mut store = state.store();
    let history = store.password_history.entry(user_id).or_default();
    if let Some(current) = &body.current_password {
        if history.last() != Some(current) {
            return Err(MockError::BadRequest(
                "Current password is incorrect".into(),
            ));
        }
    }
    if history.contains(&body.new_password) {
        return Err(MockError::BadRequest(format!(
            "You cannot reuse any of your last {PASSWORD_HISTORY_LEN} passwords"
        )));
    }
    history.push(body.new_password);
    if history.len() > PASSWORD_HISTORY_LEN {
        history.remove(0);
    }
    if let Some(token) = &body.token {
        store.reset_tokens.remove(token);
    }

    Ok(HttpResponse::Ok().json(UpdatePasswordResult {
        require_relogin: body.token.is_none(),
        detail: Some("Password updated successfully".into()),
    }))
}

fn record_recovery(state: &MockState, email: &str) {
    let mut store = state.store();
    store.recovery_requests.push(email.to_string());
    let user_id = store
        .users
        .values()
        .find(|user| user.email.eq_ignore_ascii_case(email))
        .map(|user| user.id);
    // Unknown addresses get the same response, so accounts can't be probed.
    if let Some(user_id) = user_id {
        let token = uuid::Uuid::new_v4().to_string();
        store.reset_tokens.retain(|_, id| *id != user_id);
        store.reset_tokens.insert(token.clone(), user_id);
        // stands in for the recovery email
        tracing::info!(
            "✉️ Recovery link for {email}: {}",
            recovery_link(&state.frontend_url, &token)
        );
    }
}

/// Reset links carry the token base64-encoded; the client decodes it.
pub fn recovery_link(frontend_url: &str, token: &str) -> String {
    format!("{frontend_url}/reset-password/{}", STANDARD.encode(token))
}

#[tracing::instrument(skip_all)]
#[post("/auth/password-recovery")]
pub async fn password_recovery(
    body: web::Json<requests::PasswordRecovery>,
    state: web::Data<MockState>,
) -> Result<HttpResponse, MockError> {
    state.public()?;
    if !requests::is_plausible_email(&body.email) {
        return Err(MockError::Validation(vec![FieldError::new(
            &["body", "email"],
            "invalid email",
        )]));
    }
    record_recovery(&state, &body.email);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "detail": "If the address exists, a recovery email has been sent"
    })))
}

#[tracing::instrument(skip_all)]
#[post("/auth/resend-password-recovery")]
pub async fn resend_password_recovery(
    body: web::Json<requests::PasswordRecovery>,
    state: web::Data<MockState>,
) -> Result<HttpResponse, MockError> {
    state.public()?;
    record_recovery(&state, &body.email);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "detail": "Recovery email resent"
    })))
}

#[derive(Debug, Deserialize)]
pub struct MetricsQuery {
    start_time: Option<String>,
    end_time: Option<String>,
}

fn parse_bound(
    field: &str,
    value: Option<&str>,
) -> Result<Option<Timestamp>, MockError> {
    match value {
        None => Ok(None),
        Some(raw) => lenient_timestamp::parse(raw).map(Some).ok_or_else(|| {
            MockError::Validation(vec![FieldError::new(
                &["query", field],
                "invalid datetime format",
            )])
        }),
    }
}

#[tracing::instrument(skip(request, state))]
#[get("/performance/metrics")]
pub async fn performance_metrics(
    request: HttpRequest,
    query: web::Query<MetricsQuery>,
    state: web::Data<MockState>,
) -> Result<HttpResponse, MockError> {
    let user = state.authenticate(&request)?;
    require_role(&user, &[Role::Admin])?;
    let start = parse_bound("start_time", query.start_time.as_deref())?;
    let end = parse_bound("end_time", query.end_time.as_deref())?;

    let store = state.store();
    let metrics = store
        .metrics
        .metrics
        .iter()
        .filter(|metric| start.is_none_or(|start| metric.timestamp >= start))
        .filter(|metric| end.is_none_or(|end| metric.timestamp <= end))
        .cloned()
        .collect();
    Ok(HttpResponse::Ok().json(PerformanceData {
        metrics,
        summary: store.metrics.summary.clone(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovery_links_encode_the_token() {
        assert_eq!(
            recovery_link("http://localhost:8080", "abc"),
            "http://localhost:8080/reset-password/YWJj"
        );
    }

    #[test]
    fn generated_passwords_cover_every_enabled_class() {
        let password =
            random_password(&requests::GeneratePassword::default()).unwrap();
        assert_eq!(password.len(), 16);
        assert_eq!(requests::validate_password(&password), Ok(()));
    }

    #[test]
    fn generating_with_no_classes_is_rejected() {
        let options = requests::GeneratePassword {
            use_upper: false,
            use_lower: false,
            use_numbers: false,
            use_special: false,
            ..Default::default()
        };
        assert!(matches!(
            random_password(&options),
            Err(MockError::BadRequest(_))
        ));
    }
}

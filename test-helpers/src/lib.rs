pub mod mock;
pub mod server;
pub mod telemetry;

use actix_web::web;
use payloads::{ClientError, Role, User, UserId, UserStatus, requests};
use reqwest::StatusCode;
use server::{Config, MockState};
use tracing_log::LogTracer;
use tracing_subscriber::util::SubscriberInitExt;

/// Password every fixture user starts with.
pub const FIXTURE_PASSWORD: &str = "Correct-horse-battery-1!";

/// One user per role, present in every [`TestApp`].
pub struct Fixtures {
    pub admin: User,
    pub moderator: User,
    pub member: User,
}

pub struct TestApp {
    #[allow(unused)]
    pub port: u16,
    pub state: web::Data<MockState>,
    pub fixtures: Fixtures,
    /// Signed in as the admin fixture.
    pub client: payloads::APIClient,
}

impl TestApp {
    pub fn address(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// A client with a fresh session for the given user.
    pub fn client_for(&self, user_id: UserId) -> payloads::APIClient {
        let token = self.state.issue_session(user_id);
        self.anonymous_client().with_token(token)
    }

    pub fn moderator_client(&self) -> payloads::APIClient {
        self.client_for(self.fixtures.moderator.id)
    }

    pub fn member_client(&self) -> payloads::APIClient {
        self.client_for(self.fixtures.member.id)
    }

    pub fn anonymous_client(&self) -> payloads::APIClient {
        payloads::APIClient {
            address: self.address(),
            inner_client: http_client(),
            token: None,
        }
    }

    /// Make the next request fail with the given status and raw body.
    pub fn fail_next(&self, status: StatusCode, body: &str) {
        let status = actix_web::http::StatusCode::from_u16(status.as_u16())
            .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);
        self.state.fail_next(status, body);
    }

    pub fn reset_token_for(&self, email: &str) -> Option<String> {
        self.state.reset_token_for(email)
    }
}

/// Functions to populate test data
impl TestApp {
    /// Creates a user through the API as the admin, returning its id.
    pub async fn create_user(
        &self,
        details: &requests::NewUser,
    ) -> anyhow::Result<UserId> {
        Ok(self.client.create_user(details).await?.id)
    }

    pub async fn create_dana_user(&self) -> anyhow::Result<UserId> {
        self.create_user(&dana_details()).await
    }
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .cookie_store(true)
        .build()
        .unwrap_or_default()
}

fn fixture(
    user_name: &str,
    first_name: &str,
    last_name: &str,
    role: Role,
) -> User {
    User {
        id: UserId(0),
        user_name: user_name.into(),
        first_name: first_name.into(),
        last_name: last_name.into(),
        email: format!("{user_name}@example.com"),
        roles: vec![role],
        status: UserStatus::Active,
        created_at: Some("2025-01-01T00:00:00Z".parse().unwrap_or_default()),
        last_login: None,
    }
}

pub fn alice_fixture() -> User {
    fixture("alice", "Alice", "Adminson", Role::Admin)
}

pub fn bob_fixture() -> User {
    fixture("bob", "Bob", "Moderato", Role::Moderator)
}

pub fn charlie_fixture() -> User {
    fixture("charlie", "Charlie", "Member", Role::User)
}

pub fn dana_details() -> requests::NewUser {
    requests::NewUser {
        first_name: "Dana".into(),
        last_name: "Scully".into(),
        user_name: "dana".into(),
        email: "dana@example.com".into(),
        password: "Generated-password-42!".into(),
        roles: vec![Role::User],
        status: UserStatus::Pending,
    }
}

/// Start the mock API with the per-role fixtures, on the given port.
pub async fn spawn_app_with(mut config: Config) -> anyhow::Result<TestApp> {
    let subscriber = telemetry::get_subscriber("error".into());
    let _ = LogTracer::init();
    let _ = subscriber.try_init();

    let state = web::Data::new(MockState::new(&config));
    let fixtures = Fixtures {
        admin: state.insert_user(alice_fixture(), FIXTURE_PASSWORD),
        moderator: state.insert_user(bob_fixture(), FIXTURE_PASSWORD),
        member: state.insert_user(charlie_fixture(), FIXTURE_PASSWORD),
    };

    let server = server::build(&mut config, state.clone())?;
    tokio::spawn(server);

    let token = state.issue_session(fixtures.admin.id);
    let client = payloads::APIClient {
        address: format!("http://127.0.0.1:{}", config.port),
        inner_client: http_client(),
        token: None,
    }
    .with_token(token);

    Ok(TestApp {
        port: config.port,
        state,
        fixtures,
        client,
    })
}

/// Use OS-assigned port for parallel testing.
pub async fn spawn_app() -> TestApp {
    match spawn_app_with(Config::local()).await {
        Ok(app) => app,
        Err(e) => panic!("Failed to start mock API: {e}"),
    }
}

/// Assert that the result of an API action results in a specific status code.
pub fn assert_status_code<T: std::fmt::Debug>(
    result: Result<T, ClientError>,
    expected: StatusCode,
) {
    match result {
        Err(e) => assert_eq!(e.status(), Some(expected), "{e:?}"),
        Ok(value) => panic!("Expected {expected}, got Ok({value:?})"),
    };
}

pub fn assert_unauthorized<T: std::fmt::Debug>(result: Result<T, ClientError>) {
    match result {
        Err(ClientError::Unauthorized) => {}
        other => panic!("Expected Unauthorized, got {other:?}"),
    }
}

pub fn assert_forbidden<T: std::fmt::Debug>(result: Result<T, ClientError>) {
    match result {
        Err(ClientError::Forbidden) => {}
        other => panic!("Expected Forbidden, got {other:?}"),
    }
}

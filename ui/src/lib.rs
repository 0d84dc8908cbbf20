use payloads::APIClient;
use yew::prelude::*;
use yew_router::prelude::*;

pub mod auth;
pub mod components;
pub mod contexts;
pub mod hooks;
mod logs;
pub mod pages;
pub mod scheduler;
pub mod state;
pub mod storage;
pub mod users_service;

pub use state::{AuthState, State};

use components::MainLayout;
use contexts::ToastProvider;
use hooks::use_authentication;
use pages::{
    DashboardPage, HomePage, MetricsPage, NotFoundPage, PasswordPage,
    PasswordRecoveryPage, ProfilePage, ResetPasswordPage, SettingsPage,
    UsersPage,
};

/// Backend origin: `BACKEND_URL` at build time, otherwise the page's own
/// origin.
pub fn api_address() -> String {
    if let Some(url) = option_env!("BACKEND_URL") {
        return url.trim_end_matches('/').to_string();
    }
    web_sys::window()
        .and_then(|window| window.location().origin().ok())
        .unwrap_or_default()
}

pub fn get_api_client() -> APIClient {
    let client = APIClient::new(api_address());
    match option_env!("API_TOKEN") {
        Some(token) => client.with_token(token),
        None => client,
    }
}

#[derive(Clone, Routable, PartialEq)]
pub enum Route {
    #[at("/")]
    Home,
    #[at("/dashboard")]
    Dashboard,
    #[at("/users")]
    Users,
    #[at("/metrics")]
    Metrics,
    #[at("/profile")]
    Profile,
    #[at("/settings")]
    Settings,
    #[at("/password")]
    Password,
    #[at("/reset-password/:token")]
    ResetPassword { token: String },
    #[at("/password-recovery")]
    PasswordRecovery,
    #[not_found]
    #[at("/404")]
    NotFound,
}

fn switch(route: Route) -> Html {
    match route {
        Route::Home => html! { <HomePage /> },
        Route::Dashboard => html! { <DashboardPage /> },
        Route::Users => html! { <UsersPage /> },
        Route::Metrics => html! { <MetricsPage /> },
        Route::Profile => html! { <ProfilePage /> },
        Route::Settings => html! { <SettingsPage /> },
        Route::Password => html! { <PasswordPage /> },
        Route::ResetPassword { token } => html! { <ResetPasswordPage {token} /> },
        Route::PasswordRecovery => html! { <PasswordRecoveryPage /> },
        Route::NotFound => html! { <NotFoundPage /> },
    }
}

#[function_component]
fn AppShell() -> Html {
    use_authentication();

    html! {
        <MainLayout>
            <Switch<Route> render={switch} />
        </MainLayout>
    }
}

#[function_component]
pub fn App() -> Html {
    logs::init_logging();
    html! {
        <ToastProvider>
            <BrowserRouter>
                <AppShell />
            </BrowserRouter>
        </ToastProvider>
    }
}

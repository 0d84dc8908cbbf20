pub mod dashboard;
pub mod home;
pub mod metrics;
pub mod not_found;
pub mod password;
pub mod password_recovery;
pub mod profile;
pub mod reset_password;
pub mod settings;
pub mod users;

pub use dashboard::DashboardPage;
pub use home::HomePage;
pub use metrics::MetricsPage;
pub use not_found::NotFoundPage;
pub use password::PasswordPage;
pub use password_recovery::PasswordRecoveryPage;
pub use profile::ProfilePage;
pub use reset_password::ResetPasswordPage;
pub use settings::SettingsPage;
pub use users::UsersPage;

pub mod use_authentication;
pub mod use_logout;
pub mod use_performance_metrics;
pub mod use_polling_fetch;
pub mod use_session_guard;
pub mod use_sort_settings;
pub mod use_title;
pub mod use_user_data;

pub use use_authentication::use_authentication;
pub use use_logout::use_logout;
pub use use_performance_metrics::use_performance_metrics;
pub use use_polling_fetch::{PollingFetch, use_polling_fetch};
pub use use_session_guard::use_session_guard;
pub use use_sort_settings::use_sort_settings;
pub use use_title::use_title;
pub use use_user_data::use_user_data;

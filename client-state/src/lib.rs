//! Client-side coordination for the admin console.
//!
//! The browser app composes these pieces with `web_sys` storage and
//! `gloo_timers`; tests compose them with [`storage::MemoryStore`],
//! [`polling::ManualScheduler`] and a mocked [`time::TimeSource`].

pub mod cache;
pub mod fetch;
pub mod format;
pub mod metrics;
pub mod optimistic;
pub mod polling;
pub mod session;
pub mod settings;
pub mod sort;
pub mod storage;
pub mod time;

pub use fetch::{FetchCoordinator, FetchState};
pub use polling::{PollingState, PollingTimer, Scheduler};
pub use session::SessionGuard;
pub use settings::{Feature, RefreshSettings, SettingsStore};
pub use sort::{SortDirection, SortSettings, UserSortField, sort_users};
pub use storage::{KeyValueStore, MemoryStore, StorageError};
pub use time::TimeSource;

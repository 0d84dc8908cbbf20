//! Browser-backed [`KeyValueStore`] and the logout flag.

use client_state::{KeyValueStore, StorageError};
use wasm_bindgen::JsValue;
use web_sys::Storage;

const LOGGING_OUT_KEY: &str = "isLoggingOut";

#[derive(Clone, Copy, PartialEq, Eq)]
enum Area {
    Local,
    Session,
}

/// `window.localStorage` or `window.sessionStorage`, looked up on each
/// access so a missing window surfaces as [`StorageError::Unavailable`].
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct BrowserStorage {
    area: Area,
}

impl BrowserStorage {
    pub fn local() -> Self {
        Self { area: Area::Local }
    }

    pub fn session() -> Self {
        Self {
            area: Area::Session,
        }
    }

    fn storage(&self) -> Result<Storage, StorageError> {
        let window = web_sys::window().ok_or(StorageError::Unavailable)?;
        let storage = match self.area {
            Area::Local => window.local_storage(),
            Area::Session => window.session_storage(),
        };
        storage
            .map_err(to_storage_error)?
            .ok_or(StorageError::Unavailable)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage()?.clear().map_err(to_storage_error)
    }
}

fn to_storage_error(value: JsValue) -> StorageError {
    let message = format!("{value:?}");
    if message.contains("QuotaExceeded") {
        StorageError::QuotaExceeded
    } else {
        StorageError::Other(message)
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage()?.get_item(key).map_err(to_storage_error)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage()?
            .set_item(key, value)
            .map_err(to_storage_error)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.storage()?.remove_item(key).map_err(to_storage_error)
    }
}

/// Set for the rest of the tab's life once logout begins, so nothing asks
/// the API for the current user on the way out.
pub fn is_logging_out() -> bool {
    matches!(
        BrowserStorage::session().get(LOGGING_OUT_KEY),
        Ok(Some(value)) if value == "true"
    )
}

pub fn set_logging_out() {
    if let Err(e) = BrowserStorage::session().set(LOGGING_OUT_KEY, "true") {
        tracing::warn!("Could not set logout flag: {e}");
    }
}

pub fn clear_logging_out() {
    if let Err(e) = BrowserStorage::session().remove(LOGGING_OUT_KEY) {
        tracing::warn!("Could not clear logout flag: {e}");
    }
}

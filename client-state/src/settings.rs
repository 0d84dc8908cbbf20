use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;

use crate::sort::SortSettings;
use crate::storage::KeyValueStore;

/// Choices offered by the refresh controls, in minutes.
pub const REFRESH_INTERVALS: [u32; 5] = [1, 5, 10, 15, 30];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshSettings {
    pub enabled: bool,
    /// Minutes between automatic refreshes.
    pub interval: u32,
}

impl RefreshSettings {
    /// Polling period; intervals below one minute are treated as one.
    pub fn period(&self) -> Duration {
        Duration::from_millis(u64::from(self.interval.max(1)) * 60_000)
    }

    /// Snap the interval to the nearest of [`REFRESH_INTERVALS`], the lower
    /// one on a tie.
    pub fn normalized(self) -> Self {
        let interval = REFRESH_INTERVALS
            .into_iter()
            .min_by_key(|allowed| allowed.abs_diff(self.interval))
            .unwrap_or(self.interval);
        Self { interval, ..self }
    }
}

/// Each feature persists its refresh settings separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Users,
    Dashboard,
}

impl Feature {
    pub fn defaults(self) -> RefreshSettings {
        match self {
            Self::Users => RefreshSettings {
                enabled: false,
                interval: 5,
            },
            Self::Dashboard => RefreshSettings {
                enabled: true,
                interval: 1,
            },
        }
    }

    fn key(self, owner: &str) -> String {
        match self {
            Self::Users => format!("users_refresh_settings_{owner}"),
            Self::Dashboard => {
                format!("dashboard_refresh_settings_user_{owner}")
            }
        }
    }
}

fn sort_key(owner: &str) -> String {
    format!("users_sort_settings_{owner}")
}

/// Per-user settings persisted in a [`KeyValueStore`].
///
/// Reads never fail: anything missing or unreadable falls back to defaults,
/// field by field. Writes never fail either; storage errors are logged.
pub struct SettingsStore<S> {
    storage: S,
}

impl<S: KeyValueStore> SettingsStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Stored intervals the controls don't offer are snapped to one they do.
    pub fn load(&self, feature: Feature, owner: &str) -> RefreshSettings {
        self.load_or_default(owner, feature.key(owner), feature.defaults())
            .normalized()
    }

    pub fn save(&self, feature: Feature, owner: &str, settings: RefreshSettings) {
        self.save_value(owner, feature.key(owner), &settings);
    }

    pub fn clear(&self, feature: Feature, owner: &str) {
        self.remove(owner, feature.key(owner));
    }

    pub fn load_sort(&self, owner: &str) -> SortSettings {
        self.load_or_default(owner, sort_key(owner), SortSettings::default())
    }

    pub fn save_sort(&self, owner: &str, settings: SortSettings) {
        self.save_value(owner, sort_key(owner), &settings);
    }

    pub fn clear_sort(&self, owner: &str) {
        self.remove(owner, sort_key(owner));
    }

    fn load_or_default<T>(&self, owner: &str, key: String, defaults: T) -> T
    where
        T: Serialize + DeserializeOwned,
    {
        if owner.trim().is_empty() {
            return defaults;
        }
        let raw = match self.storage.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return defaults,
            Err(e) => {
                tracing::warn!("Failed to read {key}: {e}");
                return defaults;
            }
        };
        match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(stored) => merge_over(defaults, &stored),
            Err(e) => {
                tracing::warn!("Ignoring unreadable {key}: {e}");
                defaults
            }
        }
    }

    fn save_value(&self, owner: &str, key: String, value: &impl Serialize) {
        if owner.trim().is_empty() {
            return;
        }
        let result = serde_json::to_string(value)
            .map_err(|e| e.to_string())
            .and_then(|json| {
                self.storage.set(&key, &json).map_err(|e| e.to_string())
            });
        if let Err(e) = result {
            tracing::warn!("Failed to save {key}: {e}");
        }
    }

    fn remove(&self, owner: &str, key: String) {
        if owner.trim().is_empty() {
            return;
        }
        if let Err(e) = self.storage.remove(&key) {
            tracing::warn!("Failed to clear {key}: {e}");
        }
    }
}

/// Take each field from `stored` only if the result still deserializes, so a
/// field with the wrong type keeps its default while its neighbours load.
fn merge_over<T>(defaults: T, stored: &serde_json::Value) -> T
where
    T: Serialize + DeserializeOwned,
{
    let (Ok(serde_json::Value::Object(mut merged)), Some(stored)) =
        (serde_json::to_value(&defaults), stored.as_object())
    else {
        return defaults;
    };

    let fields: Vec<String> = merged.keys().cloned().collect();
    for field in fields {
        let Some(value) = stored.get(&field) else {
            continue;
        };
        let mut candidate = merged.clone();
        candidate.insert(field, value.clone());
        let candidate = serde_json::Value::Object(candidate);
        if serde_json::from_value::<T>(candidate.clone()).is_ok() {
            if let serde_json::Value::Object(candidate) = candidate {
                merged = candidate;
            }
        }
    }
    serde_json::from_value(serde_json::Value::Object(merged)).unwrap_or(defaults)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::{SortDirection, UserSortField};
    use crate::storage::MemoryStore;

    fn store() -> (MemoryStore, SettingsStore<MemoryStore>) {
        let memory = MemoryStore::new();
        (memory.clone(), SettingsStore::new(memory))
    }

    #[test]
    fn missing_settings_are_feature_defaults() {
        let (_, settings) = store();
        assert_eq!(
            settings.load(Feature::Users, "7"),
            RefreshSettings {
                enabled: false,
                interval: 5
            }
        );
        assert_eq!(
            settings.load(Feature::Dashboard, "7"),
            RefreshSettings {
                enabled: true,
                interval: 1
            }
        );
        assert_eq!(settings.load_sort("7"), SortSettings::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let (memory, settings) = store();
        let custom = RefreshSettings {
            enabled: true,
            interval: 15,
        };
        settings.save(Feature::Users, "7", custom);
        assert_eq!(settings.load(Feature::Users, "7"), custom);
        assert_eq!(
            memory.get("users_refresh_settings_7").unwrap().as_deref(),
            Some(r#"{"enabled":true,"interval":15}"#)
        );

        // other owners and features are untouched
        assert_eq!(settings.load(Feature::Users, "8"), Feature::Users.defaults());
        assert_eq!(
            settings.load(Feature::Dashboard, "7"),
            Feature::Dashboard.defaults()
        );
    }

    #[test]
    fn clear_restores_defaults() {
        let (memory, settings) = store();
        let sort = SortSettings {
            field: UserSortField::Email,
            direction: SortDirection::Desc,
        };
        settings.save_sort("7", sort);
        settings.save(Feature::Dashboard, "7", RefreshSettings {
            enabled: false,
            interval: 30,
        });
        assert_eq!(settings.load_sort("7"), sort);
        assert!(memory.get("dashboard_refresh_settings_user_7").unwrap().is_some());

        settings.clear_sort("7");
        settings.clear(Feature::Dashboard, "7");
        assert_eq!(settings.load_sort("7"), SortSettings::default());
        assert_eq!(
            settings.load(Feature::Dashboard, "7"),
            Feature::Dashboard.defaults()
        );
        assert!(memory.is_empty());
    }

    #[test]
    fn empty_owner_reads_defaults_and_never_writes() {
        let (memory, settings) = store();
        let custom = RefreshSettings {
            enabled: true,
            interval: 10,
        };
        settings.save(Feature::Users, "", custom);
        settings.save(Feature::Users, "  ", custom);
        assert!(memory.is_empty());
        assert_eq!(settings.load(Feature::Users, ""), Feature::Users.defaults());
    }

    #[test]
    fn corrupted_json_falls_back_to_defaults() {
        let (memory, settings) = store();
        memory.set("users_refresh_settings_7", "{not json").unwrap();
        assert_eq!(settings.load(Feature::Users, "7"), Feature::Users.defaults());

        memory.set("users_refresh_settings_7", "[1, 2]").unwrap();
        assert_eq!(settings.load(Feature::Users, "7"), Feature::Users.defaults());
    }

    #[test]
    fn fields_merge_individually() {
        let (memory, settings) = store();
        memory
            .set("users_refresh_settings_7", r#"{"enabled": true}"#)
            .unwrap();
        assert_eq!(
            settings.load(Feature::Users, "7"),
            RefreshSettings {
                enabled: true,
                interval: 5
            }
        );

        memory
            .set(
                "users_refresh_settings_7",
                r#"{"enabled": "yes", "interval": 10, "extra": 1}"#,
            )
            .unwrap();
        assert_eq!(
            settings.load(Feature::Users, "7"),
            RefreshSettings {
                enabled: false,
                interval: 10
            }
        );

        memory
            .set("users_sort_settings_7", r#"{"field": "email", "direction": "sideways"}"#)
            .unwrap();
        assert_eq!(
            settings.load_sort("7"),
            SortSettings {
                field: UserSortField::Email,
                direction: SortDirection::Asc
            }
        );
    }

    #[test]
    fn storage_failures_are_swallowed() {
        let (memory, settings) = store();
        memory.fail_writes(true);
        settings.save(Feature::Users, "7", RefreshSettings {
            enabled: true,
            interval: 1,
        });
        settings.clear(Feature::Users, "7");
        memory.fail_writes(false);
        assert!(memory.is_empty());

        settings.save(Feature::Users, "7", RefreshSettings {
            enabled: true,
            interval: 1,
        });
        memory.fail_reads(true);
        assert_eq!(settings.load(Feature::Users, "7"), Feature::Users.defaults());
    }

    #[test]
    fn unoffered_intervals_snap_to_the_nearest_choice() {
        let (memory, settings) = store();
        let stored = |interval: u32| {
            memory
                .set(
                    "users_refresh_settings_7",
                    &format!(r#"{{"enabled":true,"interval":{interval}}}"#),
                )
                .unwrap();
            settings.load(Feature::Users, "7").interval
        };

        assert_eq!(stored(2), 1);
        assert_eq!(stored(0), 1);
        assert_eq!(stored(3), 1);
        assert_eq!(stored(12), 10);
        assert_eq!(stored(14), 15);
        assert_eq!(stored(600), 30);
        assert_eq!(stored(15), 15);
    }

    #[test]
    fn short_intervals_poll_every_minute() {
        let settings = RefreshSettings {
            enabled: true,
            interval: 0,
        };
        assert_eq!(settings.period(), Duration::from_secs(60));
        assert_eq!(Feature::Users.defaults().period(), Duration::from_secs(300));
    }
}

//! Typed `localStorage` persistence. Values are stored as JSON and nothing
//! else; no versioning or migration.

use fetcher::telemetry::log_error;
use serde::{Serialize, de::DeserializeOwned};
use yew::prelude::*;

/// Return value from the use_local_storage hook.
pub struct UseLocalStorage<T> {
    /// Current value
    pub value: T,
    /// Set a new value (persisted after the next render)
    pub set: Callback<T>,
}

/// Decode a stored entry. A missing entry is `Ok(None)`.
pub fn decode_stored<T: DeserializeOwned>(
    raw: Option<&str>,
) -> Result<Option<T>, serde_json::Error> {
    raw.map(serde_json::from_str).transpose()
}

fn storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

fn load<T: DeserializeOwned>(key: &str) -> Option<T> {
    let raw = match storage()?.get_item(key) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::error!(key, error = ?e, "Failed to read localStorage");
            return None;
        }
    };
    match decode_stored(raw.as_deref()) {
        Ok(value) => value,
        Err(e) => {
            log_error(e);
            None
        }
    }
}

fn save<T: Serialize>(key: &str, value: &T) {
    let Some(storage) = storage() else {
        return;
    };
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            log_error(e);
            return;
        }
    };
    if let Err(e) = storage.set_item(key, &json) {
        tracing::error!(key, error = ?e, "Failed to write localStorage");
    }
}

/// State persisted to `localStorage` under `key`.
///
/// The stored value is read once on mount, falling back to `initial` when
/// the entry is missing or does not parse. Every change of the value (or of
/// the key) is written back.
///
/// # Example
/// ```ignore
/// let theme = use_local_storage("theme", "system".to_string());
/// theme.set.emit("dark".into());
/// ```
#[hook]
pub fn use_local_storage<T>(key: &str, initial: T) -> UseLocalStorage<T>
where
    T: Clone + PartialEq + Serialize + DeserializeOwned + 'static,
{
    let value = {
        let key = key.to_string();
        use_state(move || load(&key).unwrap_or(initial))
    };

    use_effect_with(
        (key.to_string(), (*value).clone()),
        |(key, value)| save(key, value),
    );

    UseLocalStorage {
        value: (*value).clone(),
        set: Callback::from(move |next: T| value.set(next)),
    }
}

//! Key-value persistence behind a small trait.
//!
//! The web build writes through LocalStorage; native builds and tests use an
//! in-memory map. Writes are best-effort: a failed write is logged and the
//! session continues with in-memory state only.

use std::cell::RefCell;
use std::collections::HashMap;

/// Storage keys (versioned so stale saves from older builds are ignored)
pub mod keys {
    pub const COINS: &str = "lane_rush_coins_v1";
    pub const HIGH_SCORE: &str = "lane_rush_high_v1";
    pub const OWNED: &str = "lane_rush_owned_v1";
    pub const SELECTED: &str = "lane_rush_selected_v1";
    pub const PROGRESS: &str = "lane_rush_progress_v1";
    pub const AD_WATCHES: &str = "lane_rush_ads_v1";
    pub const SETTINGS: &str = "lane_rush_settings_v1";
}

/// Durable key-value storage
pub trait Store {
    fn get(&self, key: &str) -> Option<String>;
    /// Best-effort write; implementations log failures instead of returning them
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory store for native builds and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.map.borrow_mut().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.map.borrow_mut().remove(key);
    }
}

/// LocalStorage-backed store (WASM only)
#[cfg(target_arch = "wasm32")]
pub struct WebStore {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl WebStore {
    /// Open LocalStorage; None if the browser denies access (private mode etc.)
    pub fn open() -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok()??;
        Some(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
impl Store for WebStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if self.storage.set_item(key, value).is_err() {
            log::warn!("Failed to persist {key}; continuing with in-memory state");
        }
    }

    fn remove(&self, key: &str) {
        let _ = self.storage.remove_item(key);
    }
}

/// Open the best available store for this platform. LocalStorage when the
/// browser grants it, otherwise a session-only in-memory store.
pub fn open_store() -> Box<dyn Store> {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(store) = WebStore::open() {
            return Box::new(store);
        }
        log::warn!("LocalStorage unavailable; progress will not survive reload");
    }
    Box::new(MemoryStore::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.get(keys::COINS), None);

        store.set(keys::COINS, "250");
        assert_eq!(store.get(keys::COINS).as_deref(), Some("250"));

        store.remove(keys::COINS);
        assert_eq!(store.get(keys::COINS), None);
    }
}

//! Persisted player progression: wallet, high score, vehicle ownership,
//! season unlocks, and rewarded-ad counters.
//!
//! Every read tolerates missing or corrupt storage entries and falls back to
//! the fresh-profile defaults. Mutating operations persist only the keys they
//! touched, immediately.

use std::collections::HashMap;

use thiserror::Error;

use crate::catalog::{self, DEFAULT_VEHICLE, Season};
use crate::consts::SEASON_LEVELS;
use crate::store::{Store, keys};

/// Rejections at the progression boundary. None of these ever reach
/// simulation state; the caller surfaces them and continues.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProgressError {
    #[error("not enough coins: need {price}, have {wallet}")]
    InsufficientFunds { price: u64, wallet: u64 },
    #[error("vehicle {0:?} is not owned")]
    NotOwned(String),
    #[error("unknown vehicle {0:?}")]
    UnknownVehicle(String),
}

/// Outcome of a rewarded-ad watch for a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdWatch {
    /// Nothing changed: ad not granted, vehicle unknown, or already owned
    Ignored,
    /// Counter advanced; the vehicle is still locked
    Progressed { watched: u32, required: u32 },
    /// This watch crossed the threshold; the vehicle is now owned
    Unlocked,
}

/// Durable player state. Created once on first load with defaults, mutated
/// for the lifetime of the process, never deleted except by explicit reset.
#[derive(Debug, Clone)]
pub struct Profile {
    coins: u64,
    high_score: u32,
    owned: Vec<String>,
    selected: String,
    /// Highest selectable level per season (1-based, non-decreasing)
    progress: HashMap<Season, u32>,
    /// Rewarded ads watched per vehicle id
    ad_watches: HashMap<String, u32>,
}

impl Profile {
    /// Load from storage, falling back to defaults for anything missing or
    /// unparseable. Guarantees the invariants: owned is non-empty and
    /// contains the default vehicle, selected is a member of owned.
    pub fn load(store: &dyn Store) -> Self {
        let coins = store
            .get(keys::COINS)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        let high_score = store
            .get(keys::HIGH_SCORE)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);

        let mut owned: Vec<String> = store
            .get(keys::OWNED)
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();
        if !owned.iter().any(|id| id == DEFAULT_VEHICLE) {
            owned.insert(0, DEFAULT_VEHICLE.to_string());
        }

        let selected = store
            .get(keys::SELECTED)
            .filter(|id| owned.iter().any(|o| o == id))
            .unwrap_or_else(|| DEFAULT_VEHICLE.to_string());

        let progress = store
            .get(keys::PROGRESS)
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();
        let ad_watches = store
            .get(keys::AD_WATCHES)
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();

        Self {
            coins,
            high_score,
            owned,
            selected,
            progress,
            ad_watches,
        }
    }

    pub fn coins(&self) -> u64 {
        self.coins
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn owned(&self) -> &[String] {
        &self.owned
    }

    pub fn is_owned(&self, id: &str) -> bool {
        self.owned.iter().any(|o| o == id)
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    pub fn ad_watches(&self, id: &str) -> u32 {
        self.ad_watches.get(id).copied().unwrap_or(0)
    }

    /// Highest selectable level for a season (always at least 1)
    pub fn unlocked_level(&self, season: Season) -> u32 {
        self.progress.get(&season).copied().unwrap_or(1).max(1)
    }

    /// A season is selectable once every level of the prior season is done
    pub fn season_unlocked(&self, season: Season) -> bool {
        match season.prior() {
            None => true,
            Some(prior) => self.unlocked_level(prior) >= SEASON_LEVELS,
        }
    }

    /// Credit coins collected mid-run (or a win reward); persists the wallet
    pub fn add_coins(&mut self, store: &dyn Store, amount: u64) {
        self.coins += amount;
        store.set(keys::COINS, &self.coins.to_string());
    }

    /// Record an endless-mode score; returns true (and persists) on a new high
    pub fn record_score(&mut self, store: &dyn Store, score: u32) -> bool {
        if score > self.high_score {
            self.high_score = score;
            store.set(keys::HIGH_SCORE, &self.high_score.to_string());
            return true;
        }
        false
    }

    /// Buy a vehicle with coins. Already-owned vehicles are a no-op.
    pub fn purchase(&mut self, store: &dyn Store, id: &str) -> Result<(), ProgressError> {
        let def =
            catalog::vehicle(id).ok_or_else(|| ProgressError::UnknownVehicle(id.to_string()))?;
        if self.is_owned(id) {
            return Ok(());
        }
        if self.coins < def.price {
            return Err(ProgressError::InsufficientFunds {
                price: def.price,
                wallet: self.coins,
            });
        }
        self.coins -= def.price;
        self.owned.push(id.to_string());
        store.set(keys::COINS, &self.coins.to_string());
        self.save_owned(store);
        log::info!("Purchased {id} for {} coins", def.price);
        Ok(())
    }

    /// Record the outcome of a rewarded ad watched toward a vehicle unlock.
    /// Ownership is re-checked after the counter moves, so a grant takes
    /// effect within the same call and later watches change nothing.
    pub fn record_ad_watch(&mut self, store: &dyn Store, id: &str, granted: bool) -> AdWatch {
        let Some(def) = catalog::vehicle(id) else {
            log::warn!("Ad progress for unknown vehicle {id:?}");
            return AdWatch::Ignored;
        };
        if !granted || self.is_owned(id) {
            return AdWatch::Ignored;
        }

        let watched = self.ad_watches.entry(id.to_string()).or_insert(0);
        *watched += 1;
        let watched = *watched;
        self.save_ad_watches(store);

        if watched >= def.ads_required && !self.is_owned(id) {
            self.owned.push(id.to_string());
            self.save_owned(store);
            log::info!("{id} unlocked after {watched} rewarded ads");
            return AdWatch::Unlocked;
        }
        AdWatch::Progressed {
            watched,
            required: def.ads_required,
        }
    }

    /// Switch the active vehicle; fails without mutation if it is not owned
    pub fn select_vehicle(&mut self, store: &dyn Store, id: &str) -> Result<(), ProgressError> {
        if !self.is_owned(id) {
            return Err(ProgressError::NotOwned(id.to_string()));
        }
        self.selected = id.to_string();
        store.set(keys::SELECTED, &self.selected);
        Ok(())
    }

    /// Monotonic level unlock: the season's counter becomes
    /// max(current, level + 1) and never decreases.
    pub fn unlock_next_level(&mut self, store: &dyn Store, season: Season, level: u32) {
        let current = self.unlocked_level(season);
        if level + 1 > current {
            self.progress.insert(season, level + 1);
            match serde_json::to_string(&self.progress) {
                Ok(json) => store.set(keys::PROGRESS, &json),
                Err(e) => log::warn!("Failed to encode season progress: {e}"),
            }
        }
    }

    fn save_owned(&self, store: &dyn Store) {
        match serde_json::to_string(&self.owned) {
            Ok(json) => store.set(keys::OWNED, &json),
            Err(e) => log::warn!("Failed to encode owned vehicles: {e}"),
        }
    }

    fn save_ad_watches(&self, store: &dyn Store) {
        match serde_json::to_string(&self.ad_watches) {
            Ok(json) => store.set(keys::AD_WATCHES, &json),
            Err(e) => log::warn!("Failed to encode ad counters: {e}"),
        }
    }
}

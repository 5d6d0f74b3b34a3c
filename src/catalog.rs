//! Static game data: the vehicle catalog, obstacle sprites, and seasons.

use serde::{Deserialize, Serialize};

/// A purchasable (or ad-unlockable) vehicle
#[derive(Debug, Clone, Copy)]
pub struct VehicleDef {
    pub id: &'static str,
    pub name: &'static str,
    /// Coin price; 0 = owned from the start
    pub price: u64,
    /// Rewarded ads required for the free unlock path; 0 = not ad-unlockable
    pub ads_required: u32,
    /// Body color (RGBA) used by the renderer
    pub color: [f32; 4],
}

/// Every vehicle starts locked except this one
pub const DEFAULT_VEHICLE: &str = "red";

pub const VEHICLES: [VehicleDef; 5] = [
    VehicleDef {
        id: "red",
        name: "Red Racer",
        price: 0,
        ads_required: 0,
        color: [0.96, 0.26, 0.21, 1.0],
    },
    VehicleDef {
        id: "yellow",
        name: "Yellow Comet",
        price: 200,
        ads_required: 3,
        color: [1.0, 0.84, 0.04, 1.0],
    },
    VehicleDef {
        id: "blue",
        name: "Blue Bullet",
        price: 500,
        ads_required: 6,
        color: [0.13, 0.59, 0.95, 1.0],
    },
    VehicleDef {
        id: "green",
        name: "Green Flash",
        price: 1000,
        ads_required: 8,
        color: [0.3, 0.69, 0.31, 1.0],
    },
    VehicleDef {
        id: "purple",
        name: "Violet Vroom",
        price: 2000,
        ads_required: 10,
        color: [0.61, 0.15, 0.69, 1.0],
    },
];

/// Look up a vehicle by id
pub fn vehicle(id: &str) -> Option<&'static VehicleDef> {
    VEHICLES.iter().find(|v| v.id == id)
}

/// An obstacle visual: the spawner picks one uniformly at random
#[derive(Debug, Clone, Copy)]
pub struct ObstacleSprite {
    pub name: &'static str,
    pub color: [f32; 4],
}

pub const OBSTACLE_SPRITES: [ObstacleSprite; 7] = [
    ObstacleSprite {
        name: "barrel",
        color: [0.55, 0.43, 0.39, 1.0],
    },
    ObstacleSprite {
        name: "car1",
        color: [0.38, 0.49, 0.55, 1.0],
    },
    ObstacleSprite {
        name: "car2",
        color: [0.91, 0.46, 0.08, 1.0],
    },
    ObstacleSprite {
        name: "car3",
        color: [0.25, 0.32, 0.71, 1.0],
    },
    ObstacleSprite {
        name: "car4",
        color: [0.47, 0.56, 0.41, 1.0],
    },
    ObstacleSprite {
        name: "cone",
        color: [1.0, 0.44, 0.26, 1.0],
    },
    ObstacleSprite {
        name: "oil",
        color: [0.15, 0.15, 0.17, 1.0],
    },
];

/// Adventure seasons, in unlock order: each one is selectable only after
/// every level of the previous season has been completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Summer,
    Winter,
    Autumn,
    Rainy,
}

pub const SEASONS: [Season; 4] = [
    Season::Summer,
    Season::Winter,
    Season::Autumn,
    Season::Rainy,
];

impl Season {
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Summer => "Summer",
            Season::Winter => "Winter",
            Season::Autumn => "Autumn",
            Season::Rainy => "Rainy",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "summer" => Some(Season::Summer),
            "winter" => Some(Season::Winter),
            "autumn" => Some(Season::Autumn),
            "rainy" => Some(Season::Rainy),
            _ => None,
        }
    }

    /// The season that must be completed before this one; None for the first
    pub fn prior(&self) -> Option<Season> {
        match self {
            Season::Summer => None,
            Season::Winter => Some(Season::Summer),
            Season::Autumn => Some(Season::Winter),
            Season::Rainy => Some(Season::Autumn),
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_vehicle_is_free() {
        let v = vehicle(DEFAULT_VEHICLE).unwrap();
        assert_eq!(v.price, 0);
        assert_eq!(v.ads_required, 0);
    }

    #[test]
    fn test_season_order() {
        assert_eq!(Season::Summer.prior(), None);
        assert_eq!(Season::Winter.prior(), Some(Season::Summer));
        assert_eq!(Season::Rainy.prior(), Some(Season::Autumn));
        assert_eq!(Season::from_str("winter"), Some(Season::Winter));
        assert_eq!(Season::from_str("monsoon"), None);
    }
}

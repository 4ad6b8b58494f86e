//! Per-vehicle-type capacity rules
//!
//! Pure lookup from vehicle type to its fixed (max weight, max item count)
//! pair. Thresholds are configuration, not code: `CapacityPolicy` carries the
//! ceilings and can be overridden per type from a config file.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default bike ceiling: 10 kg
pub const BIKE_MAX_WEIGHT_KG: u32 = 10;
/// Default bike ceiling: 2 items
pub const BIKE_MAX_ITEMS: usize = 2;
/// Default truck ceiling: 3 000 kg
pub const TRUCK_MAX_WEIGHT_KG: u32 = 3_000;
/// Default truck ceiling: 100 items
pub const TRUCK_MAX_ITEMS: usize = 100;
/// Default ship ceiling: 100 000 kg
pub const SHIP_MAX_WEIGHT_KG: u32 = 100_000;
/// Default ship ceiling: 10 000 items
pub const SHIP_MAX_ITEMS: usize = 10_000;

/// Vehicle type
///
/// Closed set: three fixed categories, each with an immutable capacity pair
/// taken from the policy at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleType {
    /// Courier bike
    Bike,
    /// Truck
    Truck,
    /// Cargo ship
    Ship,
}

impl VehicleType {
    /// Short code used in record files and vehicle id prefixes
    pub fn code(&self) -> &'static str {
        match self {
            VehicleType::Bike => "Bike",
            VehicleType::Truck => "Truck",
            VehicleType::Ship => "Ship",
        }
    }

    /// Id prefix for vehicles of this type
    pub fn id_prefix(&self) -> &'static str {
        match self {
            VehicleType::Bike => "B",
            VehicleType::Truck => "T",
            VehicleType::Ship => "S",
        }
    }

    /// Parse from a record or console string
    pub fn parse(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bike" => Ok(VehicleType::Bike),
            "truck" => Ok(VehicleType::Truck),
            "ship" => Ok(VehicleType::Ship),
            other => Err(crate::Error::UnknownVehicleType(other.to_string())),
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Fixed capacity pair for one vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacity {
    /// Maximum total weight in kg
    pub max_weight: Decimal,

    /// Maximum item count
    pub max_items: usize,
}

impl Capacity {
    /// Whether this capacity accommodates the given load
    pub fn accommodates(&self, weight: Decimal, count: usize) -> bool {
        weight <= self.max_weight && count <= self.max_items
    }

    /// Spare weight once the given load is carried
    pub fn weight_margin(&self, weight: Decimal) -> Decimal {
        self.max_weight - weight
    }
}

/// Capacity ceilings per vehicle type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityPolicy {
    /// Bike ceiling
    pub bike: Capacity,

    /// Truck ceiling
    pub truck: Capacity,

    /// Ship ceiling
    pub ship: Capacity,
}

impl Default for CapacityPolicy {
    fn default() -> Self {
        Self {
            bike: Capacity {
                max_weight: Decimal::from(BIKE_MAX_WEIGHT_KG),
                max_items: BIKE_MAX_ITEMS,
            },
            truck: Capacity {
                max_weight: Decimal::from(TRUCK_MAX_WEIGHT_KG),
                max_items: TRUCK_MAX_ITEMS,
            },
            ship: Capacity {
                max_weight: Decimal::from(SHIP_MAX_WEIGHT_KG),
                max_items: SHIP_MAX_ITEMS,
            },
        }
    }
}

impl CapacityPolicy {
    /// Look up the fixed capacity pair for a vehicle type
    pub fn capacity_for(&self, vehicle_type: VehicleType) -> Capacity {
        match vehicle_type {
            VehicleType::Bike => self.bike,
            VehicleType::Truck => self.truck,
            VehicleType::Ship => self.ship,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vehicle_type() {
        assert_eq!(VehicleType::parse("Bike").unwrap(), VehicleType::Bike);
        assert_eq!(VehicleType::parse(" truck ").unwrap(), VehicleType::Truck);
        assert!(VehicleType::parse("barge").is_err());
    }

    #[test]
    fn test_default_policy_ceilings() {
        let policy = CapacityPolicy::default();

        let bike = policy.capacity_for(VehicleType::Bike);
        assert_eq!(bike.max_weight, Decimal::from(10));
        assert_eq!(bike.max_items, 2);

        let ship = policy.capacity_for(VehicleType::Ship);
        assert_eq!(ship.max_weight, Decimal::from(100_000));
    }

    #[test]
    fn test_accommodates() {
        let bike = CapacityPolicy::default().capacity_for(VehicleType::Bike);

        assert!(bike.accommodates(Decimal::from(10), 2));
        assert!(!bike.accommodates(Decimal::from(11), 1));
        assert!(!bike.accommodates(Decimal::from(5), 3));
    }

    #[test]
    fn test_weight_margin() {
        let truck = CapacityPolicy::default().capacity_for(VehicleType::Truck);
        assert_eq!(truck.weight_margin(Decimal::from(500)), Decimal::from(2_500));
    }
}

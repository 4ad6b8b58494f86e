//! Vehicle registry
//!
//! Holds vehicle instances and answers candidate lookups by required
//! capacity. A vehicle carries at most one active order; capacity is fixed
//! at registration from the [`CapacityPolicy`].

use crate::capacity::{CapacityPolicy, VehicleType};
use crate::id::IdSource;
use crate::types::{OrderId, Vehicle, VehicleId};
use crate::{Error, Result};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Vehicle registry
#[derive(Debug, Default)]
pub struct VehicleRegistry {
    vehicles: BTreeMap<VehicleId, Vehicle>,
}

impl VehicleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a persisted snapshot
    pub fn from_snapshot(vehicles: Vec<Vehicle>) -> Self {
        Self {
            vehicles: vehicles.into_iter().map(|v| (v.id.clone(), v)).collect(),
        }
    }

    /// Full snapshot for persistence
    pub fn snapshot(&self) -> Vec<Vehicle> {
        self.vehicles.values().cloned().collect()
    }

    /// Register a new vehicle of the given type
    pub fn register(
        &mut self,
        ids: &mut dyn IdSource,
        vehicle_type: VehicleType,
        policy: &CapacityPolicy,
    ) -> Vehicle {
        let vehicle = Vehicle {
            id: VehicleId::new(ids.next(vehicle_type.id_prefix())),
            vehicle_type,
            capacity: policy.capacity_for(vehicle_type),
            assignment: None,
        };

        tracing::info!(
            vehicle_id = %vehicle.id,
            vehicle_type = %vehicle_type,
            max_weight = %vehicle.capacity.max_weight,
            max_items = vehicle.capacity.max_items,
            "Vehicle registered"
        );
        self.vehicles.insert(vehicle.id.clone(), vehicle.clone());
        vehicle
    }

    /// Look up a vehicle
    pub fn get(&self, vehicle_id: &VehicleId) -> Result<&Vehicle> {
        self.vehicles
            .get(vehicle_id)
            .ok_or_else(|| Error::VehicleNotFound(vehicle_id.to_string()))
    }

    /// Remove a vehicle; rejected while it holds an active order
    pub fn remove(&mut self, vehicle_id: &VehicleId) -> Result<()> {
        let vehicle = self.get(vehicle_id)?;
        if vehicle.assignment.is_some() {
            return Err(Error::VehicleBusy(vehicle_id.to_string()));
        }

        self.vehicles.remove(vehicle_id);
        tracing::info!(vehicle_id = %vehicle_id, "Vehicle removed");
        Ok(())
    }

    /// Unassigned vehicles whose capacity accommodates the load, in id order
    ///
    /// Bikes are excluded when the load contains fragile items.
    pub fn candidates(
        &self,
        weight: Decimal,
        count: usize,
        has_fragile: bool,
    ) -> Vec<&Vehicle> {
        self.vehicles
            .values()
            .filter(|v| v.is_available())
            .filter(|v| !(has_fragile && v.vehicle_type == VehicleType::Bike))
            .filter(|v| v.capacity.accommodates(weight, count))
            .collect()
    }

    /// Bind a vehicle to an order
    pub fn bind(&mut self, vehicle_id: &VehicleId, order_id: &OrderId) -> Result<()> {
        let vehicle = self
            .vehicles
            .get_mut(vehicle_id)
            .ok_or_else(|| Error::VehicleNotFound(vehicle_id.to_string()))?;

        if vehicle.assignment.is_some() {
            return Err(Error::VehicleBusy(vehicle_id.to_string()));
        }

        vehicle.assignment = Some(order_id.clone());
        tracing::info!(vehicle_id = %vehicle_id, order_id = %order_id, "Vehicle bound");
        Ok(())
    }

    /// Clear a vehicle's assignment so it becomes selectable again
    pub fn release(&mut self, vehicle_id: &VehicleId) -> Result<()> {
        let vehicle = self
            .vehicles
            .get_mut(vehicle_id)
            .ok_or_else(|| Error::VehicleNotFound(vehicle_id.to_string()))?;

        if vehicle.assignment.take().is_some() {
            tracing::info!(vehicle_id = %vehicle_id, "Vehicle released");
        }
        Ok(())
    }

    /// Iterate all vehicles in id order
    pub fn iter(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.values()
    }

    /// Number of registered vehicles
    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}

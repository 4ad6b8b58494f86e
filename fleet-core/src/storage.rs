//! Snapshot storage over delimited record files
//!
//! One CSV file per entity kind under the data directory, each with a header
//! row. The core reads full snapshots, mutates in memory, and rewrites the
//! whole file on commit; there are no partial updates. A missing file is an
//! empty snapshot.

use crate::types::{
    CustomerId, Destination, Item, ItemId, Order, OrderId, Payment, PaymentId, Priority,
    Vehicle, VehicleId,
};
use crate::capacity::{Capacity, VehicleType};
use crate::lifecycle::OrderStatus;
use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Entity kinds with their own snapshot file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// Registered items
    Items,
    /// Shipment orders
    Orders,
    /// Fleet vehicles
    Vehicles,
    /// Payment attempts
    Payments,
}

impl EntityKind {
    /// Snapshot file name for this kind
    pub fn file_name(&self) -> &'static str {
        match self {
            EntityKind::Items => "items.csv",
            EntityKind::Orders => "orders.csv",
            EntityKind::Vehicles => "vehicles.csv",
            EntityKind::Payments => "payments.csv",
        }
    }
}

/// CSV snapshot store
#[derive(Debug, Clone)]
pub struct CsvStore {
    data_dir: PathBuf,
}

impl CsvStore {
    /// Open a store rooted at the given directory, creating it if needed
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)?;

        tracing::info!(data_dir = %data_dir.display(), "Opened record store");
        Ok(Self { data_dir })
    }

    fn path_for(&self, kind: EntityKind) -> PathBuf {
        self.data_dir.join(kind.file_name())
    }

    /// Load the full snapshot for one entity kind
    pub fn load_all<R: DeserializeOwned>(&self, kind: EntityKind) -> Result<Vec<R>> {
        let path = self.path_for(kind);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&path)?;
        let mut records = Vec::new();
        for row in reader.deserialize() {
            records.push(row?);
        }

        tracing::debug!(file = kind.file_name(), count = records.len(), "Snapshot loaded");
        Ok(records)
    }

    /// Rewrite the full snapshot for one entity kind
    ///
    /// Written to a temp file and renamed so a failed write never truncates
    /// the previous snapshot.
    pub fn save_all<R: Serialize>(&self, kind: EntityKind, records: &[R]) -> Result<()> {
        let path = self.path_for(kind);
        let tmp = path.with_extension("csv.tmp");

        let mut writer = csv::Writer::from_path(&tmp)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        drop(writer);

        std::fs::rename(&tmp, &path)
            .map_err(|e| Error::Storage(format!("rename {}: {}", path.display(), e)))?;

        tracing::debug!(file = kind.file_name(), count = records.len(), "Snapshot written");
        Ok(())
    }

    // Typed snapshots. Items and payments are flat and stored as-is; orders
    // and vehicles go through flat record rows.

    /// Load the item snapshot
    pub fn load_items(&self) -> Result<Vec<Item>> {
        self.load_all(EntityKind::Items)
    }

    /// Save the item snapshot
    pub fn save_items(&self, items: &[Item]) -> Result<()> {
        self.save_all(EntityKind::Items, items)
    }

    /// Load the payment snapshot
    pub fn load_payments(&self) -> Result<Vec<Payment>> {
        self.load_all(EntityKind::Payments)
    }

    /// Save the payment snapshot
    pub fn save_payments(&self, payments: &[Payment]) -> Result<()> {
        self.save_all(EntityKind::Payments, payments)
    }

    /// Load the order snapshot
    pub fn load_orders(&self) -> Result<Vec<Order>> {
        let rows: Vec<OrderRecord> = self.load_all(EntityKind::Orders)?;
        Ok(rows.into_iter().map(Order::from).collect())
    }

    /// Save the order snapshot
    pub fn save_orders(&self, orders: &[Order]) -> Result<()> {
        let rows: Vec<OrderRecord> = orders.iter().map(OrderRecord::from).collect();
        self.save_all(EntityKind::Orders, &rows)
    }

    /// Load the vehicle snapshot
    pub fn load_vehicles(&self) -> Result<Vec<Vehicle>> {
        let rows: Vec<VehicleRecord> = self.load_all(EntityKind::Vehicles)?;
        Ok(rows.into_iter().map(Vehicle::from).collect())
    }

    /// Save the vehicle snapshot
    pub fn save_vehicles(&self, vehicles: &[Vehicle]) -> Result<()> {
        let rows: Vec<VehicleRecord> = vehicles.iter().map(VehicleRecord::from).collect();
        self.save_all(EntityKind::Vehicles, &rows)
    }
}

/// Separator for the member-item list inside one order row
const ITEM_LIST_SEPARATOR: char = ';';

/// Flat order row
#[derive(Debug, Serialize, Deserialize)]
struct OrderRecord {
    id: OrderId,
    customer: CustomerId,
    priority: Priority,
    city: String,
    country: String,
    items: String,
    total_weight: Decimal,
    vehicle: Option<VehicleId>,
    status: OrderStatus,
    payment: Option<PaymentId>,
    placed_at: DateTime<Utc>,
    delivery_date: NaiveDate,
}

impl From<&Order> for OrderRecord {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.clone(),
            customer: order.customer.clone(),
            priority: order.priority,
            city: order.destination.city.clone(),
            country: order.destination.country.clone(),
            items: order
                .items
                .iter()
                .map(|i| i.as_str())
                .collect::<Vec<_>>()
                .join(&ITEM_LIST_SEPARATOR.to_string()),
            total_weight: order.total_weight,
            vehicle: order.vehicle.clone(),
            status: order.status,
            payment: order.payment.clone(),
            placed_at: order.placed_at,
            delivery_date: order.delivery_date,
        }
    }
}

impl From<OrderRecord> for Order {
    fn from(row: OrderRecord) -> Self {
        Self {
            id: row.id,
            customer: row.customer,
            priority: row.priority,
            destination: Destination {
                city: row.city,
                country: row.country,
            },
            items: row
                .items
                .split(ITEM_LIST_SEPARATOR)
                .filter(|s| !s.is_empty())
                .map(ItemId::new)
                .collect(),
            total_weight: row.total_weight,
            vehicle: row.vehicle,
            status: row.status,
            payment: row.payment,
            placed_at: row.placed_at,
            delivery_date: row.delivery_date,
        }
    }
}

/// Flat vehicle row
#[derive(Debug, Serialize, Deserialize)]
struct VehicleRecord {
    id: VehicleId,
    vehicle_type: VehicleType,
    max_weight: Decimal,
    max_items: usize,
    assignment: Option<OrderId>,
}

impl From<&Vehicle> for VehicleRecord {
    fn from(vehicle: &Vehicle) -> Self {
        Self {
            id: vehicle.id.clone(),
            vehicle_type: vehicle.vehicle_type,
            max_weight: vehicle.capacity.max_weight,
            max_items: vehicle.capacity.max_items,
            assignment: vehicle.assignment.clone(),
        }
    }
}

impl From<VehicleRecord> for Vehicle {
    fn from(row: VehicleRecord) -> Self {
        Self {
            id: row.id,
            vehicle_type: row.vehicle_type,
            capacity: Capacity {
                max_weight: row.max_weight,
                max_items: row.max_items,
            },
            assignment: row.assignment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Currency, ItemKind, PaymentMethod, PaymentStatus};
    use tempfile::TempDir;

    fn test_store() -> (CsvStore, TempDir) {
        let temp = TempDir::new().unwrap();
        let store = CsvStore::open(temp.path()).unwrap();
        (store, temp)
    }

    #[test]
    fn test_missing_file_is_empty_snapshot() {
        let (store, _temp) = test_store();
        assert!(store.load_items().unwrap().is_empty());
        assert!(store.load_orders().unwrap().is_empty());
    }

    #[test]
    fn test_item_snapshot_roundtrip() {
        let (store, _temp) = test_store();

        let items = vec![
            Item {
                id: ItemId::new("I1001"),
                description: "tiles".to_string(),
                weight: Decimal::new(25, 1),
                price_per_kg: Decimal::from(4),
                kind: ItemKind::Solid,
                order: Some(OrderId::new("O1001")),
            },
            Item {
                id: ItemId::new("I1002"),
                description: "vases".to_string(),
                weight: Decimal::from(3),
                price_per_kg: Decimal::from(12),
                kind: ItemKind::Fragile,
                order: None,
            },
        ];

        store.save_items(&items).unwrap();
        let loaded = store.load_items().unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].weight, Decimal::new(25, 1));
        assert_eq!(loaded[0].order, Some(OrderId::new("O1001")));
        assert_eq!(loaded[1].kind, ItemKind::Fragile);
        assert!(loaded[1].order.is_none());
    }

    #[test]
    fn test_order_snapshot_roundtrip() {
        let (store, _temp) = test_store();

        let order = Order {
            id: OrderId::new("O1001"),
            customer: CustomerId::new("C1001"),
            priority: Priority::High,
            destination: Destination {
                city: "Malmo".to_string(),
                country: "Sweden".to_string(),
            },
            items: vec![ItemId::new("I1001"), ItemId::new("I1002")],
            total_weight: Decimal::from(5),
            vehicle: Some(VehicleId::new("B1001")),
            status: OrderStatus::Assigned,
            payment: None,
            placed_at: Utc::now(),
            delivery_date: NaiveDate::from_ymd_opt(2026, 9, 15).unwrap(),
        };

        store.save_orders(std::slice::from_ref(&order)).unwrap();
        let loaded = store.load_orders().unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].items, order.items);
        assert_eq!(loaded[0].status, OrderStatus::Assigned);
        assert_eq!(loaded[0].vehicle, order.vehicle);
        assert_eq!(loaded[0].destination, order.destination);
    }

    #[test]
    fn test_vehicle_snapshot_roundtrip() {
        let (store, _temp) = test_store();

        let vehicle = Vehicle {
            id: VehicleId::new("T1001"),
            vehicle_type: VehicleType::Truck,
            capacity: Capacity {
                max_weight: Decimal::from(3_000),
                max_items: 100,
            },
            assignment: None,
        };

        store.save_vehicles(std::slice::from_ref(&vehicle)).unwrap();
        let loaded = store.load_vehicles().unwrap();

        assert_eq!(loaded[0].vehicle_type, VehicleType::Truck);
        assert_eq!(loaded[0].capacity.max_items, 100);
        assert!(loaded[0].assignment.is_none());
    }

    #[test]
    fn test_save_is_full_rewrite() {
        let (store, _temp) = test_store();

        let payment = Payment {
            id: PaymentId::new("TR1001"),
            order: OrderId::new("O1001"),
            amount: Decimal::from(30),
            currency: Currency::Eur,
            method: PaymentMethod::Credit,
            status: PaymentStatus::Pending,
            recorded_at: Utc::now(),
        };

        store.save_payments(std::slice::from_ref(&payment)).unwrap();
        assert_eq!(store.load_payments().unwrap().len(), 1);

        // Saving a smaller snapshot replaces the file wholesale
        store.save_payments(&[]).unwrap();
        assert!(store.load_payments().unwrap().is_empty());
    }
}

//! Freightline Fleet Core
//!
//! Entity model and ledgers for the shipment dispatch system.
//!
//! # Architecture
//!
//! - **Typed records**: items, orders, vehicles and payments as plain structs
//! - **Single status funnel**: every order status change goes through the
//!   lifecycle transition table
//! - **Snapshot persistence**: one delimited file per entity kind, read and
//!   rewritten whole
//!
//! # Invariants
//!
//! - An order's cached total weight equals the sum of its member item weights
//! - A vehicle carries at most one active order; binding is a bijection
//! - Capacity fields are fixed at vehicle creation and never mutated

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms, unused_qualifications)]

pub mod capacity;
pub mod config;
pub mod error;
pub mod id;
pub mod items;
pub mod lifecycle;
pub mod payments;
pub mod storage;
pub mod types;
pub mod vehicles;

// Re-exports
pub use capacity::{Capacity, CapacityPolicy, VehicleType};
pub use config::FleetConfig;
pub use error::{Error, Result};
pub use id::{IdSource, SequentialIds};
pub use items::ItemLedger;
pub use lifecycle::{OrderEvent, OrderStatus};
pub use payments::PaymentLedger;
pub use storage::{CsvStore, EntityKind};
pub use types::{
    Currency, CustomerId, Destination, Item, ItemId, ItemKind, Order, OrderId, Payment,
    PaymentId, PaymentMethod, PaymentStatus, Priority, Vehicle, VehicleId,
};
pub use vehicles::VehicleRegistry;

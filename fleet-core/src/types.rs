//! Core types for the fleet
//!
//! All records are plain serde-derived structs. Money and weight use
//! `Decimal` for exact arithmetic; identifiers are prefixed strings produced
//! by an injected [`crate::IdSource`].

use crate::capacity::{Capacity, VehicleType};
use crate::lifecycle::{OrderEvent, OrderStatus};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Item identifier (`I1001`-style)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(String);

impl ItemId {
    /// Create new item ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order identifier (`O1001`-style)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(String);

impl OrderId {
    /// Create new order ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Vehicle identifier; prefix encodes the type (`B`/`T`/`S`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VehicleId(String);

impl VehicleId {
    /// Create new vehicle ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payment identifier (`TR1001`-style)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PaymentId(String);

impl PaymentId {
    /// Create new payment ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Customer identifier; customer records themselves live outside the core
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CustomerId(String);

impl CustomerId {
    /// Create new customer ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Billing currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    /// Euro
    Eur,
    /// Swedish krona
    Sek,
}

impl Currency {
    /// Currency code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Sek => "SEK",
        }
    }

    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EUR" | "€" => Some(Currency::Eur),
            "SEK" => Some(Currency::Sek),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Credit card
    Credit,
    /// Debit card
    Debit,
}

impl PaymentMethod {
    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "credit" => Some(PaymentMethod::Credit),
            "debit" => Some(PaymentMethod::Debit),
            _ => None,
        }
    }
}

/// Order priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Low priority
    #[default]
    Low,
    /// Medium priority
    Medium,
    /// High priority
    High,
}

impl Priority {
    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

/// Item handling class
///
/// Fragile items are never loaded onto bikes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Fragile goods
    Fragile,
    /// Solid goods
    Solid,
}

impl ItemKind {
    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fragile" => Some(ItemKind::Fragile),
            "solid" => Some(ItemKind::Solid),
            _ => None,
        }
    }
}

/// Delivery destination (city/country)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    /// City
    pub city: String,
    /// Country
    pub country: String,
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.city, self.country)
    }
}

/// A registered shipment item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Item ID
    pub id: ItemId,

    /// Free-text description
    pub description: String,

    /// Weight in kg (strictly positive)
    pub weight: Decimal,

    /// Price per kg, used to derive the order amount
    pub price_per_kg: Decimal,

    /// Handling class
    pub kind: ItemKind,

    /// Owning order, if attached
    pub order: Option<OrderId>,
}

impl Item {
    /// Whether the item is free to join an order
    pub fn is_unassigned(&self) -> bool {
        self.order.is_none()
    }
}

/// A shipment order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Order ID
    pub id: OrderId,

    /// Customer placing the order
    pub customer: CustomerId,

    /// Priority
    pub priority: Priority,

    /// Delivery destination
    pub destination: Destination,

    /// Member items, in attachment order
    pub items: Vec<ItemId>,

    /// Cached sum of member item weights
    pub total_weight: Decimal,

    /// Bound vehicle, if assigned
    pub vehicle: Option<VehicleId>,

    /// Lifecycle status
    pub status: OrderStatus,

    /// Payment recorded against the order, if any
    pub payment: Option<PaymentId>,

    /// When the order was placed
    pub placed_at: DateTime<Utc>,

    /// Requested delivery date
    pub delivery_date: NaiveDate,
}

impl Order {
    /// Apply a lifecycle event
    ///
    /// This is the only place order status is written.
    pub fn apply(&mut self, event: OrderEvent) -> crate::Result<()> {
        self.status = self.status.transition(event)?;
        Ok(())
    }

    /// Member item count
    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Recorded, outcome unknown
    Pending,
    /// Settled by the provider
    Completed,
    /// Rejected by the provider; kept for audit
    Failed,
}

/// A payment attempt against an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Payment ID
    pub id: PaymentId,

    /// Order this payment belongs to (exactly one)
    pub order: OrderId,

    /// Amount
    pub amount: Decimal,

    /// Currency
    pub currency: Currency,

    /// Method
    pub method: PaymentMethod,

    /// Status
    pub status: PaymentStatus,

    /// Recorded timestamp
    pub recorded_at: DateTime<Utc>,
}

/// A registered vehicle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    /// Vehicle ID
    pub id: VehicleId,

    /// Type
    pub vehicle_type: VehicleType,

    /// Capacity, fixed at registration from the policy
    pub capacity: Capacity,

    /// Active order, if bound
    pub assignment: Option<OrderId>,
}

impl Vehicle {
    /// Whether the vehicle can take a new order
    pub fn is_available(&self) -> bool {
        self.assignment.is_none()
    }
}

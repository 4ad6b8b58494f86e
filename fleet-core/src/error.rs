//! Error types for the fleet core

use thiserror::Error;

/// Result type for fleet operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fleet core errors
#[derive(Error, Debug)]
pub enum Error {
    /// Item weight must be strictly positive
    #[error("Invalid weight: {0}")]
    InvalidWeight(String),

    /// Item not found
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Item already belongs to another order
    #[error("Item {item} already assigned to order {order}")]
    ItemAlreadyAssigned {
        /// Item id
        item: String,
        /// Order the item currently belongs to
        order: String,
    },

    /// Item cannot be removed while attached to an order
    #[error("Item {0} is attached to an order")]
    ItemAttached(String),

    /// Vehicle type string not recognised
    #[error("Unknown vehicle type: {0}")]
    UnknownVehicleType(String),

    /// No unassigned vehicle can carry the order
    #[error("No vehicle capacity available for {weight} kg / {count} items")]
    NoCapacityAvailable {
        /// Required weight
        weight: rust_decimal::Decimal,
        /// Required item count
        count: usize,
    },

    /// Status transition not in the lifecycle table
    #[error("Illegal transition: {from} on {event}")]
    IllegalTransition {
        /// Current status
        from: crate::lifecycle::OrderStatus,
        /// Rejected event
        event: crate::lifecycle::OrderEvent,
    },

    /// Vehicle not found
    #[error("Vehicle not found: {0}")]
    VehicleNotFound(String),

    /// Vehicle holds an active assignment
    #[error("Vehicle {0} has an active order")]
    VehicleBusy(String),

    /// Order not found
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Shipment requests need at least one item
    #[error("Order must contain at least one item")]
    EmptyOrder,

    /// Payment not found
    #[error("Payment not found for order {0}")]
    PaymentNotFound(String),

    /// Delivery date too close or in the past
    #[error("Invalid delivery date: {0}")]
    InvalidDeliveryDate(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// CSV decode/encode error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

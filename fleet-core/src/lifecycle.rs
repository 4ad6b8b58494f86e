//! Order lifecycle state machine
//!
//! Every status change funnels through [`OrderStatus::transition`]; nothing
//! else writes an order's status. Illegal pairs are rejected and leave the
//! status unchanged.
//!
//! # Transition table
//!
//! ```text
//! created    --VehicleAssigned-->   assigned
//! assigned   --PaymentCompleted-->  paid
//! paid       --ProcessingStarted--> processing
//! processing --DeliveryConfirmed--> delivered
//! created | assigned | paid --CancelRequested--> canceled
//! ```
//!
//! `delivered` and `canceled` are terminal. A departed or completed shipment
//! cannot be canceled.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Initial state, no vehicle bound
    Created,
    /// Vehicle bound, awaiting payment
    Assigned,
    /// Payment completed
    Paid,
    /// Shipment underway
    Processing,
    /// Delivered (terminal)
    Delivered,
    /// Canceled (terminal)
    Canceled,
}

/// Lifecycle event driving a status change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderEvent {
    /// Assignment engine bound a vehicle
    VehicleAssigned,
    /// Payment ledger reported a completed payment
    PaymentCompleted,
    /// Operator started processing the shipment
    ProcessingStarted,
    /// Operator confirmed delivery
    DeliveryConfirmed,
    /// Operator requested cancellation
    CancelRequested,
}

impl OrderStatus {
    /// Apply an event, returning the next status
    ///
    /// Pure: the caller decides whether to store the result, so a rejected
    /// event cannot leave a half-applied change behind.
    pub fn transition(self, event: OrderEvent) -> crate::Result<OrderStatus> {
        use OrderEvent::*;
        use OrderStatus::*;

        match (self, event) {
            (Created, VehicleAssigned) => Ok(Assigned),
            (Assigned, PaymentCompleted) => Ok(Paid),
            (Paid, ProcessingStarted) => Ok(Processing),
            (Processing, DeliveryConfirmed) => Ok(Delivered),
            (Created | Assigned | Paid, CancelRequested) => Ok(Canceled),
            (from, event) => Err(crate::Error::IllegalTransition { from, event }),
        }
    }

    /// Whether the order can still be canceled
    pub fn cancelable(&self) -> bool {
        matches!(
            self,
            OrderStatus::Created | OrderStatus::Assigned | OrderStatus::Paid
        )
    }

    /// Whether this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Canceled)
    }

    /// Record-file label
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Assigned => "assigned",
            OrderStatus::Paid => "paid",
            OrderStatus::Processing => "processing",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for OrderEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderEvent::VehicleAssigned => "vehicle_assigned",
            OrderEvent::PaymentCompleted => "payment_completed",
            OrderEvent::ProcessingStarted => "processing_started",
            OrderEvent::DeliveryConfirmed => "delivery_confirmed",
            OrderEvent::CancelRequested => "cancel_requested",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let status = OrderStatus::Created
            .transition(OrderEvent::VehicleAssigned)
            .and_then(|s| s.transition(OrderEvent::PaymentCompleted))
            .and_then(|s| s.transition(OrderEvent::ProcessingStarted))
            .and_then(|s| s.transition(OrderEvent::DeliveryConfirmed))
            .unwrap();

        assert_eq!(status, OrderStatus::Delivered);
        assert!(status.is_terminal());
    }

    #[test]
    fn test_cancel_reachability() {
        assert_eq!(
            OrderStatus::Created.transition(OrderEvent::CancelRequested).unwrap(),
            OrderStatus::Canceled
        );
        assert_eq!(
            OrderStatus::Assigned.transition(OrderEvent::CancelRequested).unwrap(),
            OrderStatus::Canceled
        );
        assert_eq!(
            OrderStatus::Paid.transition(OrderEvent::CancelRequested).unwrap(),
            OrderStatus::Canceled
        );
    }

    #[test]
    fn test_processing_cannot_cancel() {
        let err = OrderStatus::Processing
            .transition(OrderEvent::CancelRequested)
            .unwrap_err();

        match err {
            crate::Error::IllegalTransition { from, event } => {
                assert_eq!(from, OrderStatus::Processing);
                assert_eq!(event, OrderEvent::CancelRequested);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_delivered_is_final() {
        assert!(OrderStatus::Delivered
            .transition(OrderEvent::CancelRequested)
            .is_err());
        assert!(OrderStatus::Delivered
            .transition(OrderEvent::PaymentCompleted)
            .is_err());
    }

    #[test]
    fn test_payment_requires_assignment() {
        // Payment arriving before a vehicle is bound is rejected
        assert!(OrderStatus::Created
            .transition(OrderEvent::PaymentCompleted)
            .is_err());
    }

    #[test]
    fn test_cancelable() {
        assert!(OrderStatus::Paid.cancelable());
        assert!(!OrderStatus::Processing.cancelable());
        assert!(!OrderStatus::Canceled.cancelable());
    }
}

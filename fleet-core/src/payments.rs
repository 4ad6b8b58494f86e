//! Payment ledger
//!
//! Records payment attempts per order. Attempts are never destroyed; failed
//! ones stay in the ledger for audit. The dispatch engine consumes the
//! completed/failed outcomes to drive the order lifecycle.

use crate::id::IdSource;
use crate::types::{Currency, OrderId, Payment, PaymentId, PaymentMethod, PaymentStatus};
use crate::{Error, Result};
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Payment ledger
#[derive(Debug, Default)]
pub struct PaymentLedger {
    payments: BTreeMap<PaymentId, Payment>,
}

impl PaymentLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a persisted snapshot
    pub fn from_snapshot(payments: Vec<Payment>) -> Self {
        Self {
            payments: payments.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }

    /// Full snapshot for persistence
    pub fn snapshot(&self) -> Vec<Payment> {
        self.payments.values().cloned().collect()
    }

    /// Record a pending payment attempt against an order
    pub fn record(
        &mut self,
        ids: &mut dyn IdSource,
        order_id: &OrderId,
        amount: Decimal,
        currency: Currency,
        method: PaymentMethod,
    ) -> Payment {
        let payment = Payment {
            id: PaymentId::new(ids.next("TR")),
            order: order_id.clone(),
            amount,
            currency,
            method,
            status: PaymentStatus::Pending,
            recorded_at: Utc::now(),
        };

        tracing::info!(
            payment_id = %payment.id,
            order_id = %order_id,
            %amount,
            currency = %currency,
            "Payment recorded"
        );
        self.payments.insert(payment.id.clone(), payment.clone());
        payment
    }

    /// Look up a payment
    pub fn get(&self, payment_id: &PaymentId) -> Result<&Payment> {
        self.payments
            .get(payment_id)
            .ok_or_else(|| Error::PaymentNotFound(payment_id.to_string()))
    }

    /// The pending payment for an order, if one exists
    pub fn pending_for_order(&self, order_id: &OrderId) -> Result<&Payment> {
        self.payments
            .values()
            .find(|p| &p.order == order_id && p.status == PaymentStatus::Pending)
            .ok_or_else(|| Error::PaymentNotFound(order_id.to_string()))
    }

    /// Mark the order's pending payment completed
    pub fn mark_completed(&mut self, order_id: &OrderId) -> Result<Payment> {
        self.update_pending(order_id, PaymentStatus::Completed)
    }

    /// Mark the order's pending payment failed; the record is retained
    pub fn mark_failed(&mut self, order_id: &OrderId) -> Result<Payment> {
        self.update_pending(order_id, PaymentStatus::Failed)
    }

    fn update_pending(&mut self, order_id: &OrderId, status: PaymentStatus) -> Result<Payment> {
        let payment_id = self.pending_for_order(order_id)?.id.clone();
        let payment = self
            .payments
            .get_mut(&payment_id)
            .ok_or_else(|| Error::PaymentNotFound(order_id.to_string()))?;

        payment.status = status;
        tracing::info!(payment_id = %payment_id, order_id = %order_id, ?status, "Payment updated");
        Ok(payment.clone())
    }

    /// All attempts recorded against an order, oldest first
    pub fn history_for_order(&self, order_id: &OrderId) -> Vec<&Payment> {
        let mut attempts: Vec<&Payment> = self
            .payments
            .values()
            .filter(|p| &p.order == order_id)
            .collect();
        attempts.sort_by_key(|p| p.recorded_at);
        attempts
    }

    /// Iterate all payments in id order
    pub fn iter(&self) -> impl Iterator<Item = &Payment> {
        self.payments.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::SequentialIds;

    fn record_one(ledger: &mut PaymentLedger, ids: &mut SequentialIds, order: &OrderId) -> Payment {
        ledger.record(ids, order, Decimal::from(30), Currency::Eur, PaymentMethod::Credit)
    }

    #[test]
    fn test_record_and_complete() {
        let mut ids = SequentialIds::new();
        let mut ledger = PaymentLedger::new();
        let order = OrderId::new("O1001");

        let payment = record_one(&mut ledger, &mut ids, &order);
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.id.as_str(), "TR1001");

        let completed = ledger.mark_completed(&order).unwrap();
        assert_eq!(completed.status, PaymentStatus::Completed);

        // Nothing pending anymore
        assert!(ledger.pending_for_order(&order).is_err());
    }

    #[test]
    fn test_failed_attempts_are_retained() {
        let mut ids = SequentialIds::new();
        let mut ledger = PaymentLedger::new();
        let order = OrderId::new("O1001");

        record_one(&mut ledger, &mut ids, &order);
        ledger.mark_failed(&order).unwrap();

        // Retry after failure
        record_one(&mut ledger, &mut ids, &order);
        ledger.mark_completed(&order).unwrap();

        let history = ledger.history_for_order(&order);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].status, PaymentStatus::Failed);
        assert_eq!(history[1].status, PaymentStatus::Completed);
    }

    #[test]
    fn test_missing_pending_payment() {
        let ledger = PaymentLedger::new();
        assert!(matches!(
            ledger.pending_for_order(&OrderId::new("O1001")).unwrap_err(),
            Error::PaymentNotFound(_)
        ));
    }
}

//! Item ledger
//!
//! Holds registered items and computes aggregate weight/count for a set of
//! item ids. Attachment to orders is exclusive: an item belongs to at most
//! one order at a time.

use crate::id::IdSource;
use crate::types::{Item, ItemId, ItemKind, OrderId};
use crate::{Error, Result};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Item ledger
#[derive(Debug, Default)]
pub struct ItemLedger {
    items: BTreeMap<ItemId, Item>,
}

impl ItemLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a persisted snapshot
    pub fn from_snapshot(items: Vec<Item>) -> Self {
        Self {
            items: items.into_iter().map(|i| (i.id.clone(), i)).collect(),
        }
    }

    /// Full snapshot for persistence
    pub fn snapshot(&self) -> Vec<Item> {
        self.items.values().cloned().collect()
    }

    /// Register a new item
    ///
    /// Weight must be strictly positive.
    pub fn register(
        &mut self,
        ids: &mut dyn IdSource,
        description: impl Into<String>,
        weight: Decimal,
        price_per_kg: Decimal,
        kind: ItemKind,
    ) -> Result<Item> {
        if weight <= Decimal::ZERO {
            return Err(Error::InvalidWeight(format!(
                "weight must be > 0, got {weight}"
            )));
        }

        let item = Item {
            id: ItemId::new(ids.next("I")),
            description: description.into(),
            weight,
            price_per_kg,
            kind,
            order: None,
        };

        tracing::info!(item_id = %item.id, %weight, "Item registered");
        self.items.insert(item.id.clone(), item.clone());
        Ok(item)
    }

    /// Look up an item
    pub fn get(&self, item_id: &ItemId) -> Result<&Item> {
        self.items
            .get(item_id)
            .ok_or_else(|| Error::ItemNotFound(item_id.to_string()))
    }

    /// Attach an item to an order
    ///
    /// Re-attaching to the same order is a no-op; attaching to a different
    /// order while still attached fails.
    pub fn attach_to_order(&mut self, item_id: &ItemId, order_id: &OrderId) -> Result<()> {
        let item = self
            .items
            .get_mut(item_id)
            .ok_or_else(|| Error::ItemNotFound(item_id.to_string()))?;

        match &item.order {
            Some(existing) if existing == order_id => Ok(()),
            Some(existing) => Err(Error::ItemAlreadyAssigned {
                item: item_id.to_string(),
                order: existing.to_string(),
            }),
            None => {
                item.order = Some(order_id.clone());
                tracing::debug!(item_id = %item_id, order_id = %order_id, "Item attached");
                Ok(())
            }
        }
    }

    /// Clear an item's order reference; no-op if already detached
    pub fn detach_from_order(&mut self, item_id: &ItemId) -> Result<()> {
        let item = self
            .items
            .get_mut(item_id)
            .ok_or_else(|| Error::ItemNotFound(item_id.to_string()))?;

        if item.order.take().is_some() {
            tracing::debug!(item_id = %item_id, "Item detached");
        }
        Ok(())
    }

    /// Aggregate weight and count over a set of item ids
    ///
    /// Pure computation; fails if any id is unresolved.
    pub fn aggregate(&self, item_ids: &[ItemId]) -> Result<(Decimal, usize)> {
        let mut total = Decimal::ZERO;
        for id in item_ids {
            total += self.get(id)?.weight;
        }
        Ok((total, item_ids.len()))
    }

    /// Billable amount for a set of items: Σ weight × price per kg
    pub fn order_amount(&self, item_ids: &[ItemId]) -> Result<Decimal> {
        let mut amount = Decimal::ZERO;
        for id in item_ids {
            let item = self.get(id)?;
            amount += item.weight * item.price_per_kg;
        }
        Ok(amount)
    }

    /// Whether any of the given items is fragile
    pub fn any_fragile(&self, item_ids: &[ItemId]) -> Result<bool> {
        for id in item_ids {
            if self.get(id)?.kind == ItemKind::Fragile {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Remove an item; rejected while it belongs to an order
    pub fn remove(&mut self, item_id: &ItemId) -> Result<()> {
        let item = self.get(item_id)?;
        if item.order.is_some() {
            return Err(Error::ItemAttached(item_id.to_string()));
        }

        self.items.remove(item_id);
        tracing::info!(item_id = %item_id, "Item removed");
        Ok(())
    }

    /// Iterate all items in id order
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Number of registered items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the ledger is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::SequentialIds;

    fn ledger_with(weights: &[i64]) -> (ItemLedger, Vec<ItemId>, SequentialIds) {
        let mut ids = SequentialIds::new();
        let mut ledger = ItemLedger::new();
        let item_ids = weights
            .iter()
            .map(|w| {
                ledger
                    .register(&mut ids, "crate", Decimal::from(*w), Decimal::ONE, ItemKind::Solid)
                    .unwrap()
                    .id
            })
            .collect();
        (ledger, item_ids, ids)
    }

    #[test]
    fn test_register_rejects_non_positive_weight() {
        let mut ids = SequentialIds::new();
        let mut ledger = ItemLedger::new();

        let err = ledger
            .register(&mut ids, "void", Decimal::ZERO, Decimal::ONE, ItemKind::Solid)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidWeight(_)));

        assert!(ledger
            .register(&mut ids, "lead", Decimal::from(-3), Decimal::ONE, ItemKind::Solid)
            .is_err());
    }

    #[test]
    fn test_aggregate() {
        let (ledger, ids, _) = ledger_with(&[2, 3, 5]);

        let (weight, count) = ledger.aggregate(&ids).unwrap();
        assert_eq!(weight, Decimal::from(10));
        assert_eq!(count, 3);
    }

    #[test]
    fn test_aggregate_unresolved_id() {
        let (ledger, mut ids, _) = ledger_with(&[2]);
        ids.push(ItemId::new("I9999"));

        assert!(matches!(
            ledger.aggregate(&ids).unwrap_err(),
            Error::ItemNotFound(_)
        ));
    }

    #[test]
    fn test_exclusive_attachment() {
        let (mut ledger, ids, _) = ledger_with(&[2]);
        let o1 = OrderId::new("O1001");
        let o2 = OrderId::new("O1002");

        ledger.attach_to_order(&ids[0], &o1).unwrap();
        // Same order again: no-op
        ledger.attach_to_order(&ids[0], &o1).unwrap();
        // Different order: rejected
        assert!(matches!(
            ledger.attach_to_order(&ids[0], &o2).unwrap_err(),
            Error::ItemAlreadyAssigned { .. }
        ));
    }

    #[test]
    fn test_detach_is_idempotent() {
        let (mut ledger, ids, _) = ledger_with(&[2]);
        let order = OrderId::new("O1001");

        ledger.attach_to_order(&ids[0], &order).unwrap();
        ledger.detach_from_order(&ids[0]).unwrap();
        assert!(ledger.get(&ids[0]).unwrap().is_unassigned());

        // Second detach: no error, no state change
        ledger.detach_from_order(&ids[0]).unwrap();
        assert!(ledger.get(&ids[0]).unwrap().is_unassigned());
    }

    #[test]
    fn test_remove_guard() {
        let (mut ledger, ids, _) = ledger_with(&[2]);
        let order = OrderId::new("O1001");

        ledger.attach_to_order(&ids[0], &order).unwrap();
        assert!(matches!(
            ledger.remove(&ids[0]).unwrap_err(),
            Error::ItemAttached(_)
        ));

        ledger.detach_from_order(&ids[0]).unwrap();
        ledger.remove(&ids[0]).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_order_amount() {
        let mut ids = SequentialIds::new();
        let mut ledger = ItemLedger::new();
        let a = ledger
            .register(&mut ids, "tiles", Decimal::from(4), Decimal::new(25, 1), ItemKind::Solid)
            .unwrap();
        let b = ledger
            .register(&mut ids, "glass", Decimal::from(2), Decimal::from(10), ItemKind::Fragile)
            .unwrap();

        // 4 * 2.5 + 2 * 10 = 30
        let amount = ledger.order_amount(&[a.id.clone(), b.id.clone()]).unwrap();
        assert_eq!(amount, Decimal::from(30));

        assert!(ledger.any_fragile(&[a.id, b.id]).unwrap());
    }
}

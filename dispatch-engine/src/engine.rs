//! Dispatch engine
//!
//! Orchestrates item aggregation, capacity-constrained vehicle assignment
//! and the order lifecycle.
//!
//! # Assignment
//!
//! ```text
//! aggregate(order items) -> (weight, count)
//! candidates = unassigned vehicles with weight <= max_weight
//!              and count <= max_items (bikes excluded for fragile loads)
//! pick tightest fit: smallest (max_weight - weight), ties by lowest id
//! bind vehicle + order status created -> assigned, as one unit
//! ```
//!
//! The tightest fit keeps larger vehicles free for future heavy orders.
//!
//! Every operation validates all preconditions before touching any entity,
//! so a failure never leaves a partially applied change.

use chrono::{Duration, NaiveDate, Utc};
use fleet_core::{
    Currency, CustomerId, Destination, Error, FleetConfig, IdSource, Item, ItemId,
    ItemKind, ItemLedger, Order, OrderEvent, OrderId, Payment, PaymentLedger,
    PaymentMethod, Priority, Result, SequentialIds, Vehicle, VehicleId,
    VehicleRegistry, VehicleType,
};
use fleet_core::storage::CsvStore;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Payment outcome notification consumed by the engine
///
/// Emitted at the payment provider boundary; the engine only reacts to the
/// outcome, it does not validate amounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentEvent {
    /// The order's pending payment settled
    Completed(OrderId),
    /// The order's pending payment was rejected; kept for audit, the order
    /// status does not regress
    Failed(OrderId),
}

/// Dispatch engine
///
/// Owns the order book and composes the item ledger, vehicle registry and
/// payment ledger. Constructed once at process start and threaded through;
/// there is no other shared state.
pub struct DispatchEngine {
    config: FleetConfig,
    store: CsvStore,
    ids: Box<dyn IdSource>,
    items: ItemLedger,
    vehicles: VehicleRegistry,
    payments: PaymentLedger,
    orders: BTreeMap<OrderId, Order>,
}

impl DispatchEngine {
    /// Open the engine over the configured data directory
    ///
    /// Loads all four snapshots with the default sequential id source.
    pub fn open(config: FleetConfig) -> Result<Self> {
        Self::open_with_ids(config, Box::new(SequentialIds::new()))
    }

    /// Open the engine with an injected id source
    ///
    /// Every persisted id is replayed into the source so new ids never
    /// collide with loaded ones.
    pub fn open_with_ids(config: FleetConfig, mut ids: Box<dyn IdSource>) -> Result<Self> {
        let store = CsvStore::open(&config.data_dir)?;

        let items = ItemLedger::from_snapshot(store.load_items()?);
        let vehicles = VehicleRegistry::from_snapshot(store.load_vehicles()?);
        let payments = PaymentLedger::from_snapshot(store.load_payments()?);
        let orders: BTreeMap<OrderId, Order> = store
            .load_orders()?
            .into_iter()
            .map(|o| (o.id.clone(), o))
            .collect();

        for item in items.iter() {
            ids.observe(item.id.as_str());
        }
        for vehicle in vehicles.iter() {
            ids.observe(vehicle.id.as_str());
        }
        for payment in payments.iter() {
            ids.observe(payment.id.as_str());
        }
        for order_id in orders.keys() {
            ids.observe(order_id.as_str());
        }

        tracing::info!(
            items = items.len(),
            vehicles = vehicles.len(),
            orders = orders.len(),
            "Dispatch engine opened"
        );

        Ok(Self {
            config,
            store,
            ids,
            items,
            vehicles,
            payments,
            orders,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &FleetConfig {
        &self.config
    }

    // ---- item and vehicle registration -------------------------------------

    /// Register a new shipment item
    pub fn register_item(
        &mut self,
        description: impl Into<String>,
        weight: Decimal,
        price_per_kg: Decimal,
        kind: ItemKind,
    ) -> Result<Item> {
        self.items
            .register(self.ids.as_mut(), description, weight, price_per_kg, kind)
    }

    /// Remove an item; rejected while it belongs to an order
    pub fn remove_item(&mut self, item_id: &ItemId) -> Result<()> {
        self.items.remove(item_id)
    }

    /// Register a new vehicle; capacity is fixed from the policy
    pub fn register_vehicle(&mut self, vehicle_type: VehicleType) -> Vehicle {
        self.vehicles
            .register(self.ids.as_mut(), vehicle_type, &self.config.capacity)
    }

    /// Remove a vehicle; rejected while it holds an active order
    pub fn remove_vehicle(&mut self, vehicle_id: &VehicleId) -> Result<()> {
        self.vehicles.remove(vehicle_id)
    }

    // ---- order lifecycle ---------------------------------------------------

    /// Create an order over a set of registered, unassigned items
    ///
    /// The member list is treated as a set: duplicate ids collapse to their
    /// first occurrence. The cached total weight is computed here and never
    /// recomputed while the member list is unchanged.
    pub fn create_order(
        &mut self,
        customer: CustomerId,
        priority: Priority,
        destination: Destination,
        delivery_date: NaiveDate,
        item_ids: Vec<ItemId>,
    ) -> Result<Order> {
        let mut members: Vec<ItemId> = Vec::with_capacity(item_ids.len());
        for id in item_ids {
            if !members.contains(&id) {
                members.push(id);
            }
        }
        if members.is_empty() {
            return Err(Error::EmptyOrder);
        }

        let earliest = Utc::now().date_naive() + Duration::days(self.config.min_delivery_lead_days);
        if delivery_date < earliest {
            return Err(Error::InvalidDeliveryDate(format!(
                "{delivery_date} is before the earliest allowed date {earliest}"
            )));
        }

        for id in &members {
            let item = self.items.get(id)?;
            if let Some(existing) = &item.order {
                return Err(Error::ItemAlreadyAssigned {
                    item: id.to_string(),
                    order: existing.to_string(),
                });
            }
        }
        let (total_weight, _) = self.items.aggregate(&members)?;

        // All preconditions hold; mutations below cannot fail
        let order_id = OrderId::new(self.ids.next("O"));
        for id in &members {
            self.items.attach_to_order(id, &order_id)?;
        }

        let order = Order {
            id: order_id.clone(),
            customer,
            priority,
            destination,
            items: members,
            total_weight,
            vehicle: None,
            status: fleet_core::OrderStatus::Created,
            payment: None,
            placed_at: Utc::now(),
            delivery_date,
        };

        tracing::info!(
            order_id = %order.id,
            customer = %order.customer,
            %total_weight,
            items = order.item_count(),
            "Order created"
        );
        self.orders.insert(order_id, order.clone());
        Ok(order)
    }

    /// Assign the tightest-fitting available vehicle to an order
    ///
    /// Fails without side effects when no unassigned vehicle accommodates the
    /// load; among fitting vehicles the smallest spare weight wins, ties by
    /// lowest vehicle id.
    pub fn assign(&mut self, order_id: &OrderId) -> Result<Vehicle> {
        let order = self.order(order_id)?;
        order.status.transition(OrderEvent::VehicleAssigned)?;

        let (weight, count) = self.items.aggregate(&order.items)?;
        let has_fragile = self.items.any_fragile(&order.items)?;

        let chosen = self
            .vehicles
            .candidates(weight, count, has_fragile)
            .into_iter()
            .min_by_key(|v| (v.capacity.weight_margin(weight), v.id.clone()))
            .map(|v| v.id.clone())
            .ok_or(Error::NoCapacityAvailable { weight, count })?;

        self.vehicles.bind(&chosen, order_id)?;
        let order = self.order_mut(order_id)?;
        order.vehicle = Some(chosen.clone());
        order.apply(OrderEvent::VehicleAssigned)?;

        tracing::info!(order_id = %order_id, vehicle_id = %chosen, %weight, "Order assigned");
        Ok(self.vehicles.get(&chosen)?.clone())
    }

    /// Record a pending payment for an assigned order
    ///
    /// The amount is derived from the member items: Σ weight × price per kg.
    pub fn record_payment(
        &mut self,
        order_id: &OrderId,
        currency: Currency,
        method: PaymentMethod,
    ) -> Result<Payment> {
        let order = self.order(order_id)?;
        // Only orders that can still move to paid take new payments
        order.status.transition(OrderEvent::PaymentCompleted)?;

        let amount = self.items.order_amount(&order.items)?;
        let payment = self
            .payments
            .record(self.ids.as_mut(), order_id, amount, currency, method);

        self.order_mut(order_id)?.payment = Some(payment.id.clone());
        Ok(payment)
    }

    /// Consume a payment outcome from the provider boundary
    ///
    /// A completed payment moves the order to paid. A failed one is retained
    /// in the ledger and logged; the order stays where it is so the operator
    /// can retry.
    pub fn handle_payment_event(&mut self, event: PaymentEvent, operator: &str) -> Result<()> {
        match event {
            PaymentEvent::Completed(order_id) => {
                let order = self.order(&order_id)?;
                order.status.transition(OrderEvent::PaymentCompleted)?;
                self.payments.pending_for_order(&order_id)?;

                self.payments.mark_completed(&order_id)?;
                self.order_mut(&order_id)?.apply(OrderEvent::PaymentCompleted)?;
                tracing::info!(order_id = %order_id, operator, "Payment completed");
            }
            PaymentEvent::Failed(order_id) => {
                let status = self.order(&order_id)?.status;
                self.payments.mark_failed(&order_id)?;
                tracing::warn!(
                    order_id = %order_id,
                    operator,
                    %status,
                    "Payment failed; order status unchanged"
                );
            }
        }
        Ok(())
    }

    /// Move a paid order into processing
    pub fn start_processing(&mut self, order_id: &OrderId, operator: &str) -> Result<()> {
        self.order_mut(order_id)?.apply(OrderEvent::ProcessingStarted)?;
        tracing::info!(order_id = %order_id, operator, "Processing started");
        Ok(())
    }

    /// Confirm delivery of a processing order
    ///
    /// The bound vehicle is released together with the status change, so a
    /// delivered order never pins fleet capacity.
    pub fn confirm_delivery(&mut self, order_id: &OrderId, operator: &str) -> Result<()> {
        let order = self.order(order_id)?;
        order.status.transition(OrderEvent::DeliveryConfirmed)?;

        if let Some(vehicle_id) = order.vehicle.clone() {
            self.vehicles.release(&vehicle_id)?;
        }
        let order = self.order_mut(order_id)?;
        order.vehicle = None;
        order.apply(OrderEvent::DeliveryConfirmed)?;

        tracing::info!(order_id = %order_id, operator, "Delivery confirmed");
        Ok(())
    }

    /// Cancel an order that has not entered processing
    ///
    /// Releases the bound vehicle and detaches the member items so both
    /// become reusable; the order keeps its member list and cached weight as
    /// an audit record.
    pub fn cancel(&mut self, order_id: &OrderId, operator: &str) -> Result<()> {
        let order = self.order(order_id)?;
        order.status.transition(OrderEvent::CancelRequested)?;
        self.items.aggregate(&order.items)?;
        let members = order.items.clone();

        if let Some(vehicle_id) = order.vehicle.clone() {
            self.vehicles.release(&vehicle_id)?;
        }
        for id in &members {
            self.items.detach_from_order(id)?;
        }
        let order = self.order_mut(order_id)?;
        order.vehicle = None;
        order.apply(OrderEvent::CancelRequested)?;

        tracing::info!(order_id = %order_id, operator, "Order canceled");
        Ok(())
    }

    // ---- persistence -------------------------------------------------------

    /// Write all four snapshots
    pub fn commit(&self) -> Result<()> {
        self.store.save_items(&self.items.snapshot())?;
        self.store.save_vehicles(&self.vehicles.snapshot())?;
        self.store.save_payments(&self.payments.snapshot())?;
        let orders: Vec<Order> = self.orders.values().cloned().collect();
        self.store.save_orders(&orders)?;

        tracing::info!(orders = orders.len(), "Snapshots committed");
        Ok(())
    }

    // ---- read access -------------------------------------------------------

    /// Look up an order
    pub fn order(&self, order_id: &OrderId) -> Result<&Order> {
        self.orders
            .get(order_id)
            .ok_or_else(|| Error::OrderNotFound(order_id.to_string()))
    }

    fn order_mut(&mut self, order_id: &OrderId) -> Result<&mut Order> {
        self.orders
            .get_mut(order_id)
            .ok_or_else(|| Error::OrderNotFound(order_id.to_string()))
    }

    /// Iterate all orders in id order
    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    /// Item ledger
    pub fn items(&self) -> &ItemLedger {
        &self.items
    }

    /// Vehicle registry
    pub fn vehicles(&self) -> &VehicleRegistry {
        &self.vehicles
    }

    /// Payment ledger
    pub fn payments(&self) -> &PaymentLedger {
        &self.payments
    }
}

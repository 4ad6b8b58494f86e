//! Property-based tests for assignment and the order lifecycle

use chrono::{Duration, Utc};
use dispatch_engine::DispatchEngine;
use fleet_core::{
    CustomerId, Destination, FleetConfig, ItemId, ItemKind, OrderEvent, OrderStatus,
    Priority, VehicleType,
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use tempfile::TempDir;

fn engine() -> (DispatchEngine, TempDir) {
    let temp = TempDir::new().unwrap();
    let config = FleetConfig {
        data_dir: temp.path().to_path_buf(),
        ..FleetConfig::default()
    };
    (DispatchEngine::open(config).unwrap(), temp)
}

fn place(engine: &mut DispatchEngine, weights: &[i64]) -> fleet_core::OrderId {
    let items: Vec<ItemId> = weights
        .iter()
        .map(|w| {
            engine
                .register_item("load", Decimal::from(*w), Decimal::ONE, ItemKind::Solid)
                .unwrap()
                .id
        })
        .collect();
    engine
        .create_order(
            CustomerId::new("C1001"),
            Priority::Low,
            Destination {
                city: "Lund".to_string(),
                country: "Sweden".to_string(),
            },
            Utc::now().date_naive() + Duration::days(7),
            items,
        )
        .unwrap()
        .id
}

fn vehicle_type_strategy() -> impl Strategy<Value = VehicleType> {
    prop::sample::select(vec![VehicleType::Bike, VehicleType::Truck, VehicleType::Ship])
}

proptest! {
    /// Property: a successful assignment never violates the chosen
    /// vehicle's capacity, and picks the smallest spare weight on offer
    #[test]
    fn assignment_respects_capacity_and_is_tightest(
        weights in prop::collection::vec(1i64..=60, 1..6),
        fleet in prop::collection::vec(vehicle_type_strategy(), 1..5),
    ) {
        let (mut engine, _temp) = engine();
        for vehicle_type in fleet {
            engine.register_vehicle(vehicle_type);
        }

        let order_id = place(&mut engine, &weights);
        let total: Decimal = weights.iter().map(|w| Decimal::from(*w)).sum();
        let count = weights.len();

        let margins: Vec<Decimal> = engine
            .vehicles()
            .iter()
            .filter(|v| v.is_available() && v.capacity.accommodates(total, count))
            .map(|v| v.capacity.weight_margin(total))
            .collect();

        match engine.assign(&order_id) {
            Ok(vehicle) => {
                prop_assert!(vehicle.capacity.accommodates(total, count));
                let chosen = vehicle.capacity.weight_margin(total);
                for margin in margins {
                    prop_assert!(chosen <= margin);
                }
            }
            Err(_) => {
                // A failed assignment means no fitting vehicle existed
                prop_assert!(margins.is_empty());
                prop_assert_eq!(
                    engine.order(&order_id).unwrap().status,
                    OrderStatus::Created
                );
            }
        }
    }
}

proptest! {
    /// Property: the cached order weight always equals the sum of its
    /// member item weights
    #[test]
    fn cached_weight_matches_member_sum(
        weights in prop::collection::vec(1i64..=1_000, 1..10),
    ) {
        let (mut engine, _temp) = engine();
        let order_id = place(&mut engine, &weights);

        let order = engine.order(&order_id).unwrap();
        let (recomputed, count) = engine.items().aggregate(&order.items).unwrap();
        prop_assert_eq!(order.total_weight, recomputed);
        prop_assert_eq!(order.item_count(), count);

        let expected: Decimal = weights.iter().map(|w| Decimal::from(*w)).sum();
        prop_assert_eq!(order.total_weight, expected);
    }
}

proptest! {
    /// Property: terminal statuses accept no event, and any accepted event
    /// lands on a status the transition table knows
    #[test]
    fn lifecycle_is_closed_and_terminal_states_are_final(
        status in prop::sample::select(vec![
            OrderStatus::Created,
            OrderStatus::Assigned,
            OrderStatus::Paid,
            OrderStatus::Processing,
            OrderStatus::Delivered,
            OrderStatus::Canceled,
        ]),
        event in prop::sample::select(vec![
            OrderEvent::VehicleAssigned,
            OrderEvent::PaymentCompleted,
            OrderEvent::ProcessingStarted,
            OrderEvent::DeliveryConfirmed,
            OrderEvent::CancelRequested,
        ]),
    ) {
        match status.transition(event) {
            Ok(next) => {
                prop_assert!(!status.is_terminal());
                prop_assert_ne!(next, status);
            }
            Err(_) => {
                // Rejected events include everything sent at a terminal status
            }
        }

        if status.is_terminal() {
            prop_assert!(status.transition(event).is_err());
        }
    }
}

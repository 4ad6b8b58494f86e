//! Dispatch operator console
//!
//! Single-operator text console over the dispatch engine. Reads commands
//! from stdin, applies them to the engine and rewrites the snapshots after
//! every successful change.

use anyhow::Context;
use chrono::NaiveDate;
use dispatch_engine::{DispatchEngine, PaymentEvent};
use fleet_core::{
    Currency, CustomerId, Destination, FleetConfig, ItemId, ItemKind, OrderId,
    PaymentMethod, Priority, VehicleId, VehicleType,
};
use rust_decimal::Decimal;
use std::io::{BufRead, Write};

fn main() -> anyhow::Result<()> {
    // Initialize tracing; logs go to stderr so the menu stays readable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => FleetConfig::from_file(&path)
            .with_context(|| format!("loading configuration from {path}"))?,
        None => FleetConfig::from_env(),
    };

    let mut engine = DispatchEngine::open(config).context("opening dispatch engine")?;

    println!("Freightline dispatch console");
    let operator = prompt("operator name")?;

    loop {
        print_menu();
        let choice = prompt("choice")?;
        let result = match choice.as_str() {
            "1" => register_item(&mut engine),
            "2" => list_items(&engine),
            "3" => remove_item(&mut engine),
            "4" => register_vehicle(&mut engine),
            "5" => list_vehicles(&engine),
            "6" => remove_vehicle(&mut engine),
            "7" => create_order(&mut engine),
            "8" => list_orders(&engine),
            "9" => assign_order(&mut engine),
            "10" => take_payment(&mut engine, &operator),
            "11" => advance_order(&mut engine, &operator),
            "12" => cancel_order(&mut engine, &operator),
            "13" => payment_history(&engine),
            "q" => break,
            other => {
                println!("Unknown choice: {other}");
                continue;
            }
        };

        match result {
            Ok(()) => {
                engine.commit().context("writing snapshots")?;
            }
            Err(e) => println!("Error: {e}"),
        }
    }

    engine.commit().context("writing snapshots")?;
    println!("Goodbye, {operator}");
    Ok(())
}

fn print_menu() {
    println!();
    println!(" 1) register item       7) create order");
    println!(" 2) list items          8) list orders");
    println!(" 3) remove item         9) assign vehicle");
    println!(" 4) register vehicle   10) take payment");
    println!(" 5) list vehicles      11) process / deliver");
    println!(" 6) remove vehicle     12) cancel order");
    println!("13) payment history     q) quit");
}

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{label}> ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn register_item(engine: &mut DispatchEngine) -> anyhow::Result<()> {
    let description = prompt("description")?;
    let weight: Decimal = prompt("weight (kg)")?.parse().context("weight must be a number")?;
    let price: Decimal = prompt("price per kg")?.parse().context("price must be a number")?;
    let kind = ItemKind::parse(&prompt("kind (fragile/solid)")?)
        .context("kind must be fragile or solid")?;

    let item = engine.register_item(description, weight, price, kind)?;
    println!("Registered item {}", item.id);
    Ok(())
}

fn list_items(engine: &DispatchEngine) -> anyhow::Result<()> {
    for item in engine.items().iter() {
        let owner = item
            .order
            .as_ref()
            .map(|o| o.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}  {:?}  {} kg  {}/kg  order {}  {}",
            item.id, item.kind, item.weight, item.price_per_kg, owner, item.description
        );
    }
    Ok(())
}

fn remove_item(engine: &mut DispatchEngine) -> anyhow::Result<()> {
    let id = ItemId::new(prompt("item id")?);
    engine.remove_item(&id)?;
    println!("Removed item {id}");
    Ok(())
}

fn register_vehicle(engine: &mut DispatchEngine) -> anyhow::Result<()> {
    let vehicle_type = VehicleType::parse(&prompt("type (bike/truck/ship)")?)?;
    let vehicle = engine.register_vehicle(vehicle_type);
    println!(
        "Registered {} {} ({} kg / {} items)",
        vehicle.vehicle_type, vehicle.id, vehicle.capacity.max_weight, vehicle.capacity.max_items
    );
    Ok(())
}

fn list_vehicles(engine: &DispatchEngine) -> anyhow::Result<()> {
    for vehicle in engine.vehicles().iter() {
        let load = vehicle
            .assignment
            .as_ref()
            .map(|o| o.to_string())
            .unwrap_or_else(|| "available".to_string());
        println!(
            "{}  {}  {} kg / {} items  {}",
            vehicle.id,
            vehicle.vehicle_type,
            vehicle.capacity.max_weight,
            vehicle.capacity.max_items,
            load
        );
    }
    Ok(())
}

fn remove_vehicle(engine: &mut DispatchEngine) -> anyhow::Result<()> {
    let id = VehicleId::new(prompt("vehicle id")?);
    engine.remove_vehicle(&id)?;
    println!("Removed vehicle {id}");
    Ok(())
}

fn create_order(engine: &mut DispatchEngine) -> anyhow::Result<()> {
    let customer = CustomerId::new(prompt("customer id")?);
    let priority =
        Priority::parse(&prompt("priority (low/medium/high)")?).context("unknown priority")?;
    let destination = Destination {
        city: prompt("destination city")?,
        country: prompt("destination country")?,
    };
    let delivery_date: NaiveDate = prompt("delivery date (YYYY-MM-DD)")?
        .parse()
        .context("date must be YYYY-MM-DD")?;
    let items: Vec<ItemId> = prompt("item ids (comma separated)")?
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(ItemId::new)
        .collect();

    let order = engine.create_order(customer, priority, destination, delivery_date, items)?;
    println!(
        "Created order {} to {} ({} kg, {} items)",
        order.id,
        order.destination,
        order.total_weight,
        order.item_count()
    );
    Ok(())
}

fn list_orders(engine: &DispatchEngine) -> anyhow::Result<()> {
    for order in engine.orders() {
        let vehicle = order
            .vehicle
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}  {}  {:?}  {}  {} kg  vehicle {}  due {}",
            order.id,
            order.status,
            order.priority,
            order.destination,
            order.total_weight,
            vehicle,
            order.delivery_date
        );
    }
    Ok(())
}

fn assign_order(engine: &mut DispatchEngine) -> anyhow::Result<()> {
    let id = OrderId::new(prompt("order id")?);
    let vehicle = engine.assign(&id)?;
    println!("Order {} assigned to {} {}", id, vehicle.vehicle_type, vehicle.id);
    Ok(())
}

fn take_payment(engine: &mut DispatchEngine, operator: &str) -> anyhow::Result<()> {
    let id = OrderId::new(prompt("order id")?);
    let currency =
        Currency::parse(&prompt("currency (EUR/SEK)")?).context("unknown currency")?;
    let method =
        PaymentMethod::parse(&prompt("method (credit/debit)")?).context("unknown method")?;

    let payment = engine.record_payment(&id, currency, method)?;
    println!("Payment {} pending: {} {}", payment.id, payment.amount, payment.currency);

    let event = match prompt("provider outcome (completed/failed)")?.as_str() {
        "completed" => PaymentEvent::Completed(id.clone()),
        _ => PaymentEvent::Failed(id.clone()),
    };
    engine.handle_payment_event(event, operator)?;
    println!("Order {} is now {}", id, engine.order(&id)?.status);
    Ok(())
}

fn advance_order(engine: &mut DispatchEngine, operator: &str) -> anyhow::Result<()> {
    let id = OrderId::new(prompt("order id")?);
    match prompt("step (process/deliver)")?.as_str() {
        "process" => engine.start_processing(&id, operator)?,
        "deliver" => engine.confirm_delivery(&id, operator)?,
        other => anyhow::bail!("unknown step: {other}"),
    }
    println!("Order {} is now {}", id, engine.order(&id)?.status);
    Ok(())
}

fn cancel_order(engine: &mut DispatchEngine, operator: &str) -> anyhow::Result<()> {
    let id = OrderId::new(prompt("order id")?);
    engine.cancel(&id, operator)?;
    println!("Order {id} canceled");
    Ok(())
}

fn payment_history(engine: &DispatchEngine) -> anyhow::Result<()> {
    let id = OrderId::new(prompt("order id")?);
    for payment in engine.payments().history_for_order(&id) {
        println!(
            "{}  {:?}  {} {}  {:?}  {}",
            payment.id, payment.status, payment.amount, payment.currency, payment.method,
            payment.recorded_at
        );
    }
    Ok(())
}

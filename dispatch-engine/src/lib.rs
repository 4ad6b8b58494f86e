//! Freightline Dispatch Engine
//!
//! Order–vehicle assignment and status lifecycle orchestration on top of
//! `fleet-core`. The engine owns the order book and keeps orders, items,
//! vehicles and payments mutually consistent: every operation validates
//! before it mutates, so a failure leaves all entities unchanged.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms, unused_qualifications)]

pub mod engine;

// The engine surfaces the core's error kinds unchanged
pub use fleet_core::{Error, Result};

pub use engine::{DispatchEngine, PaymentEvent};

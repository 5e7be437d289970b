//! # Integration Tests
//!
//! Delivery properties of the bus, checked against real subscribers with
//! bounded waits.

pub mod fan_out;

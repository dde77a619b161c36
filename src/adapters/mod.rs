//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `postgres` - Repository implementations over sqlx
//! - `memory` - In-process repositories
//! - `http` - axum routes for health and webhook delivery
//! - `clock` - System and fixed clocks

pub mod clock;
pub mod http;
pub mod memory;
pub mod postgres;

pub use clock::{FixedClock, SystemClock};

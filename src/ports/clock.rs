//! Clock port.
//!
//! Period arithmetic depends on "now", so handlers take the time from an
//! injected clock rather than reading the system time directly.

use crate::domain::foundation::Timestamp;

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

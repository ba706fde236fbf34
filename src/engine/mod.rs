mod conflict;
mod error;
mod mutations;
mod queries;

pub use conflict::{
    Decision, REASON_GUEST_ALREADY_BOOKED, REASON_SAME_GUEST_SAME_UNIT, REASON_UNIT_OCCUPIED,
};
pub use error::DeskError;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::store::BookingStore;

/// The front desk: admission rules plus the check-then-mutate sequences for
/// creating and extending bookings. Holds no booking state of its own — all
/// reads and writes go through the injected store.
pub struct Desk {
    store: Arc<dyn BookingStore>,
    /// Held across every check-then-write sequence so two concurrent
    /// requests cannot both pass the checks before either write lands.
    /// Desk-wide, not unit-scoped: the single-occupancy rule spans units.
    gate: Mutex<()>,
}

impl Desk {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self {
            store,
            gate: Mutex::new(()),
        }
    }
}

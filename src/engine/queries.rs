use ulid::Ulid;

use crate::model::Booking;

use super::{Desk, DeskError};

impl Desk {
    /// Point lookup. No rules run on reads.
    pub async fn booking(&self, id: Ulid) -> Result<Option<Booking>, DeskError> {
        Ok(self.store.find_by_id(id).await?)
    }

    /// All bookings on a unit, ordered by check-in date.
    pub async fn unit_bookings(&self, unit_id: &str) -> Result<Vec<Booking>, DeskError> {
        let mut bookings = self.store.find_by_unit(unit_id).await?;
        bookings.sort_by_key(|b| b.check_in);
        Ok(bookings)
    }
}

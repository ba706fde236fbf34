use chrono::Days;
use tracing::{debug, info};
use ulid::Ulid;

use crate::limits::MAX_NIGHTS;
use crate::model::{Booking, BookingDraft};
use crate::observability;

use super::conflict::{
    check_new_booking, validate_additional_nights, validate_draft, Decision, REASON_UNIT_OCCUPIED,
};
use super::{Desk, DeskError};

impl Desk {
    /// Admit and persist a new booking, or refuse it with the failing rule's
    /// reason. The gate is held from the first rule query until the insert
    /// has landed.
    pub async fn create_booking(&self, draft: BookingDraft) -> Result<Booking, DeskError> {
        validate_draft(&draft)?;

        let _gate = self.gate.lock().await;
        match check_new_booking(self.store.as_ref(), &draft).await? {
            Decision::Admit => {}
            Decision::Reject(reason) => {
                debug!(
                    guest = %draft.guest_name,
                    unit = %draft.unit_id,
                    "booking refused: {reason}"
                );
                metrics::counter!(observability::REJECTIONS_TOTAL).increment(1);
                return Err(DeskError::Rejected(reason));
            }
        }

        let booking = self.store.insert(draft).await?;
        metrics::counter!(observability::ADMISSIONS_TOTAL).increment(1);
        info!(
            id = %booking.id,
            guest = %booking.guest_name,
            unit = %booking.unit_id,
            check_in = %booking.check_in,
            nights = booking.nights,
            "booking created"
        );
        Ok(booking)
    }

    /// Lengthen an existing stay without moving its check-in date. The
    /// conflict probe is an equality check on the updated night count with a
    /// check-in cutoff at the updated departure — deliberately narrow, kept
    /// for behavioral parity with the established service.
    pub async fn extend_booking(
        &self,
        id: Ulid,
        additional_nights: u32,
    ) -> Result<Booking, DeskError> {
        validate_additional_nights(additional_nights)?;

        let _gate = self.gate.lock().await;
        let existing = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(DeskError::NotFound(id))?;

        let updated_nights = existing.nights + additional_nights;
        if updated_nights > MAX_NIGHTS {
            return Err(DeskError::LimitExceeded("too many nights"));
        }
        let updated_end = existing.check_in + Days::new(u64::from(updated_nights));

        if let Some(clash) = self
            .store
            .find_conflicting_extension(&existing.unit_id, updated_end, updated_nights, id)
            .await?
        {
            debug!(id = %id, clash = %clash.id, "extension refused");
            metrics::counter!(observability::REJECTIONS_TOTAL).increment(1);
            return Err(DeskError::Rejected(REASON_UNIT_OCCUPIED));
        }

        let updated = self
            .store
            .update_nights(id, updated_nights)
            .await?
            .ok_or(DeskError::NotFound(id))?;
        info!(id = %updated.id, nights = updated.nights, "booking extended");
        Ok(updated)
    }
}

use crate::limits::*;
use crate::model::BookingDraft;
use crate::store::{BookingStore, StoreError};

use super::DeskError;

pub const REASON_SAME_GUEST_SAME_UNIT: &str =
    "The given guest name cannot book the same unit multiple times";
pub const REASON_GUEST_ALREADY_BOOKED: &str =
    "The same guest cannot be in multiple units at the same time";
pub const REASON_UNIT_OCCUPIED: &str = "For the given check-in date, the unit is already occupied";

/// Outcome of the admission rules for a candidate booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Admit,
    Reject(&'static str),
}

impl Decision {
    pub fn admitted(self) -> bool {
        matches!(self, Decision::Admit)
    }

    pub fn reason(self) -> &'static str {
        match self {
            Decision::Admit => "OK",
            Decision::Reject(reason) => reason,
        }
    }
}

/// Run the admission rules for a new booking, in order, first failure wins.
/// Reads only — the caller decides whether to insert.
///
/// Rule 3 tests each existing stay's forward extent against the candidate's
/// check-in date (`Booking::blocks_check_in`); the candidate's own departure
/// date is never tested against later stays.
pub(super) async fn check_new_booking(
    store: &dyn BookingStore,
    draft: &BookingDraft,
) -> Result<Decision, StoreError> {
    // Rule 1: the same guest cannot book the same unit twice.
    let repeat = store
        .find_by_guest_and_unit(&draft.guest_name, &draft.unit_id)
        .await?;
    if !repeat.is_empty() {
        return Ok(Decision::Reject(REASON_SAME_GUEST_SAME_UNIT));
    }

    // Rule 2: a guest holds at most one booking, anywhere.
    let elsewhere = store.find_by_guest(&draft.guest_name).await?;
    if !elsewhere.is_empty() {
        return Ok(Decision::Reject(REASON_GUEST_ALREADY_BOOKED));
    }

    // Rule 3: the check-in date must clear every existing stay on the unit.
    let on_unit = store.find_by_unit(&draft.unit_id).await?;
    if on_unit.iter().any(|b| b.blocks_check_in(draft.check_in)) {
        return Ok(Decision::Reject(REASON_UNIT_OCCUPIED));
    }

    Ok(Decision::Admit)
}

pub(super) fn validate_draft(draft: &BookingDraft) -> Result<(), DeskError> {
    if draft.guest_name.is_empty() {
        return Err(DeskError::InvalidInput("guestName must not be empty"));
    }
    if draft.unit_id.is_empty() {
        return Err(DeskError::InvalidInput("unitID must not be empty"));
    }
    if draft.nights == 0 {
        return Err(DeskError::InvalidInput("numberOfNights must be positive"));
    }
    if draft.guest_name.len() > MAX_GUEST_NAME_LEN {
        return Err(DeskError::LimitExceeded("guest name too long"));
    }
    if draft.unit_id.len() > MAX_UNIT_ID_LEN {
        return Err(DeskError::LimitExceeded("unit id too long"));
    }
    if draft.nights > MAX_NIGHTS {
        return Err(DeskError::LimitExceeded("too many nights"));
    }
    Ok(())
}

pub(super) fn validate_additional_nights(additional_nights: u32) -> Result<(), DeskError> {
    if additional_nights == 0 {
        return Err(DeskError::InvalidInput("additionalNights must be positive"));
    }
    if additional_nights > MAX_NIGHTS {
        return Err(DeskError::LimitExceeded("too many nights"));
    }
    Ok(())
}

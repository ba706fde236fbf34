use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// A confirmed reservation: one guest occupying one unit for the half-open
/// day range `[check_in, check_in + nights)`.
///
/// Wire field names (`guestName`, `unitID`, ...) are the established external
/// shape of this service and are kept stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Ulid,
    #[serde(rename = "guestName")]
    pub guest_name: String,
    #[serde(rename = "unitID")]
    pub unit_id: String,
    #[serde(rename = "checkInDate", deserialize_with = "de_calendar_date")]
    pub check_in: NaiveDate,
    #[serde(rename = "numberOfNights")]
    pub nights: u32,
}

/// A candidate booking — everything except the store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDraft {
    #[serde(rename = "guestName")]
    pub guest_name: String,
    #[serde(rename = "unitID")]
    pub unit_id: String,
    #[serde(rename = "checkInDate", deserialize_with = "de_calendar_date")]
    pub check_in: NaiveDate,
    #[serde(rename = "numberOfNights")]
    pub nights: u32,
}

impl Booking {
    /// First day the unit is free again — the end of the half-open interval.
    pub fn departure(&self) -> NaiveDate {
        self.check_in + Days::new(u64::from(self.nights))
    }

    /// Occupancy test against a candidate check-in: clashes when the signed
    /// day distance from this booking's check-in does not exceed this
    /// booking's night count. Only the forward extent of the existing stay
    /// is tested; the candidate's own departure never is.
    pub fn blocks_check_in(&self, check_in: NaiveDate) -> bool {
        whole_days_between(self.check_in, check_in) <= i64::from(self.nights)
    }
}

/// Signed duration-based day count, `candidate` minus `existing`, fractional
/// days truncated.
pub fn whole_days_between(existing: NaiveDate, candidate: NaiveDate) -> i64 {
    candidate.signed_duration_since(existing).num_days()
}

/// Parse a calendar date from either a plain `YYYY-MM-DD` or an RFC 3339
/// timestamp. Any time-of-day is dropped — bookings operate in whole days.
pub fn parse_calendar_date(raw: &str) -> Result<NaiveDate, String> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .map_err(|e| format!("invalid date {raw:?}: {e}"))
}

fn de_calendar_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_calendar_date(&raw).map_err(serde::de::Error::custom)
}

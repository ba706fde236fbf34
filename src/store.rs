use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use ulid::Ulid;

use crate::model::{Booking, BookingDraft};

/// Failure at the store layer: backend unreachable, write refused. Fatal for
/// the request that hit it; never retried here.
#[derive(Debug)]
pub struct StoreError(pub String);

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "store error: {}", self.0)
    }
}

impl std::error::Error for StoreError {}

/// Query primitives the desk needs from a booking backend. Implementations
/// must provide read-your-writes within a single request.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn find_by_guest_and_unit(
        &self,
        guest_name: &str,
        unit_id: &str,
    ) -> Result<Vec<Booking>, StoreError>;

    async fn find_by_guest(&self, guest_name: &str) -> Result<Vec<Booking>, StoreError>;

    async fn find_by_unit(&self, unit_id: &str) -> Result<Vec<Booking>, StoreError>;

    async fn find_by_id(&self, id: Ulid) -> Result<Option<Booking>, StoreError>;

    /// Extension conflict probe: a booking on `unit_id` whose check-in is at
    /// or before `max_check_in` and whose night count equals `nights`,
    /// excluding the booking being extended.
    async fn find_conflicting_extension(
        &self,
        unit_id: &str,
        max_check_in: NaiveDate,
        nights: u32,
        exclude: Ulid,
    ) -> Result<Option<Booking>, StoreError>;

    /// Persist a draft, assigning its id.
    async fn insert(&self, draft: BookingDraft) -> Result<Booking, StoreError>;

    /// Set the night count of an existing booking. `None` if the id is
    /// unknown.
    async fn update_nights(&self, id: Ulid, nights: u32) -> Result<Option<Booking>, StoreError>;
}

/// In-memory store: primary map plus guest/unit indexes.
pub struct MemoryStore {
    bookings: DashMap<Ulid, Booking>,
    by_guest: DashMap<String, Vec<Ulid>>,
    by_unit: DashMap<String, Vec<Ulid>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            bookings: DashMap::new(),
            by_guest: DashMap::new(),
            by_unit: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    fn collect(&self, ids: Option<dashmap::mapref::one::Ref<'_, String, Vec<Ulid>>>) -> Vec<Booking> {
        let Some(ids) = ids else { return Vec::new() };
        ids.iter()
            .filter_map(|id| self.bookings.get(id).map(|e| e.value().clone()))
            .collect()
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn find_by_guest_and_unit(
        &self,
        guest_name: &str,
        unit_id: &str,
    ) -> Result<Vec<Booking>, StoreError> {
        let mut matches = self.collect(self.by_guest.get(guest_name));
        matches.retain(|b| b.unit_id == unit_id);
        Ok(matches)
    }

    async fn find_by_guest(&self, guest_name: &str) -> Result<Vec<Booking>, StoreError> {
        Ok(self.collect(self.by_guest.get(guest_name)))
    }

    async fn find_by_unit(&self, unit_id: &str) -> Result<Vec<Booking>, StoreError> {
        Ok(self.collect(self.by_unit.get(unit_id)))
    }

    async fn find_by_id(&self, id: Ulid) -> Result<Option<Booking>, StoreError> {
        Ok(self.bookings.get(&id).map(|e| e.value().clone()))
    }

    async fn find_conflicting_extension(
        &self,
        unit_id: &str,
        max_check_in: NaiveDate,
        nights: u32,
        exclude: Ulid,
    ) -> Result<Option<Booking>, StoreError> {
        let on_unit = self.collect(self.by_unit.get(unit_id));
        Ok(on_unit
            .into_iter()
            .find(|b| b.id != exclude && b.check_in <= max_check_in && b.nights == nights))
    }

    async fn insert(&self, draft: BookingDraft) -> Result<Booking, StoreError> {
        let booking = Booking {
            id: Ulid::new(),
            guest_name: draft.guest_name,
            unit_id: draft.unit_id,
            check_in: draft.check_in,
            nights: draft.nights,
        };
        self.by_guest
            .entry(booking.guest_name.clone())
            .or_default()
            .push(booking.id);
        self.by_unit
            .entry(booking.unit_id.clone())
            .or_default()
            .push(booking.id);
        self.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn update_nights(&self, id: Ulid, nights: u32) -> Result<Option<Booking>, StoreError> {
        let Some(mut entry) = self.bookings.get_mut(&id) else {
            return Ok(None);
        };
        entry.nights = nights;
        Ok(Some(entry.value().clone()))
    }
}

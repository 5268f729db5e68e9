use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use transit_shared::models::Booking;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Booking id already stored: {0}")]
    DuplicateBookingId(String),

    #[error("Payment reference already stored: {0}")]
    DuplicatePaymentReference(String),
}

/// In-memory booking table keyed by booking id.
///
/// Every record sits behind its own mutex so read-modify-write sequences on one
/// booking serialize without blocking the rest of the table. Two secondary
/// indexes are kept beside the primary map:
/// - payment reference → booking id, written together with the record
/// - transaction id → booking id, claimed once per transaction
///
/// Lock order is records → references for inserts; lookups never hold one
/// index while taking another. Record mutexes may be held while claiming a
/// transaction, never the other way round.
#[derive(Debug, Default)]
pub struct BookingStore {
    records: RwLock<HashMap<String, Arc<Mutex<Booking>>>>,
    references: RwLock<HashMap<String, String>>,
    transactions: Mutex<HashMap<String, String>>,
}

impl BookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fully formed booking. The record and its reference index entry
    /// become visible together or not at all.
    pub fn insert(&self, booking: Booking) -> Result<(), StoreError> {
        let mut records = write(&self.records);
        let mut references = write(&self.references);

        if records.contains_key(&booking.id) {
            return Err(StoreError::DuplicateBookingId(booking.id));
        }
        if references.contains_key(&booking.payment_reference) {
            return Err(StoreError::DuplicatePaymentReference(booking.payment_reference));
        }

        references.insert(booking.payment_reference.clone(), booking.id.clone());
        records.insert(booking.id.clone(), Arc::new(Mutex::new(booking)));
        Ok(())
    }

    /// Snapshot of one booking.
    pub fn get(&self, booking_id: &str) -> Option<Booking> {
        let entry = self.entry(booking_id)?;
        let booking = lock(&entry).clone();
        Some(booking)
    }

    pub fn id_for_reference(&self, payment_reference: &str) -> Option<String> {
        read(&self.references).get(payment_reference).cloned()
    }

    /// Atomic read-modify-write of one booking.
    ///
    /// `f` works on a copy while the record lock is held; the copy replaces the
    /// stored record only when `f` returns `Ok`. Returns `None` when the id is
    /// unknown.
    pub fn update<T, E, F>(&self, booking_id: &str, f: F) -> Option<Result<T, E>>
    where
        F: FnOnce(&mut Booking) -> Result<T, E>,
    {
        let entry = self.entry(booking_id)?;
        let mut stored = lock(&entry);

        let mut draft = stored.clone();
        let outcome = f(&mut draft);
        if outcome.is_ok() {
            *stored = draft;
        }
        Some(outcome)
    }

    /// Bind `transaction_id` to `booking_id`. Fails with the current owner when
    /// the transaction is already bound to a booking.
    pub fn claim_transaction(&self, transaction_id: &str, booking_id: &str) -> Result<(), String> {
        let mut transactions = lock(&self.transactions);
        match transactions.get(transaction_id) {
            Some(owner) => Err(owner.clone()),
            None => {
                transactions.insert(transaction_id.to_string(), booking_id.to_string());
                Ok(())
            }
        }
    }

    fn entry(&self, booking_id: &str) -> Option<Arc<Mutex<Booking>>> {
        read(&self.records).get(booking_id).cloned()
    }
}

// Records are only ever replaced wholesale from a draft, so a poisoned lock
// still guards a consistent value.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

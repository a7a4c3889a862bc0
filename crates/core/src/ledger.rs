//! The appointment slot ledger.
//!
//! This module tracks which template slots are booked for each
//! `(doctor, date)` pair and derives open slots on demand:
//!
//! ```text
//! available(doctor, date) = template(doctor, weekday(date)) − booked(doctor, date)
//! ```
//!
//! in template order. Booked sets are created implicitly on first booking and
//! are never deleted — a fully cancelled day legitimately becomes an empty,
//! still-addressable entry.
//!
//! ## Mutation discipline
//!
//! All of `book`/`cancel` runs under the ledger write lock as one atomic
//! section: read current booked set, validate, mutate, persist. Because every
//! successful mutation rewrites the whole persisted document, the whole-ledger
//! lock is also the smallest unit that serialises the file write; it subsumes
//! the per-key exclusion the booking contract requires, so two concurrent
//! requests for the same slot can never both pass validation. Reads share the
//! read lock and always observe a consistent snapshot.
//!
//! ## Failure semantics
//!
//! Business rejections (already booked, not available, no booking found) are
//! ordinary [`BookingOutcome`] values, never errors. The only `Err` a
//! mutation can produce is a storage fault, in which case the in-memory
//! change is rolled back before the error propagates — the ledger never
//! reports success for a booking that was not durably written.

use crate::directory::DoctorDirectory;
use crate::error::AppointmentResult;
use crate::store::{BookingStore, LedgerSnapshot};
use chrono::NaiveDate;
use medibook_types::SlotTime;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Composite key addressing one doctor's booked set for one calendar date.
///
/// Persisted as `"{doctorId}-{date}"` with an ISO `YYYY-MM-DD` date suffix.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct SlotKey {
    pub doctor_id: String,
    pub date: NaiveDate,
}

impl SlotKey {
    pub fn new(doctor_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            doctor_id: doctor_id.into(),
            date,
        }
    }

    /// Parses the persisted `"{doctorId}-{date}"` form.
    ///
    /// Doctor identifiers may themselves contain `-`, so the date is taken
    /// from the fixed-width ISO suffix rather than by splitting on the first
    /// separator.
    pub fn parse(raw: &str) -> Option<Self> {
        const DATE_LEN: usize = "2024-03-18".len();

        if raw.len() < DATE_LEN + 2 {
            return None;
        }
        // `get` rejects a split that lands inside a multibyte character.
        let split = raw.len() - DATE_LEN;
        let date_str = raw.get(split..)?;
        let doctor_id = raw[..split].strip_suffix('-')?;
        if doctor_id.is_empty() {
            return None;
        }
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()?;

        Some(Self::new(doctor_id, date))
    }
}

impl std::fmt::Display for SlotKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.doctor_id, self.date.format("%Y-%m-%d"))
    }
}

/// Outcome of a booking or cancellation attempt.
///
/// Both acceptance and rejection are normal returns distinguished by the
/// `success` flag; the message is the human-readable reason shown to the
/// booking UI.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct BookingOutcome {
    pub success: bool,
    pub message: String,
}

impl BookingOutcome {
    fn accepted(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_owned(),
        }
    }

    fn rejected(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_owned(),
        }
    }
}

/// One doctor's open slots for a date, as returned by the availability fan-out.
#[derive(Clone, Debug, serde::Serialize)]
pub struct DoctorDaySlots {
    pub name: String,
    pub specialty: String,
    pub qualification: String,
    pub slots: Vec<SlotTime>,
}

/// Availability derivation plus book/cancel mutations with durable persistence.
pub struct SlotLedger {
    directory: Arc<DoctorDirectory>,
    store: Box<dyn BookingStore>,
    booked: RwLock<BTreeMap<SlotKey, Vec<SlotTime>>>,
}

impl SlotLedger {
    /// Creates a ledger over the given directory and store, loading any
    /// previously persisted booked sets.
    ///
    /// Persisted entries whose key does not parse are skipped with a warning
    /// rather than failing startup; duplicate times within an entry are
    /// collapsed so the no-double-count invariant holds from the first read.
    ///
    /// # Errors
    ///
    /// Returns `AppointmentError` if the store itself cannot be read.
    pub fn open(
        directory: Arc<DoctorDirectory>,
        store: Box<dyn BookingStore>,
    ) -> AppointmentResult<Self> {
        let snapshot = store.load()?;

        let mut booked = BTreeMap::new();
        for (raw_key, mut times) in snapshot {
            let Some(key) = SlotKey::parse(&raw_key) else {
                tracing::warn!("skipping unparseable ledger key {:?}", raw_key);
                continue;
            };

            let mut seen = Vec::with_capacity(times.len());
            times.retain(|t| {
                let fresh = !seen.contains(t);
                if fresh {
                    seen.push(t.clone());
                }
                fresh
            });

            booked.insert(key, times);
        }

        Ok(Self {
            directory,
            store,
            booked: RwLock::new(booked),
        })
    }

    /// Open slots for one doctor on one date: the weekday template minus the
    /// booked set, in template order.
    ///
    /// An unknown doctor or a weekday with no template entry yields an empty
    /// sequence rather than an error, matching the lenient lookup the booking
    /// UI expects.
    pub fn available_slots(&self, doctor_id: &str, date: NaiveDate) -> Vec<SlotTime> {
        let booked = self.read_booked();
        self.available_slots_locked(&booked, doctor_id, date)
    }

    /// Availability against an already-locked map, shared by reads (under the
    /// read lock) and mutations (under the write lock).
    fn available_slots_locked(
        &self,
        booked: &BTreeMap<SlotKey, Vec<SlotTime>>,
        doctor_id: &str,
        date: NaiveDate,
    ) -> Vec<SlotTime> {
        let Some(doctor) = self.directory.lookup_by_id(doctor_id) else {
            return Vec::new();
        };

        let key = SlotKey::new(doctor_id, date);
        let taken = booked.get(&key).map(Vec::as_slice).unwrap_or(&[]);

        doctor
            .template_for(date)
            .iter()
            .filter(|slot| !taken.contains(slot))
            .cloned()
            .collect()
    }

    /// Open slots for every doctor in the directory on one date.
    ///
    /// Pure read over the full directory; all doctors are reported, including
    /// those with nothing open that day. A single read lock spans the fan-out
    /// so the result is one consistent snapshot.
    pub fn all_available_slots(&self, date: NaiveDate) -> BTreeMap<String, DoctorDaySlots> {
        let booked = self.read_booked();

        self.directory
            .list_all()
            .iter()
            .map(|doctor| {
                (
                    doctor.id.clone(),
                    DoctorDaySlots {
                        name: doctor.name.clone(),
                        specialty: doctor.specialty.clone(),
                        qualification: doctor.qualification.clone(),
                        slots: self.available_slots_locked(&booked, &doctor.id, date),
                    },
                )
            })
            .collect()
    }

    /// Books one slot for `(doctor_id, date)`.
    ///
    /// Preconditions are checked in order, first failure wins: a repeat
    /// booking of an already-booked slot is always rejected (never silently
    /// accepted), then the slot must be currently available — which also
    /// covers unknown doctors, weekdays without a template, and times outside
    /// the template.
    ///
    /// # Errors
    ///
    /// Returns `AppointmentError` only when persisting the ledger fails; the
    /// in-memory booking is rolled back first.
    pub fn book(
        &self,
        doctor_id: &str,
        date: NaiveDate,
        time: &SlotTime,
    ) -> AppointmentResult<BookingOutcome> {
        let mut booked = self.write_booked();
        let key = SlotKey::new(doctor_id, date);

        let current = booked.get(&key).map(Vec::as_slice).unwrap_or(&[]);
        if current.contains(time) {
            return Ok(BookingOutcome::rejected("This slot is already booked"));
        }

        let open = self.available_slots_locked(&booked, doctor_id, date);
        if !open.contains(time) {
            return Ok(BookingOutcome::rejected("This slot is not available"));
        }

        let created = !booked.contains_key(&key);
        booked.entry(key.clone()).or_default().push(time.clone());

        if let Err(e) = self.persist(&booked) {
            if created {
                booked.remove(&key);
            } else if let Some(times) = booked.get_mut(&key) {
                times.retain(|t| t != time);
            }
            return Err(e);
        }

        tracing::info!("booked {} on {} at {}", doctor_id, date, time);
        Ok(BookingOutcome::accepted("Slot booked successfully"))
    }

    /// Cancels one booked slot for `(doctor_id, date)`.
    ///
    /// The booked set may become empty; the entry is retained so the key
    /// stays addressable.
    ///
    /// # Errors
    ///
    /// Returns `AppointmentError` only when persisting the ledger fails; the
    /// in-memory cancellation is rolled back first.
    pub fn cancel(
        &self,
        doctor_id: &str,
        date: NaiveDate,
        time: &SlotTime,
    ) -> AppointmentResult<BookingOutcome> {
        let mut booked = self.write_booked();
        let key = SlotKey::new(doctor_id, date);

        let Some(position) = booked
            .get(&key)
            .and_then(|times| times.iter().position(|t| t == time))
        else {
            return Ok(BookingOutcome::rejected("No booking found for this slot"));
        };

        if let Some(times) = booked.get_mut(&key) {
            times.remove(position);
        }

        if let Err(e) = self.persist(&booked) {
            if let Some(times) = booked.get_mut(&key) {
                times.insert(position, time.clone());
            }
            return Err(e);
        }

        tracing::info!("cancelled {} on {} at {}", doctor_id, date, time);
        Ok(BookingOutcome::accepted("Booking cancelled successfully"))
    }

    /// All non-empty booked sets for one doctor, in date order.
    ///
    /// Used by the doctor portal to show a clinician their booked
    /// appointments straight from the ledger.
    pub fn bookings_for_doctor(&self, doctor_id: &str) -> Vec<(NaiveDate, Vec<SlotTime>)> {
        let booked = self.read_booked();

        booked
            .iter()
            .filter(|(key, times)| key.doctor_id == doctor_id && !times.is_empty())
            .map(|(key, times)| (key.date, times.clone()))
            .collect()
    }

    fn persist(&self, booked: &BTreeMap<SlotKey, Vec<SlotTime>>) -> AppointmentResult<()> {
        let snapshot: LedgerSnapshot = booked
            .iter()
            .map(|(key, times)| (key.to_string(), times.clone()))
            .collect();
        self.store.save_all(&snapshot)
    }

    // A poisoned lock only means another thread panicked while holding it;
    // mutations never leave the map half-updated (the rollback paths restore
    // it), so recovering the guard is sound.
    fn read_booked(&self) -> RwLockReadGuard<'_, BTreeMap<SlotKey, Vec<SlotTime>>> {
        self.booked
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_booked(&self) -> RwLockWriteGuard<'_, BTreeMap<SlotKey, Vec<SlotTime>>> {
        self.booked
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

//! Constants used throughout the MediBook core crate.
//!
//! This module contains all path and filename constants to ensure
//! consistency across the codebase and make maintenance easier.

/// Default directory for appointment data storage when no explicit directory is configured.
pub const DEFAULT_APPOINTMENT_DATA_DIR: &str = "appointment_data";

/// Filename for the persisted booking ledger document.
pub const BOOKED_SLOTS_FILE: &str = "booked_slots.json";

/// Filename for the doctor directory document.
pub const DOCTOR_DIRECTORY_FILE: &str = "doctors.json";

/// Weekday names in the order produced by a Sunday-first day index, matching
/// the lowercase keys used in doctor availability templates.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "sunday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];

//! # MediBook Core
//!
//! Core business logic for the MediBook appointment-booking system.
//!
//! This crate contains pure data operations and persistence:
//! - Doctor directory loading and lookup (static reference data)
//! - Slot availability derivation from weekly templates
//! - Book/cancel mutations against the appointment slot ledger
//! - Durable ledger persistence behind the [`BookingStore`] trait
//!
//! **No API concerns**: HTTP servers, routing, or request/response shapes
//! belong in `api-rest`.

pub mod config;
pub mod constants;
pub mod directory;
pub mod error;
pub mod ledger;
pub mod store;

pub use config::{resolve_doctor_directory_file, CoreConfig};
pub use directory::{weekday_name, DoctorDirectory, DoctorProfile};
pub use error::{AppointmentError, AppointmentResult};
pub use ledger::{BookingOutcome, DoctorDaySlots, SlotKey, SlotLedger};
pub use store::{BookingStore, JsonFileStore, LedgerSnapshot};

pub use medibook_types::{NonEmptyText, SlotTime};

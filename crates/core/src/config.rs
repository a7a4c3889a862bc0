//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. The intent is to avoid reading process-wide environment variables
//! during request handling, which can lead to inconsistent behaviour in multi-threaded runtimes
//! and test harnesses.

use crate::constants::{BOOKED_SLOTS_FILE, DOCTOR_DIRECTORY_FILE};
use crate::{AppointmentError, AppointmentResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    appointment_data_dir: PathBuf,
    doctor_directory_file: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(
        appointment_data_dir: PathBuf,
        doctor_directory_file: PathBuf,
    ) -> AppointmentResult<Self> {
        if !doctor_directory_file.is_file() {
            return Err(AppointmentError::InvalidInput(format!(
                "doctor directory file does not exist: {}",
                doctor_directory_file.display()
            )));
        }

        Ok(Self {
            appointment_data_dir,
            doctor_directory_file,
        })
    }

    pub fn appointment_data_dir(&self) -> &Path {
        &self.appointment_data_dir
    }

    pub fn doctor_directory_file(&self) -> &Path {
        &self.doctor_directory_file
    }

    /// Path of the persisted booking ledger document.
    pub fn booked_slots_path(&self) -> PathBuf {
        self.appointment_data_dir.join(BOOKED_SLOTS_FILE)
    }
}

/// Resolve the doctor directory file without reading environment variables.
///
/// If `override_file` is provided, it must be an existing file. Otherwise this searches for
/// `doctors.json` relative to the current working directory and then walks up from
/// `CARGO_MANIFEST_DIR`.
pub fn resolve_doctor_directory_file(override_file: Option<PathBuf>) -> AppointmentResult<PathBuf> {
    if let Some(file) = override_file {
        if file.is_file() {
            return Ok(file);
        }
        return Err(AppointmentError::InvalidInput(format!(
            "MEDIBOOK_DOCTOR_FILE override is not a file: {}",
            file.display()
        )));
    }

    let cwd_relative = PathBuf::from(DOCTOR_DIRECTORY_FILE);
    if cwd_relative.is_file() {
        return Ok(cwd_relative);
    }

    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    for ancestor in manifest_dir.ancestors() {
        let candidate = ancestor.join(DOCTOR_DIRECTORY_FILE);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    Err(AppointmentError::InvalidInput(format!(
        "could not locate {DOCTOR_DIRECTORY_FILE}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_new_rejects_missing_doctor_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let err = CoreConfig::new(
            temp_dir.path().to_path_buf(),
            temp_dir.path().join("doctors.json"),
        )
        .expect_err("missing doctor file should be rejected");

        assert!(matches!(err, AppointmentError::InvalidInput(_)));
    }

    #[test]
    fn test_booked_slots_path_is_under_data_dir() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let doctor_file = temp_dir.path().join("doctors.json");
        fs::write(&doctor_file, r#"{"doctors":[]}"#).expect("should write doctor file");

        let cfg = CoreConfig::new(temp_dir.path().to_path_buf(), doctor_file)
            .expect("CoreConfig::new should succeed");

        assert_eq!(
            cfg.booked_slots_path(),
            temp_dir.path().join(BOOKED_SLOTS_FILE)
        );
    }

    #[test]
    fn test_resolve_override_must_exist() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let err = resolve_doctor_directory_file(Some(temp_dir.path().join("nope.json")))
            .expect_err("missing override should be rejected");

        assert!(matches!(err, AppointmentError::InvalidInput(_)));
    }

    #[test]
    fn test_resolve_accepts_existing_override() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let doctor_file = temp_dir.path().join("doctors.json");
        fs::write(&doctor_file, r#"{"doctors":[]}"#).expect("should write doctor file");

        let resolved = resolve_doctor_directory_file(Some(doctor_file.clone()))
            .expect("existing override should resolve");
        assert_eq!(resolved, doctor_file);
    }
}

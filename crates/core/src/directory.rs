//! Static doctor reference data.
//!
//! The doctor directory is a flat JSON document loaded once at process start:
//!
//! ```json
//! {
//!   "doctors": [
//!     {
//!       "id": "doc1",
//!       "name": "Dr. Sarah Smith",
//!       "specialty": "Cardiology",
//!       "qualification": "MD, FACC",
//!       "password": "secret",
//!       "availability": { "monday": ["09:00", "10:00"] }
//!     }
//!   ]
//! }
//! ```
//!
//! The directory is immutable reference data: the booking ledger borrows it
//! and never writes to it. Availability values are the weekly **template** —
//! the full set of slots a doctor could ever be open for on that weekday,
//! independent of any calendar date.

use crate::constants::WEEKDAY_NAMES;
use crate::error::{AppointmentError, AppointmentResult};
use chrono::{Datelike, NaiveDate};
use medibook_types::SlotTime;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// A single doctor record from the directory document.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct DoctorProfile {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub qualification: String,
    /// Portal login credential. Never serialized back out; API responses
    /// must go through [`DoctorProfile::public`]-style projections.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    /// Weekly availability template keyed by lowercase weekday name.
    #[serde(default)]
    pub availability: HashMap<String, Vec<SlotTime>>,
}

impl DoctorProfile {
    /// Returns the availability template for the weekday of `date`.
    ///
    /// A weekday with no template entry yields an empty slice.
    pub fn template_for(&self, date: NaiveDate) -> &[SlotTime] {
        self.availability
            .get(weekday_name(date))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Maps a calendar date to the lowercase weekday name used as a template key,
/// via the fixed Sunday-first table.
pub fn weekday_name(date: NaiveDate) -> &'static str {
    WEEKDAY_NAMES[date.weekday().num_days_from_sunday() as usize]
}

/// Wire shape of the directory document.
#[derive(serde::Deserialize)]
struct DirectoryDocument {
    doctors: Vec<DoctorProfile>,
}

/// Immutable collection of doctor profiles, loaded once at startup.
#[derive(Clone, Debug, Default)]
pub struct DoctorDirectory {
    doctors: Vec<DoctorProfile>,
}

impl DoctorDirectory {
    /// Loads the directory from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns `AppointmentError` if the file cannot be read or parsed. A
    /// missing or malformed directory is fatal at startup — the service has
    /// no doctors to book against without it.
    pub fn load(path: &Path) -> AppointmentResult<Self> {
        let contents = fs::read_to_string(path).map_err(AppointmentError::DirectoryRead)?;
        let document: DirectoryDocument =
            serde_json::from_str(&contents).map_err(AppointmentError::DirectoryParse)?;

        tracing::info!(
            "loaded {} doctors from {}",
            document.doctors.len(),
            path.display()
        );

        Ok(Self {
            doctors: document.doctors,
        })
    }

    /// Builds a directory from already-parsed profiles.
    pub fn from_profiles(doctors: Vec<DoctorProfile>) -> Self {
        Self { doctors }
    }

    /// Looks up a doctor by its opaque identifier.
    pub fn lookup_by_id(&self, id: &str) -> Option<&DoctorProfile> {
        self.doctors.iter().find(|d| d.id == id)
    }

    /// Returns every doctor in directory order.
    pub fn list_all(&self) -> &[DoctorProfile] {
        &self.doctors
    }

    /// Checks portal credentials, returning the matching doctor.
    ///
    /// Both the identifier and the password must match exactly. Doctors
    /// without a configured password can never authenticate.
    pub fn authenticate(&self, id: &str, password: &str) -> Option<&DoctorProfile> {
        self.doctors
            .iter()
            .find(|d| d.id == id && d.password.as_deref() == Some(password))
    }

    /// Filters doctors by specialty substring and free-text search.
    ///
    /// Both filters are case-insensitive; the free-text term matches against
    /// name, specialty and qualification. Empty filters match everything.
    pub fn search(&self, specialty: &str, term: &str) -> Vec<&DoctorProfile> {
        let specialty = specialty.to_lowercase();
        let term = term.to_lowercase();

        self.doctors
            .iter()
            .filter(|d| specialty.is_empty() || d.specialty.to_lowercase().contains(&specialty))
            .filter(|d| {
                term.is_empty()
                    || d.name.to_lowercase().contains(&term)
                    || d.specialty.to_lowercase().contains(&term)
                    || d.qualification.to_lowercase().contains(&term)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn slot(s: &str) -> SlotTime {
        SlotTime::parse(s).expect("test slot should parse")
    }

    fn sample_profiles() -> Vec<DoctorProfile> {
        vec![
            DoctorProfile {
                id: "doc1".into(),
                name: "Dr. Sarah Smith".into(),
                specialty: "Cardiology".into(),
                qualification: "MD, FACC".into(),
                password: Some("heartbeat".into()),
                availability: HashMap::from([("monday".to_string(), vec![
                    slot("09:00"),
                    slot("10:00"),
                ])]),
            },
            DoctorProfile {
                id: "doc2".into(),
                name: "Dr. James Lee".into(),
                specialty: "Dermatology".into(),
                qualification: "MD".into(),
                password: None,
                availability: HashMap::new(),
            },
        ]
    }

    #[test]
    fn test_load_parses_directory_document() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("doctors.json");
        fs::write(
            &path,
            r#"{
              "doctors": [
                {
                  "id": "doc1",
                  "name": "Dr. Sarah Smith",
                  "specialty": "Cardiology",
                  "qualification": "MD, FACC",
                  "password": "heartbeat",
                  "availability": { "monday": ["09:00", "10:00"] }
                }
              ]
            }"#,
        )
        .expect("should write directory document");

        let directory = DoctorDirectory::load(&path).expect("load should succeed");
        assert_eq!(directory.list_all().len(), 1);

        let doctor = directory.lookup_by_id("doc1").expect("doc1 should exist");
        assert_eq!(doctor.name, "Dr. Sarah Smith");
        assert_eq!(
            doctor.availability.get("monday"),
            Some(&vec![slot("09:00"), slot("10:00")])
        );
    }

    #[test]
    fn test_load_rejects_malformed_document() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("doctors.json");
        fs::write(&path, "{ not json").expect("should write file");

        let err = DoctorDirectory::load(&path).expect_err("malformed document should fail");
        assert!(matches!(err, AppointmentError::DirectoryParse(_)));
    }

    #[test]
    fn test_load_rejects_template_with_invalid_slot_time() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("doctors.json");
        fs::write(
            &path,
            r#"{"doctors":[{"id":"doc1","name":"n","specialty":"s","qualification":"q","availability":{"monday":["9am"]}}]}"#,
        )
        .expect("should write file");

        let err = DoctorDirectory::load(&path).expect_err("invalid slot time should fail");
        assert!(matches!(err, AppointmentError::DirectoryParse(_)));
    }

    #[test]
    fn test_lookup_by_id_misses_unknown_doctor() {
        let directory = DoctorDirectory::from_profiles(sample_profiles());
        assert!(directory.lookup_by_id("nonexistent").is_none());
    }

    #[test]
    fn test_authenticate_requires_exact_credentials() {
        let directory = DoctorDirectory::from_profiles(sample_profiles());

        assert!(directory.authenticate("doc1", "heartbeat").is_some());
        assert!(directory.authenticate("doc1", "wrong").is_none());
        // No configured password means no portal access.
        assert!(directory.authenticate("doc2", "").is_none());
    }

    #[test]
    fn test_search_filters_case_insensitively() {
        let directory = DoctorDirectory::from_profiles(sample_profiles());

        let cardiologists = directory.search("cardio", "");
        assert_eq!(cardiologists.len(), 1);
        assert_eq!(cardiologists[0].id, "doc1");

        let by_name = directory.search("", "james");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, "doc2");

        let everyone = directory.search("", "");
        assert_eq!(everyone.len(), 2);
    }

    #[test]
    fn test_weekday_name_uses_sunday_first_table() {
        // 2024-03-17 is a Sunday, 2024-03-18 a Monday.
        let sunday = NaiveDate::from_ymd_opt(2024, 3, 17).unwrap();
        let monday = NaiveDate::from_ymd_opt(2024, 3, 18).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2024, 3, 23).unwrap();

        assert_eq!(weekday_name(sunday), "sunday");
        assert_eq!(weekday_name(monday), "monday");
        assert_eq!(weekday_name(saturday), "saturday");
    }

    #[test]
    fn test_template_for_absent_weekday_is_empty() {
        let profiles = sample_profiles();
        let tuesday = NaiveDate::from_ymd_opt(2024, 3, 19).unwrap();
        assert!(profiles[0].template_for(tuesday).is_empty());

        let monday = NaiveDate::from_ymd_opt(2024, 3, 18).unwrap();
        assert_eq!(
            profiles[0].template_for(monday),
            &[slot("09:00"), slot("10:00")]
        );
    }
}

//! # API REST
//!
//! REST API implementation for MediBook.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status mapping)
//!
//! Business rules live in `medibook-core`; this crate only translates HTTP
//! requests into ledger/directory calls and maps outcomes to status codes:
//! booking rejections become `409 Conflict`, cancellation rejections
//! `404 Not Found`, malformed input `400 Bad Request`, and storage faults an
//! opaque `500`.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use medibook_core::{
    constants::DEFAULT_APPOINTMENT_DATA_DIR, resolve_doctor_directory_file, CoreConfig,
    DoctorDirectory, DoctorProfile, JsonFileStore, NonEmptyText, SlotLedger, SlotTime,
};

/// Application state shared across REST API handlers.
///
/// Contains the doctor directory (immutable reference data) and the slot
/// ledger (the single shared mutable structure, internally synchronised).
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<DoctorDirectory>,
    pub ledger: Arc<SlotLedger>,
}

impl AppState {
    pub fn new(directory: Arc<DoctorDirectory>, ledger: Arc<SlotLedger>) -> Self {
        Self { directory, ledger }
    }
}

/// Builds application state from process environment variables.
///
/// Called once from `main` so request handlers never read the environment.
///
/// # Environment Variables
/// - `MEDIBOOK_DATA_DIR`: Directory for the persisted ledger (default: "appointment_data")
/// - `MEDIBOOK_DOCTOR_FILE`: Doctor directory document (default: search for "doctors.json")
///
/// # Errors
/// Returns an error if the doctor directory cannot be located or parsed, or
/// the persisted ledger document exists but cannot be read.
pub fn state_from_env() -> anyhow::Result<AppState> {
    let data_dir = std::env::var("MEDIBOOK_DATA_DIR")
        .unwrap_or_else(|_| DEFAULT_APPOINTMENT_DATA_DIR.into());

    let doctor_file_override = std::env::var("MEDIBOOK_DOCTOR_FILE").ok().map(PathBuf::from);
    let doctor_file = resolve_doctor_directory_file(doctor_file_override)?;

    let cfg = CoreConfig::new(PathBuf::from(data_dir), doctor_file)?;

    let directory = Arc::new(DoctorDirectory::load(cfg.doctor_directory_file())?);
    let store = JsonFileStore::new(cfg.booked_slots_path());
    let ledger = Arc::new(SlotLedger::open(directory.clone(), Box::new(store))?);

    Ok(AppState::new(directory, ledger))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        available_slots,
        book_appointment,
        cancel_appointment,
        list_doctors,
        doctor_login,
    ),
    components(schemas(
        HealthRes,
        AvailableSlotsRes,
        DoctorSlotsRes,
        BookAppointmentReq,
        BookAppointmentRes,
        BookingOutcomeRes,
        CancelAppointmentReq,
        DoctorsRes,
        DoctorsData,
        DoctorSummaryRes,
        PaginationRes,
        FiltersRes,
        DoctorLoginReq,
        DoctorLoginRes,
        DoctorPublicRes,
        DoctorBookingRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router over the given state.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/available-slots", get(available_slots))
        .route("/api/book-appointment", post(book_appointment))
        .route("/api/cancel-appointment", post(cancel_appointment))
        .route("/api/doctors", get(list_doctors))
        .route("/api/doctor/login", post(doctor_login))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// REQUEST / RESPONSE SHAPES
// ============================================================================

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(serde::Deserialize, utoipa::IntoParams)]
pub struct AvailableSlotsQuery {
    /// ISO date (`YYYY-MM-DD`). Defaults to today (UTC).
    pub date: Option<String>,
}

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct DoctorSlotsRes {
    pub name: String,
    pub specialty: String,
    pub qualification: String,
    pub slots: Vec<String>,
}

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct AvailableSlotsRes {
    pub available_slots: BTreeMap<String, DoctorSlotsRes>,
}

/// Outcome envelope for booking/cancellation results and input errors.
#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct BookingOutcomeRes {
    pub success: bool,
    pub message: String,
}

impl BookingOutcomeRes {
    fn failure(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_owned(),
        }
    }
}

impl From<medibook_core::BookingOutcome> for BookingOutcomeRes {
    fn from(outcome: medibook_core::BookingOutcome) -> Self {
        Self {
            success: outcome.success,
            message: outcome.message,
        }
    }
}

#[derive(serde::Deserialize, utoipa::ToSchema)]
pub struct BookAppointmentReq {
    #[serde(rename = "doctorId")]
    pub doctor_id: String,
    pub date: String,
    pub time: String,
    /// Patient details (name, email, phone, reason, ...). Opaque
    /// pass-through: echoed back on success, never validated or stored.
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub patient_details: serde_json::Map<String, serde_json::Value>,
}

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct BookAppointmentRes {
    pub success: bool,
    pub message: String,
    #[schema(value_type = Object)]
    pub appointment: serde_json::Value,
}

#[derive(serde::Deserialize, utoipa::ToSchema)]
pub struct CancelAppointmentReq {
    #[serde(rename = "doctorId")]
    pub doctor_id: String,
    pub date: String,
    pub time: String,
}

#[derive(serde::Deserialize, utoipa::IntoParams)]
pub struct DoctorsQuery {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub specialty: String,
    #[serde(default)]
    pub search: String,
}

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    10
}

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct DoctorSummaryRes {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub qualification: String,
    pub available_today: bool,
    pub next_available_slot: Option<String>,
    pub total_slots_today: usize,
}

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct PaginationRes {
    pub total_doctors: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub limit: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct FiltersRes {
    pub specialty: String,
    pub search: String,
}

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct DoctorsData {
    pub doctors: Vec<DoctorSummaryRes>,
    pub pagination: PaginationRes,
    pub filters: FiltersRes,
}

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct DoctorsRes {
    pub success: bool,
    pub data: DoctorsData,
}

#[derive(serde::Deserialize, utoipa::ToSchema)]
pub struct DoctorLoginReq {
    #[serde(rename = "doctorId")]
    pub doctor_id: String,
    pub password: String,
}

/// Doctor profile as exposed to portal clients: no password, no template.
#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct DoctorPublicRes {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub qualification: String,
}

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct DoctorBookingRes {
    pub date: String,
    pub times: Vec<String>,
}

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct DoctorLoginRes {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor: Option<DoctorPublicRes>,
    pub appointments: Vec<DoctorBookingRes>,
}

// ============================================================================
// HANDLERS
// ============================================================================

type Rejection = (StatusCode, Json<BookingOutcomeRes>);

fn bad_request(message: &str) -> Rejection {
    (
        StatusCode::BAD_REQUEST,
        Json(BookingOutcomeRes::failure(message)),
    )
}

/// A required body field: present with at least one non-whitespace character.
fn require_field(raw: &str) -> Result<NonEmptyText, Rejection> {
    NonEmptyText::new(raw).map_err(|_| bad_request("Missing required fields"))
}

fn parse_date(raw: &str) -> Result<NaiveDate, Rejection> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| bad_request("Invalid date, expected YYYY-MM-DD"))
}

fn parse_time(raw: &str) -> Result<SlotTime, Rejection> {
    SlotTime::parse(raw).map_err(|_| bad_request("Invalid time, expected HH:MM"))
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Returns the current health status of the MediBook REST API service.
/// This endpoint is used for monitoring and load balancer health checks.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "MediBook REST API is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/api/available-slots",
    params(AvailableSlotsQuery),
    responses(
        (status = 200, description = "Open slots per doctor for the requested date", body = AvailableSlotsRes),
        (status = 400, description = "Malformed date", body = BookingOutcomeRes)
    )
)]
/// Available slots for every doctor on a date
///
/// Fans out over the whole doctor directory and derives each doctor's open
/// slots for the requested date (template minus booked set). Doctors with
/// nothing open that day are still listed with an empty slot array.
///
/// # Errors
/// Returns `400 Bad Request` if the `date` query parameter is present but not
/// a valid `YYYY-MM-DD` calendar date.
#[axum::debug_handler]
async fn available_slots(
    State(state): State<AppState>,
    Query(query): Query<AvailableSlotsQuery>,
) -> Result<Json<AvailableSlotsRes>, Rejection> {
    let date = match query.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => chrono::Utc::now().date_naive(),
    };

    let available_slots = state
        .ledger
        .all_available_slots(date)
        .into_iter()
        .map(|(doctor_id, day)| {
            (
                doctor_id,
                DoctorSlotsRes {
                    name: day.name,
                    specialty: day.specialty,
                    qualification: day.qualification,
                    slots: day.slots.iter().map(ToString::to_string).collect(),
                },
            )
        })
        .collect();

    Ok(Json(AvailableSlotsRes { available_slots }))
}

#[utoipa::path(
    post,
    path = "/api/book-appointment",
    request_body = BookAppointmentReq,
    responses(
        (status = 200, description = "Appointment booked", body = BookAppointmentRes),
        (status = 400, description = "Missing or malformed fields", body = BookingOutcomeRes),
        (status = 409, description = "Slot already booked or not available", body = BookingOutcomeRes),
        (status = 500, description = "Internal server error")
    )
)]
/// Book an appointment slot
///
/// Books one `(doctor, date, time)` slot through the ledger. Extra fields in
/// the request body are treated as opaque patient details and echoed back in
/// the confirmation, never stored.
///
/// # Errors
/// - `400 Bad Request` when a required field is missing/blank or the date or
///   time does not parse.
/// - `409 Conflict` when the slot is already booked or not in the doctor's
///   template for that weekday (which also covers unknown doctors).
/// - `500 Internal Server Error` when the ledger cannot be persisted; the
///   booking is not recorded in that case.
#[axum::debug_handler]
async fn book_appointment(
    State(state): State<AppState>,
    Json(req): Json<BookAppointmentReq>,
) -> Result<Json<BookAppointmentRes>, Rejection> {
    let doctor_id = require_field(&req.doctor_id)?;
    let date = parse_date(require_field(&req.date)?.as_str())?;
    let time = parse_time(require_field(&req.time)?.as_str())?;

    let outcome = match state.ledger.book(doctor_id.as_str(), date, &time) {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Book slot error: {:?}", e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(BookingOutcomeRes::failure("Internal error")),
            ));
        }
    };

    if !outcome.success {
        return Err((StatusCode::CONFLICT, Json(outcome.into())));
    }

    // Echo the canonical forms, not whatever whitespace the client sent.
    let mut appointment = serde_json::Map::new();
    appointment.insert("doctorId".into(), doctor_id.to_string().into());
    appointment.insert("date".into(), date.format("%Y-%m-%d").to_string().into());
    appointment.insert("time".into(), time.to_string().into());
    appointment.extend(req.patient_details);

    Ok(Json(BookAppointmentRes {
        success: true,
        message: "Appointment booked successfully".into(),
        appointment: serde_json::Value::Object(appointment),
    }))
}

#[utoipa::path(
    post,
    path = "/api/cancel-appointment",
    request_body = CancelAppointmentReq,
    responses(
        (status = 200, description = "Booking cancelled", body = BookingOutcomeRes),
        (status = 400, description = "Missing or malformed fields", body = BookingOutcomeRes),
        (status = 404, description = "No booking found for this slot", body = BookingOutcomeRes),
        (status = 500, description = "Internal server error")
    )
)]
/// Cancel a booked appointment slot
///
/// # Errors
/// - `400 Bad Request` when a required field is missing/blank or malformed.
/// - `404 Not Found` when no booking exists for `(doctor, date, time)`.
/// - `500 Internal Server Error` when the ledger cannot be persisted; the
///   booking remains in place in that case.
#[axum::debug_handler]
async fn cancel_appointment(
    State(state): State<AppState>,
    Json(req): Json<CancelAppointmentReq>,
) -> Result<Json<BookingOutcomeRes>, Rejection> {
    let doctor_id = require_field(&req.doctor_id)?;
    let date = parse_date(require_field(&req.date)?.as_str())?;
    let time = parse_time(require_field(&req.time)?.as_str())?;

    let outcome = match state.ledger.cancel(doctor_id.as_str(), date, &time) {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Cancel slot error: {:?}", e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(BookingOutcomeRes::failure("Internal error")),
            ));
        }
    };

    if !outcome.success {
        return Err((StatusCode::NOT_FOUND, Json(outcome.into())));
    }

    Ok(Json(outcome.into()))
}

#[utoipa::path(
    get,
    path = "/api/doctors",
    params(DoctorsQuery),
    responses(
        (status = 200, description = "Paginated doctor listing", body = DoctorsRes)
    )
)]
/// List doctors with filters, pagination and today's availability
///
/// Filters by specialty substring and a free-text term (name, specialty,
/// qualification), both case-insensitive, then paginates and decorates each
/// doctor with their open-slot summary for today.
#[axum::debug_handler]
async fn list_doctors(
    State(state): State<AppState>,
    Query(query): Query<DoctorsQuery>,
) -> Json<DoctorsRes> {
    let filtered = state.directory.search(&query.specialty, &query.search);

    let limit = query.limit.max(1);
    let page = query.page.max(1);
    let total_doctors = filtered.len();
    let total_pages = total_doctors.div_ceil(limit);
    // Saturate so an absurd page/limit pair lands past the end, not in a
    // multiplication overflow.
    let start = (page - 1).saturating_mul(limit);

    let today = chrono::Utc::now().date_naive();
    let doctors = filtered
        .iter()
        .skip(start)
        .take(limit)
        .map(|doctor| summarise(doctor, &state, today))
        .collect();

    Json(DoctorsRes {
        success: true,
        data: DoctorsData {
            doctors,
            pagination: PaginationRes {
                total_doctors,
                total_pages,
                current_page: page,
                limit,
                has_next: start.saturating_add(limit) < total_doctors,
                has_previous: start > 0,
            },
            filters: FiltersRes {
                specialty: query.specialty,
                search: query.search,
            },
        },
    })
}

fn summarise(doctor: &DoctorProfile, state: &AppState, today: NaiveDate) -> DoctorSummaryRes {
    let open_today = state.ledger.available_slots(&doctor.id, today);

    DoctorSummaryRes {
        id: doctor.id.clone(),
        name: doctor.name.clone(),
        specialty: doctor.specialty.clone(),
        qualification: doctor.qualification.clone(),
        available_today: !open_today.is_empty(),
        next_available_slot: open_today.first().map(ToString::to_string),
        total_slots_today: open_today.len(),
    }
}

#[utoipa::path(
    post,
    path = "/api/doctor/login",
    request_body = DoctorLoginReq,
    responses(
        (status = 200, description = "Login result with the doctor's booked appointments", body = DoctorLoginRes)
    )
)]
/// Doctor portal login
///
/// Checks credentials against the doctor directory. A failed login is a
/// normal `200` response with `success: false`, matching the booking UI's
/// expectations. On success the response carries the doctor's public profile
/// and their booked appointments straight from the ledger.
#[axum::debug_handler]
async fn doctor_login(
    State(state): State<AppState>,
    Json(req): Json<DoctorLoginReq>,
) -> Json<DoctorLoginRes> {
    let Some(doctor) = state.directory.authenticate(&req.doctor_id, &req.password) else {
        tracing::warn!("failed portal login for {:?}", req.doctor_id);
        return Json(DoctorLoginRes {
            success: false,
            message: Some("Invalid credentials".into()),
            session_id: None,
            doctor: None,
            appointments: Vec::new(),
        });
    };

    let appointments = state
        .ledger
        .bookings_for_doctor(&doctor.id)
        .into_iter()
        .map(|(date, times)| DoctorBookingRes {
            date: date.format("%Y-%m-%d").to_string(),
            times: times.iter().map(ToString::to_string).collect(),
        })
        .collect();

    Json(DoctorLoginRes {
        success: true,
        message: None,
        session_id: Some(uuid::Uuid::new_v4().to_string()),
        doctor: Some(DoctorPublicRes {
            id: doctor.id.clone(),
            name: doctor.name.clone(),
            specialty: doctor.specialty.clone(),
            qualification: doctor.qualification.clone(),
        }),
        appointments,
    })
}

//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! This binary is useful for development and debugging when you only want the REST server (with
//! OpenAPI/Swagger UI). The workspace's main `medibook-run` binary is the deployment entry point.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the MediBook REST API server
///
/// Starts the REST API server on the configured address (default: 0.0.0.0:3000).
/// Provides HTTP endpoints for slot availability, booking and cancellation,
/// doctor listing and the doctor portal login, with OpenAPI/Swagger docs.
///
/// # Environment Variables
/// - `MEDIBOOK_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `MEDIBOOK_DATA_DIR`: Directory for the persisted ledger (default: "appointment_data")
/// - `MEDIBOOK_DOCTOR_FILE`: Doctor directory document (default: search for "doctors.json")
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the doctor directory or persisted ledger cannot be loaded,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("medibook_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("MEDIBOOK_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("-- Starting MediBook REST API on {}", addr);

    let state = api_rest::state_from_env()?;
    let app = api_rest::app(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

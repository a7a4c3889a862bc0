//! Deployment entry point for the MediBook appointment-booking backend.
//!
//! Loads the doctor directory and the persisted booking ledger, then serves
//! the REST API. The standalone `medibook-api-rest` binary in
//! `crates/api-rest` does the same without reading a `.env` file; this one is
//! the default-run target for deployments.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the MediBook application
///
/// # Environment Variables
/// - `MEDIBOOK_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `MEDIBOOK_DATA_DIR`: Directory for the persisted ledger (default: "appointment_data")
/// - `MEDIBOOK_DOCTOR_FILE`: Doctor directory document (default: search for "doctors.json")
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If startup or runtime fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("medibook=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("MEDIBOOK_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("++ Starting MediBook REST on {}", rest_addr);

    let state = api_rest::state_from_env()?;
    let app = api_rest::app(state);

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

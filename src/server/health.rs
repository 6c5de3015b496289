//! Liveness probe.

use axum::extract::State;
use axum::http::StatusCode;

use super::AppState;

/// `GET /health`: 200 "OK" once the store can be read.
///
/// Taking the read lock means a writer stuck mid-transaction shows up as a
/// hanging probe rather than a false "OK".
pub async fn health_handler(State(app): State<AppState>) -> (StatusCode, &'static str) {
    let _tables = app.store().read().await;
    (StatusCode::OK, "OK")
}

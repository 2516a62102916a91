//! Per-endpoint request handlers.

mod accounts;
mod export;
mod patients;

use axum::Json;
use serde_json::json;

pub use accounts::{login, register};
pub use export::export_patient_csv;
pub use patients::{
    add_patient, delete_patient, get_patient, list_patients, update_diagnosis, update_patient,
};

/// GET /healthz - Liveness probe.
pub async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

//! Patient handlers.
//!
//! Receptionists manage demographics (create, update name/age/gender,
//! delete); doctors manage the diagnosis field through a separate update
//! endpoint. Every successful write stamps `created_by` with the caller.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use clinic_api::ApiError;
use clinic_auth::AuthenticatedUser;
use clinic_storage::{NewPatient, Patient, PatientQuery};

use crate::server::AppState;

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 20;

/// Deserializes a field so that a present key, even with a JSON null,
/// becomes `Some(..)`, while a missing key stays `None` (via
/// `#[serde(default)]`). Used to reject receptionist payloads that carry a
/// `diagnosis` key at all.
fn explicit_field<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

fn parse_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(inner)| inner)
        .map_err(|_| ApiError::bad_request("invalid request body"))
}

// =============================================================================
// Request types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct AddPatientRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: i32,
    #[serde(default)]
    pub gender: String,
    #[serde(default, deserialize_with = "explicit_field")]
    pub diagnosis: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePatientRequest {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "explicit_field")]
    pub diagnosis: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDiagnosisRequest {
    #[serde(default)]
    pub diagnosis: String,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub name: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /api/receptionist/patients - Add a patient.
///
/// Receptionists cannot set a diagnosis: the mere presence of the field
/// is rejected, whatever its value. The record is stored with a null
/// diagnosis and `created_by` set to the caller.
pub async fn add_patient(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    body: Result<Json<AddPatientRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = parse_body(body)?;

    if req.name.is_empty() {
        return Err(ApiError::bad_request("patient name is required"));
    }
    if req.age <= 0 {
        return Err(ApiError::bad_request(
            "patient age must be a positive number",
        ));
    }
    if req.gender.is_empty() {
        return Err(ApiError::bad_request("patient gender is required"));
    }
    if req.diagnosis.is_some() {
        return Err(ApiError::bad_request(
            "receptionists cannot set patient diagnosis; diagnosis is added by doctors",
        ));
    }

    let patient = state
        .patients
        .add_patient(NewPatient {
            name: req.name,
            age: req.age,
            gender: req.gender,
            created_by: caller.id,
        })
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    tracing::info!(patient_id = %patient.id, created_by = %caller.id, "patient added");

    Ok((StatusCode::CREATED, Json(patient)))
}

/// GET /api/{role}/patients - List patients.
///
/// Optional case-insensitive name filter plus page/limit pagination;
/// non-positive values fall back to the defaults (1/20).
pub async fn list_patients(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = match params.page {
        Some(p) if p > 0 => p,
        _ => DEFAULT_PAGE,
    };
    let limit = match params.limit {
        Some(l) if l > 0 => l,
        _ => DEFAULT_LIMIT,
    };

    // An absurdly large page must yield an empty list, not an overflow.
    let query = PatientQuery {
        name: params.name,
        limit,
        offset: (page - 1).saturating_mul(limit),
    };

    let patients = state
        .patients
        .list_patients(&query)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(Json(patients))
}

/// GET /api/{role}/patients/{id} - Read a patient.
pub async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Patient>, ApiError> {
    let patient = state
        .patients
        .get_patient(id)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("patient details not found"))?;

    Ok(Json(patient))
}

/// PUT /api/receptionist/patients/{id} - Update patient demographics.
///
/// All of name/age/gender must be present; the diagnosis field must be
/// absent — receptionists can never touch it, not even to clear it.
/// `created_by` is overwritten with the caller.
pub async fn update_patient(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(id): Path<Uuid>,
    body: Result<Json<UpdatePatientRequest>, JsonRejection>,
) -> Result<Json<Patient>, ApiError> {
    let req = parse_body(body)?;

    if req.diagnosis.is_some() {
        return Err(ApiError::bad_request(
            "receptionists cannot update patient diagnosis; diagnosis can only be updated by doctors",
        ));
    }

    let mut patient = state
        .patients
        .get_patient(id)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("patient details not found"))?;

    match req.name {
        Some(name) => patient.name = name,
        None => return Err(ApiError::bad_request("patient name is required for update")),
    }
    match req.age {
        Some(age) if age > 0 => patient.age = age,
        Some(_) => {
            return Err(ApiError::bad_request(
                "patient age must be a positive number",
            ));
        }
        None => return Err(ApiError::bad_request("patient age is required for update")),
    }
    match req.gender {
        Some(gender) => patient.gender = gender,
        None => {
            return Err(ApiError::bad_request(
                "patient gender is required for update",
            ));
        }
    }
    patient.created_by = caller.id;

    let updated = state
        .patients
        .update_patient(&patient)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;
    if !updated {
        return Err(ApiError::not_found("patient details not found"));
    }

    tracing::info!(patient_id = %patient.id, updated_by = %caller.id, "patient updated");

    Ok(Json(patient))
}

/// PUT /api/doctor/patients/{id} - Update the diagnosis.
///
/// Only the diagnosis changes; demographics are left untouched.
/// `created_by` is overwritten with the doctor performing the update.
pub async fn update_diagnosis(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(id): Path<Uuid>,
    body: Result<Json<UpdateDiagnosisRequest>, JsonRejection>,
) -> Result<Json<Patient>, ApiError> {
    let req = parse_body(body)?;

    if req.diagnosis.is_empty() {
        return Err(ApiError::bad_request(
            "diagnosis field is required for update",
        ));
    }

    let mut patient = state
        .patients
        .get_patient(id)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("patient details not found"))?;

    patient.diagnosis = Some(req.diagnosis);
    patient.created_by = caller.id;

    let updated = state
        .patients
        .update_patient(&patient)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;
    if !updated {
        return Err(ApiError::not_found("patient details not found"));
    }

    tracing::info!(patient_id = %patient.id, updated_by = %caller.id, "diagnosis updated");

    Ok(Json(patient))
}

/// DELETE /api/receptionist/patients/{id} - Delete a patient.
///
/// Deleting an already-deleted id reports 404, not success.
pub async fn delete_patient(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let deleted = state
        .patients
        .delete_patient(id)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;
    if !deleted {
        return Err(ApiError::not_found("patient details not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}

//! CSV export handler.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, header};
use axum::response::IntoResponse;
use uuid::Uuid;

use clinic_api::ApiError;
use clinic_storage::Patient;

use crate::server::AppState;

/// GET /api/{role}/patients/{id}/export/csv - Export one patient as CSV.
///
/// Two rows: a header and the record, with an empty Diagnosis cell when
/// none has been recorded. Served as a `text/csv` attachment.
pub async fn export_patient_csv(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let patient = state
        .patients
        .get_patient(id)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("patient details not found"))?;

    let body = render_csv(&patient).map_err(|e| ApiError::internal(e.to_string()))?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/csv"));
    let disposition = format!("attachment; filename=\"patient_{}.csv\"", patient.id);
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .map_err(|e| ApiError::internal(e.to_string()))?,
    );

    Ok((headers, body))
}

fn render_csv(patient: &Patient) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(["ID", "Name", "Age", "Gender", "Diagnosis", "Created By"])?;
    writer.write_record([
        patient.id.to_string(),
        patient.name.clone(),
        patient.age.to_string(),
        patient.gender.clone(),
        patient.diagnosis.clone().unwrap_or_default(),
        patient.created_by.to_string(),
    ])?;

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(std::io::Error::other(e.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_patient(diagnosis: Option<&str>) -> Patient {
        Patient {
            id: Uuid::nil(),
            name: "Jane".into(),
            age: 30,
            gender: "F".into(),
            diagnosis: diagnosis.map(String::from),
            created_by: Uuid::nil(),
        }
    }

    #[test]
    fn csv_has_header_and_one_data_row() {
        let bytes = render_csv(&sample_patient(Some("flu"))).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "ID,Name,Age,Gender,Diagnosis,Created By");
        assert!(lines[1].contains("Jane,30,F,flu"));
    }

    #[test]
    fn null_diagnosis_renders_as_empty_cell() {
        let bytes = render_csv(&sample_patient(None)).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let data_row = text.lines().nth(1).unwrap();
        assert!(data_row.contains("Jane,30,F,,"));
    }
}

//! Patient record storage.

use async_trait::async_trait;
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use sqlx_postgres::PgPool;
use uuid::Uuid;

use clinic_storage::{NewPatient, Patient, PatientQuery, PatientStore, StorageError};

type PatientTuple = (Uuid, String, i32, String, Option<String>, Uuid);

fn patient_from_tuple(row: PatientTuple) -> Patient {
    Patient {
        id: row.0,
        name: row.1,
        age: row.2,
        gender: row.3,
        diagnosis: row.4,
        created_by: row.5,
    }
}

/// PostgreSQL implementation of [`PatientStore`].
pub struct PgPatientStore {
    pool: PgPool,
}

impl PgPatientStore {
    /// Creates a new patient store over the given pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PatientStore for PgPatientStore {
    async fn add_patient(&self, patient: NewPatient) -> Result<Patient, StorageError> {
        let row: PatientTuple = query_as(
            r#"
            INSERT INTO patients (name, age, gender, diagnosis, created_by)
            VALUES ($1, $2, $3, NULL, $4)
            RETURNING id, name, age, gender, diagnosis, created_by
            "#,
        )
        .bind(&patient.name)
        .bind(patient.age)
        .bind(&patient.gender)
        .bind(patient.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StorageError::internal(format!("failed to add patient: {e}")))?;

        Ok(patient_from_tuple(row))
    }

    async fn list_patients(&self, q: &PatientQuery) -> Result<Vec<Patient>, StorageError> {
        // Empty filter matches everything, so one query covers both cases.
        let name = q.name.as_deref().unwrap_or("");
        let rows: Vec<PatientTuple> = query_as(
            r#"
            SELECT id, name, age, gender, diagnosis, created_by
            FROM patients
            WHERE ($1 = '' OR name ILIKE '%' || $1 || '%')
            ORDER BY name ASC, id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(name)
        .bind(q.limit)
        .bind(q.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::internal(format!("failed to list patients: {e}")))?;

        Ok(rows.into_iter().map(patient_from_tuple).collect())
    }

    async fn get_patient(&self, id: Uuid) -> Result<Option<Patient>, StorageError> {
        let row: Option<PatientTuple> = query_as(
            r#"
            SELECT id, name, age, gender, diagnosis, created_by
            FROM patients
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::internal(format!("failed to read patient: {e}")))?;

        Ok(row.map(patient_from_tuple))
    }

    async fn update_patient(&self, patient: &Patient) -> Result<bool, StorageError> {
        let result = query(
            r#"
            UPDATE patients
            SET name = $2, age = $3, gender = $4, diagnosis = $5, created_by = $6
            WHERE id = $1
            "#,
        )
        .bind(patient.id)
        .bind(&patient.name)
        .bind(patient.age)
        .bind(&patient.gender)
        .bind(&patient.diagnosis)
        .bind(patient.created_by)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::internal(format!("failed to update patient: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_patient(&self, id: Uuid) -> Result<bool, StorageError> {
        let result = query("DELETE FROM patients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::internal(format!("failed to delete patient: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}

//! In-memory storage backend.
//!
//! Backs the integration tests and local experimentation. Both stores keep
//! rows in a `RwLock<HashMap>`; no lock is held across an await point.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StorageError;
use crate::traits::{AccountStore, PatientStore};
use crate::types::{NewPatient, NewUser, Patient, PatientQuery, User};

/// In-memory implementation of [`AccountStore`].
#[derive(Default)]
pub struct InMemoryAccountStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryAccountStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StorageError> {
        let mut users = self
            .users
            .write()
            .map_err(|_| StorageError::internal("account store lock poisoned"))?;

        // Mirrors the relational unique constraint on email.
        if users.values().any(|u| u.email == user.email) {
            return Err(StorageError::internal(format!(
                "duplicate key value violates unique constraint \"users_email_key\": {}",
                user.email
            )));
        }

        let stored = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
        };
        users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let users = self
            .users
            .read()
            .map_err(|_| StorageError::internal("account store lock poisoned"))?;
        Ok(users.values().find(|u| u.email == email).cloned())
    }
}

/// In-memory implementation of [`PatientStore`].
#[derive(Default)]
pub struct InMemoryPatientStore {
    patients: RwLock<HashMap<Uuid, Patient>>,
}

impl InMemoryPatientStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PatientStore for InMemoryPatientStore {
    async fn add_patient(&self, patient: NewPatient) -> Result<Patient, StorageError> {
        let mut patients = self
            .patients
            .write()
            .map_err(|_| StorageError::internal("patient store lock poisoned"))?;

        let stored = Patient {
            id: Uuid::new_v4(),
            name: patient.name,
            age: patient.age,
            gender: patient.gender,
            diagnosis: None,
            created_by: patient.created_by,
        };
        patients.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn list_patients(&self, query: &PatientQuery) -> Result<Vec<Patient>, StorageError> {
        let patients = self
            .patients
            .read()
            .map_err(|_| StorageError::internal("patient store lock poisoned"))?;

        let needle = query.name.as_deref().unwrap_or("").to_lowercase();
        let mut rows: Vec<Patient> = patients
            .values()
            .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();

        rows.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

        let offset = usize::try_from(query.offset).unwrap_or(0);
        let limit = usize::try_from(query.limit).unwrap_or(0);
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    async fn get_patient(&self, id: Uuid) -> Result<Option<Patient>, StorageError> {
        let patients = self
            .patients
            .read()
            .map_err(|_| StorageError::internal("patient store lock poisoned"))?;
        Ok(patients.get(&id).cloned())
    }

    async fn update_patient(&self, patient: &Patient) -> Result<bool, StorageError> {
        let mut patients = self
            .patients
            .write()
            .map_err(|_| StorageError::internal("patient store lock poisoned"))?;
        match patients.get_mut(&patient.id) {
            Some(existing) => {
                *existing = patient.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_patient(&self, id: Uuid) -> Result<bool, StorageError> {
        let mut patients = self
            .patients
            .write()
            .map_err(|_| StorageError::internal("patient store lock poisoned"))?;
        Ok(patients.remove(&id).is_some())
    }
}

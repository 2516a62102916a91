//! Storage traits for the clinic portal.
//!
//! Two narrow interfaces are consumed by the handlers: one for user
//! accounts, one for patient records. Implementations must be
//! thread-safe (`Send + Sync`).

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StorageError;
use crate::types::{NewPatient, NewUser, Patient, PatientQuery, User};

/// Storage for user accounts.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Creates a user account and returns the stored row with its
    /// generated identifier.
    ///
    /// # Errors
    ///
    /// A duplicate email surfaces as `StorageError::Internal` carrying the
    /// backend's error text; there is no dedicated duplicate-key variant.
    async fn create_user(&self, user: NewUser) -> Result<User, StorageError>;

    /// Looks up a user by email (the login key).
    ///
    /// Returns `None` if no account matches.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues, not for a missing
    /// account.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StorageError>;
}

/// Storage for patient records.
#[async_trait]
pub trait PatientStore: Send + Sync {
    /// Inserts a patient record with a null diagnosis and returns the
    /// stored row with its generated identifier.
    async fn add_patient(&self, patient: NewPatient) -> Result<Patient, StorageError>;

    /// Lists patients matching the query.
    ///
    /// The optional name filter is a case-insensitive substring match.
    /// Results are ordered by name ascending, then id ascending as a
    /// stable tie-break.
    async fn list_patients(&self, query: &PatientQuery) -> Result<Vec<Patient>, StorageError>;

    /// Reads a patient by id. Returns `None` if no row matches.
    async fn get_patient(&self, id: Uuid) -> Result<Option<Patient>, StorageError>;

    /// Overwrites the full patient row.
    ///
    /// Returns `false` if no row matched the patient's id.
    async fn update_patient(&self, patient: &Patient) -> Result<bool, StorageError>;

    /// Deletes a patient by id.
    ///
    /// Returns `false` if no row was affected, so repeated deletes of the
    /// same id report the miss instead of succeeding silently.
    async fn delete_patient(&self, id: Uuid) -> Result<bool, StorageError>;
}

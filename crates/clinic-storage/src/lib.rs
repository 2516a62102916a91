//! Storage abstraction for the clinic portal.
//!
//! Defines the domain types ([`User`], [`Patient`], [`Role`]) and the two
//! narrow storage traits handlers consume ([`AccountStore`],
//! [`PatientStore`]), plus an in-memory backend for tests.

pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

pub use error::{StorageError, StorageResult};
pub use memory::{InMemoryAccountStore, InMemoryPatientStore};
pub use traits::{AccountStore, PatientStore};
pub use types::{NewPatient, NewUser, Patient, PatientQuery, Role, User};

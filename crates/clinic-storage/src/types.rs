//! Domain types shared between storage backends and handlers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Role
// =============================================================================

/// User role determining write permissions over patient records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Manages patient demographics: create, update name/age/gender, delete.
    Receptionist,
    /// Manages the diagnosis field only.
    Doctor,
}

impl Role {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Receptionist => "receptionist",
            Role::Doctor => "doctor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "receptionist" => Ok(Role::Receptionist),
            "doctor" => Ok(Role::Doctor),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

// =============================================================================
// User account
// =============================================================================

/// A registered user account.
///
/// The password hash is never serialized outward; only storage code reads it.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
}

/// Input for creating a user account. The password is already hashed
/// by the time it reaches storage.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

// =============================================================================
// Patient record
// =============================================================================

/// A patient record.
///
/// `created_by` tracks the identity of the most recent writer, not the
/// original creator: every successful write overwrites it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    pub gender: String,
    /// `None` means no diagnosis has been recorded yet; distinct from
    /// an empty string.
    pub diagnosis: Option<String>,
    pub created_by: Uuid,
}

/// Input for creating a patient record. Diagnosis always starts out null;
/// only doctors may set it later.
#[derive(Debug, Clone)]
pub struct NewPatient {
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub created_by: Uuid,
}

// =============================================================================
// Listing
// =============================================================================

/// Parameters for listing patients.
#[derive(Debug, Clone, Default)]
pub struct PatientQuery {
    /// Case-insensitive substring match on the patient name.
    pub name: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serde_is_lowercase() {
        assert_eq!(
            serde_json::to_string(&Role::Receptionist).unwrap(),
            r#""receptionist""#
        );
        assert_eq!(serde_json::to_string(&Role::Doctor).unwrap(), r#""doctor""#);
        let role: Role = serde_json::from_str(r#""doctor""#).unwrap();
        assert_eq!(role, Role::Doctor);
    }

    #[test]
    fn role_rejects_unknown_values() {
        assert!(serde_json::from_str::<Role>(r#""admin""#).is_err());
        assert!("nurse".parse::<Role>().is_err());
    }

    #[test]
    fn user_serialization_omits_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Alice".into(),
            email: "alice@clinic.test".into(),
            password_hash: "$argon2id$secret".into(),
            role: Role::Receptionist,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("password").is_none());
        assert_eq!(json["email"], "alice@clinic.test");
    }

    #[test]
    fn patient_diagnosis_serializes_as_null_when_absent() {
        let patient = Patient {
            id: Uuid::new_v4(),
            name: "Jane".into(),
            age: 30,
            gender: "F".into(),
            diagnosis: None,
            created_by: Uuid::new_v4(),
        };
        let json = serde_json::to_value(&patient).unwrap();
        assert!(json["diagnosis"].is_null());
    }
}

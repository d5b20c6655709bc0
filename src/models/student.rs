// src/models/student.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::store::Timestamp;

/// Class letters a student can belong to.
pub const CLASS_TYPES: [&str; 6] = ["A", "B", "C", "D", "E", "F"];

/// Represents a document of the 'students' collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(default)]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// Grade, e.g. "7".
    pub class_number: String,
    /// Class letter, one of `CLASS_TYPES`.
    pub class_type: String,
    #[serde(default)]
    pub time: Timestamp,
}

impl Student {
    /// Name results are recorded under.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// DTO for registering a student.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterStudentRequest {
    #[validate(length(min = 1, max = 50, message = "First name must be between 1 and 50 characters."))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "Last name must be between 1 and 50 characters."))]
    pub last_name: String,
    #[validate(length(min = 1, max = 10))]
    pub class_number: String,
    #[validate(custom(function = validate_class_type))]
    pub class_type: String,
}

fn validate_class_type(class_type: &str) -> Result<(), validator::ValidationError> {
    if !CLASS_TYPES.contains(&class_type) {
        return Err(validator::ValidationError::new("invalid_class_type"));
    }
    Ok(())
}

/// Returned after registration: the student record plus a token to take tests with.
#[derive(Debug, Serialize)]
pub struct StudentSession {
    pub student: Student,
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: &'static str,
}

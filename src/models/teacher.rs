// src/models/teacher.rs

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;
use validator::Validate;

use crate::store::Timestamp;

static LOGIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_.-]{3,32}$").expect("login pattern is valid")
});

/// Represents a document of the 'teachers' collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    #[serde(default)]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// Subject the teacher's tests and results belong to.
    pub subject: String,
    pub login: String,
    /// Argon2 password hash.
    pub password_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub time: Timestamp,
}

impl Teacher {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Public view of a teacher, without the password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherProfile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub subject: String,
    pub subject_display: String,
    pub login: String,
    pub photo_url: Option<String>,
    pub time: Timestamp,
}

impl From<&Teacher> for TeacherProfile {
    fn from(teacher: &Teacher) -> Self {
        TeacherProfile {
            id: teacher.id.clone(),
            first_name: teacher.first_name.clone(),
            last_name: teacher.last_name.clone(),
            subject: teacher.subject.clone(),
            subject_display: crate::models::subject::subject_display(Some(&teacher.subject)),
            login: teacher.login.clone(),
            photo_url: teacher.photo_url.clone(),
            time: teacher.time,
        }
    }
}

/// DTO for the super-admin creating a teacher account.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeacherRequest {
    #[validate(length(min = 1, max = 50))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50))]
    pub last_name: String,
    #[validate(length(min = 1, max = 50))]
    pub subject: String,
    #[validate(custom(function = validate_login))]
    pub login: String,
    #[validate(length(min = 4, max = 128, message = "Password length must be between 4 and 128 characters."))]
    pub password: String,
    #[validate(length(max = 500), custom(function = validate_url_string))]
    pub photo_url: Option<String>,
}

/// DTO for updating a teacher. Fields are optional.
/// Used both by the super-admin and by teachers editing their own profile.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeacherRequest {
    #[validate(length(min = 1, max = 50))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub last_name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub subject: Option<String>,
    #[validate(custom(function = validate_login))]
    pub login: Option<String>,
    #[validate(length(min = 4, max = 128, message = "Password length must be between 4 and 128 characters."))]
    pub password: Option<String>,
    /// Empty string removes the photo.
    #[validate(length(max = 500))]
    pub photo_url: Option<String>,
}

impl UpdateTeacherRequest {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.subject.is_none()
            && self.login.is_none()
            && self.password.is_none()
            && self.photo_url.is_none()
    }
}

/// Validates a teacher login: 3 to 32 letters, digits, `_`, `.` or `-`.
fn validate_login(login: &str) -> Result<(), validator::ValidationError> {
    if !LOGIN_RE.is_match(login) {
        return Err(validator::ValidationError::new("invalid_login"));
    }
    Ok(())
}

/// Validates that a string is a correctly formatted URL.
pub fn validate_url_string(url: &str) -> Result<(), validator::ValidationError> {
    if Url::parse(url).is_err() {
        return Err(validator::ValidationError::new("invalid_url"));
    }
    Ok(())
}

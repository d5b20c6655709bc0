// src/models/subject.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::store::Timestamp;

/// A subject that ships with the application.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BuiltinSubject {
    pub value: &'static str,
    /// Uzbek label used in forms.
    pub label: &'static str,
    /// English display name.
    pub display: &'static str,
}

pub const BUILTIN_SUBJECTS: [BuiltinSubject; 2] = [
    BuiltinSubject {
        value: "english",
        label: "Ingliz tili",
        display: "English",
    },
    BuiltinSubject {
        value: "informatics",
        label: "Informatika",
        display: "Informatics",
    },
];

pub const DEFAULT_SUBJECT: &str = BUILTIN_SUBJECTS[0].value;

/// Trimmed and lowercased, the form subjects are compared in.
pub fn normalize_subject(value: &str) -> String {
    value.trim().to_lowercase()
}

pub fn find_builtin(value: &str) -> Option<&'static BuiltinSubject> {
    let normalized = normalize_subject(value);
    BUILTIN_SUBJECTS.iter().find(|s| s.value == normalized)
}

/// Human readable name of a subject value.
pub fn subject_display(value: Option<&str>) -> String {
    match value {
        None | Some("") => BUILTIN_SUBJECTS[0].display.to_string(),
        Some(v) => find_builtin(v)
            .map(|s| s.display.to_string())
            .unwrap_or_else(|| v.to_string()),
    }
}

/// A custom subject created by the super-admin, stored in `subjects`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub time: Timestamp,
}

/// Entry of the merged subject list.
#[derive(Debug, Serialize)]
pub struct SubjectOption {
    /// Present for custom subjects only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub value: String,
    pub label: String,
    pub display: String,
    pub builtin: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSubjectRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
}

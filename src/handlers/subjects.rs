// src/handlers/subjects.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::subject::{
        BUILTIN_SUBJECTS, CreateSubjectRequest, Subject, SubjectOption, find_builtin,
        normalize_subject,
    },
    store::{self, Collection, DocumentStore, Timestamp},
};

/// Lists built-in subjects followed by custom ones (oldest first).
pub async fn list_subjects(
    State(store): State<Arc<dyn DocumentStore>>,
) -> Result<impl IntoResponse, AppError> {
    let mut custom: Vec<Subject> = store::fetch_all(store.as_ref(), Collection::Subjects).await?;
    custom.sort_by_key(|s| s.time.millis());

    let options: Vec<SubjectOption> = BUILTIN_SUBJECTS
        .iter()
        .map(|s| SubjectOption {
            id: None,
            value: s.value.to_string(),
            label: s.label.to_string(),
            display: s.display.to_string(),
            builtin: true,
        })
        .chain(custom.into_iter().map(|s| SubjectOption {
            id: Some(s.id),
            value: s.name.clone(),
            label: s.name.clone(),
            display: s.name,
            builtin: false,
        }))
        .collect();

    Ok(Json(options))
}

/// Creates a custom subject.
/// Admin only. Names are compared trimmed and case-insensitively.
pub async fn create_subject(
    State(store): State<Arc<dyn DocumentStore>>,
    Json(payload): Json<CreateSubjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let name = normalize_subject(&payload.name);
    if name.is_empty() {
        return Err(AppError::BadRequest("Subject name cannot be empty".to_string()));
    }

    let existing: Vec<Subject> = store::fetch_all(store.as_ref(), Collection::Subjects).await?;
    if find_builtin(&name).is_some() || existing.iter().any(|s| normalize_subject(&s.name) == name) {
        return Err(AppError::Conflict(format!("Subject '{}' already exists", name)));
    }

    let subject = Subject {
        id: String::new(),
        name,
        time: Timestamp::Pending,
    };
    let id = store::insert(store.as_ref(), Collection::Subjects, &subject).await?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// Deletes a custom subject.
/// Admin only. Built-in subjects are not stored and cannot be deleted.
pub async fn delete_subject(
    State(store): State<Arc<dyn DocumentStore>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if !store.delete(Collection::Subjects, &id).await? {
        return Err(AppError::NotFound("Subject not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

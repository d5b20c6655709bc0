// src/handlers/students.rs

use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use crate::{
    error::AppError,
    models::student::Student,
    store::{self, Collection, DocumentStore},
};

/// Lists registered students, newest first.
/// Staff only.
pub async fn list_students(
    State(store): State<Arc<dyn DocumentStore>>,
) -> Result<impl IntoResponse, AppError> {
    let mut students: Vec<Student> = store::fetch_all(store.as_ref(), Collection::Students).await?;
    students.sort_by_key(|s| std::cmp::Reverse(s.time.millis()));

    Ok(Json(students))
}

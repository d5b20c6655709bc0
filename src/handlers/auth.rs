// src/handlers/auth.rs

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::{
        student::{RegisterStudentRequest, Student, StudentSession},
        teacher::Teacher,
        user::LoginRequest,
    },
    store::{self, Collection, DocumentStore, Timestamp},
    utils::{
        hash::verify_password,
        jwt::{Role, sign_jwt},
    },
};

/// Registers a student.
///
/// Stores the student in the `students` collection and returns a student
/// token. Test submissions are recorded under the student's full name.
pub async fn register(
    State(store): State<Arc<dyn DocumentStore>>,
    State(config): State<Config>,
    Json(payload): Json<RegisterStudentRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut student = Student {
        id: String::new(),
        first_name: payload.first_name.trim().to_string(),
        last_name: payload.last_name.trim().to_string(),
        class_number: payload.class_number.trim().to_string(),
        class_type: payload.class_type,
        time: Timestamp::Pending,
    };
    if student.first_name.is_empty()
        || student.last_name.is_empty()
        || student.class_number.is_empty()
    {
        return Err(AppError::BadRequest(
            "First name, last name and class number cannot be blank".to_string(),
        ));
    }

    student.id = store::insert(store.as_ref(), Collection::Students, &student)
        .await
        .map_err(|e| {
            tracing::error!("Failed to register student: {:?}", e);
            e
        })?;

    let token = sign_jwt(
        &student.id,
        Role::Student,
        &student.display_name(),
        None,
        &config.jwt_secret,
        config.jwt_expiration,
    )?;

    tracing::info!("Registered student {}", student.id);

    Ok((
        StatusCode::CREATED,
        Json(StudentSession {
            student,
            token,
            token_type: "Bearer",
        }),
    ))
}

/// Authenticates staff and returns a JWT token.
///
/// The configured super-admin credentials are checked first, then teacher
/// accounts by login with Argon2 verification.
pub async fn login(
    State(store): State<Arc<dyn DocumentStore>>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if config.is_super_admin(&payload.login, &payload.password) {
        let token = sign_jwt(
            &payload.login,
            Role::Admin,
            &payload.login,
            None,
            &config.jwt_secret,
            config.jwt_expiration,
        )?;

        return Ok(Json(json!({
            "token": token,
            "type": "Bearer",
            "role": Role::Admin,
        })));
    }

    let teachers: Vec<Teacher> = store::fetch_all(store.as_ref(), Collection::Teachers).await?;
    let teacher = teachers
        .into_iter()
        .find(|t| t.login == payload.login)
        .ok_or(AppError::AuthError("Invalid login or password".to_string()))?;

    if !verify_password(&payload.password, &teacher.password_hash)? {
        return Err(AppError::AuthError("Invalid login or password".to_string()));
    }

    let token = sign_jwt(
        &teacher.id,
        Role::Teacher,
        &teacher.display_name(),
        Some(&teacher.subject),
        &config.jwt_secret,
        config.jwt_expiration,
    )?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "role": Role::Teacher,
        "subject": teacher.subject,
    })))
}

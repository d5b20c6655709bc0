// src/handlers/teachers.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        subject::normalize_subject,
        teacher::{
            CreateTeacherRequest, Teacher, TeacherProfile, UpdateTeacherRequest,
            validate_url_string,
        },
    },
    store::{self, Collection, DocumentStore, Timestamp},
    utils::{
        hash::hash_password,
        jwt::{Claims, Role},
    },
};

async fn load_teacher(store: &dyn DocumentStore, id: &str) -> Result<Teacher, AppError> {
    store::fetch::<Teacher>(store, Collection::Teachers, id)
        .await?
        .ok_or(AppError::NotFound("Teacher not found".to_string()))
}

/// Fails with 409 when another teacher already uses `login`.
async fn ensure_login_free(
    store: &dyn DocumentStore,
    login: &str,
    except_id: Option<&str>,
) -> Result<(), AppError> {
    let teachers: Vec<Teacher> = store::fetch_all(store, Collection::Teachers).await?;
    let taken = teachers
        .iter()
        .any(|t| t.login == login && Some(t.id.as_str()) != except_id);
    if taken {
        return Err(AppError::Conflict(format!("Login '{}' already exists", login)));
    }
    Ok(())
}

/// Lists all teachers.
/// Admin only.
pub async fn list_teachers(
    State(store): State<Arc<dyn DocumentStore>>,
) -> Result<impl IntoResponse, AppError> {
    let mut teachers: Vec<Teacher> = store::fetch_all(store.as_ref(), Collection::Teachers).await?;
    teachers.sort_by_key(|t| std::cmp::Reverse(t.time.millis()));

    let profiles: Vec<TeacherProfile> = teachers.iter().map(TeacherProfile::from).collect();
    Ok(Json(profiles))
}

/// Creates a teacher account.
/// Admin only.
pub async fn create_teacher(
    State(store): State<Arc<dyn DocumentStore>>,
    Json(payload): Json<CreateTeacherRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    ensure_login_free(store.as_ref(), &payload.login, None).await?;

    let teacher = Teacher {
        id: String::new(),
        first_name: payload.first_name.trim().to_string(),
        last_name: payload.last_name.trim().to_string(),
        subject: normalize_subject(&payload.subject),
        login: payload.login,
        password_hash: hash_password(&payload.password)?,
        photo_url: payload
            .photo_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty()),
        time: Timestamp::Pending,
    };

    let id = store::insert(store.as_ref(), Collection::Teachers, &teacher).await?;
    tracing::info!("Teacher account {} created for login {}", id, teacher.login);

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// Applies the present fields of `payload` to `teacher`.
async fn apply_update(
    store: &dyn DocumentStore,
    mut teacher: Teacher,
    payload: UpdateTeacherRequest,
) -> Result<Teacher, AppError> {
    payload.validate()?;

    if let Some(first_name) = payload.first_name {
        teacher.first_name = first_name.trim().to_string();
    }
    if let Some(last_name) = payload.last_name {
        teacher.last_name = last_name.trim().to_string();
    }
    if let Some(subject) = payload.subject {
        teacher.subject = normalize_subject(&subject);
    }
    if let Some(login) = payload.login {
        if login != teacher.login {
            ensure_login_free(store, &login, Some(&teacher.id)).await?;
            teacher.login = login;
        }
    }
    if let Some(password) = payload.password {
        teacher.password_hash = hash_password(&password)?;
    }
    if let Some(photo_url) = payload.photo_url {
        let photo_url = photo_url.trim().to_string();
        if photo_url.is_empty() {
            teacher.photo_url = None;
        } else {
            validate_url_string(&photo_url)
                .map_err(|_| AppError::BadRequest("photoUrl must be a valid URL".to_string()))?;
            teacher.photo_url = Some(photo_url);
        }
    }

    let data = store::to_document_data(&teacher)?;
    if !store.update(Collection::Teachers, &teacher.id, data).await? {
        return Err(AppError::NotFound("Teacher not found".to_string()));
    }

    Ok(teacher)
}

/// Updates a teacher.
/// Admin only.
pub async fn update_teacher(
    State(store): State<Arc<dyn DocumentStore>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateTeacherRequest>,
) -> Result<impl IntoResponse, AppError> {
    let teacher = load_teacher(store.as_ref(), &id).await?;
    if payload.is_empty() {
        return Ok(Json(TeacherProfile::from(&teacher)));
    }

    let teacher = apply_update(store.as_ref(), teacher, payload).await?;
    Ok(Json(TeacherProfile::from(&teacher)))
}

/// Deletes a teacher account.
/// Admin only.
pub async fn delete_teacher(
    State(store): State<Arc<dyn DocumentStore>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if !store.delete(Collection::Teachers, &id).await? {
        return Err(AppError::NotFound("Teacher not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

fn own_teacher_id(claims: &Claims) -> Result<&str, AppError> {
    if claims.role != Role::Teacher {
        return Err(AppError::Forbidden("Only teachers have a profile".to_string()));
    }
    Ok(&claims.sub)
}

/// Get the current teacher's profile.
pub async fn get_me(
    State(store): State<Arc<dyn DocumentStore>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let id = own_teacher_id(&claims)?;
    let teacher = load_teacher(store.as_ref(), id).await?;

    Ok(Json(TeacherProfile::from(&teacher)))
}

/// Update the current teacher's profile.
/// A subject change takes effect for new tokens only.
pub async fn update_me(
    State(store): State<Arc<dyn DocumentStore>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateTeacherRequest>,
) -> Result<impl IntoResponse, AppError> {
    let id = own_teacher_id(&claims)?;
    let teacher = load_teacher(store.as_ref(), id).await?;
    if payload.is_empty() {
        return Ok(Json(TeacherProfile::from(&teacher)));
    }

    let teacher = apply_update(store.as_ref(), teacher, payload).await?;
    Ok(Json(TeacherProfile::from(&teacher)))
}

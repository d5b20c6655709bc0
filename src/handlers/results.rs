// src/handlers/results.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;

use crate::{
    error::AppError,
    models::{
        result::{ResultDetail, ResultRecord, ResultView, SessionGroupView},
        teacher::Teacher,
    },
    results::{
        export::{export_filename, group_export_filename, to_csv},
        grouping::numbered_sessions,
        scope::{Actor, is_visible, scope_results, subject_matches},
    },
    store::{self, Collection, DocumentStore},
    utils::jwt::Claims,
};

/// Extra filters for the super-admin view.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultFilter {
    pub subject: Option<String>,
    pub teacher_id: Option<String>,
}

/// Loads every result the caller may see, narrowed by the optional filter.
async fn load_scoped(
    store: &dyn DocumentStore,
    actor: &Actor,
    filter: &ResultFilter,
) -> Result<Vec<ResultRecord>, AppError> {
    let records: Vec<ResultRecord> = store::fetch_all(store, Collection::Results).await?;
    let mut records = scope_results(actor, records);

    if let Some(teacher_id) = filter.teacher_id.as_deref().filter(|s| !s.is_empty()) {
        let teacher: Teacher = store::fetch(store, Collection::Teachers, teacher_id)
            .await?
            .ok_or(AppError::NotFound("Teacher not found".to_string()))?;
        records.retain(|r| subject_matches(&teacher.subject, r.subject.as_deref()));
    }
    if let Some(subject) = filter.subject.as_deref().filter(|s| !s.trim().is_empty()) {
        records.retain(|r| subject_matches(subject, r.subject.as_deref()));
    }

    Ok(records)
}

fn csv_response(csv: String, filename: &str) -> Result<Response, AppError> {
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let mut response = Response::new(csv.into());
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    response
        .headers_mut()
        .insert(header::CONTENT_DISPOSITION, disposition);
    Ok(response)
}

/// Lists results grouped into sessions, newest session first.
/// Staff only; teachers see their subject only.
pub async fn list_results(
    State(store): State<Arc<dyn DocumentStore>>,
    Extension(claims): Extension<Claims>,
    Query(filter): Query<ResultFilter>,
) -> Result<impl IntoResponse, AppError> {
    let actor = Actor::from_claims(&claims);
    let records = load_scoped(store.as_ref(), &actor, &filter).await?;

    let groups: Vec<SessionGroupView> = numbered_sessions(&records)
        .into_iter()
        .map(|(number, group)| SessionGroupView {
            number,
            results: group.iter().map(ResultView::from).collect(),
        })
        .collect();

    Ok(Json(groups))
}

/// Downloads every visible result as CSV.
pub async fn export_results(
    State(store): State<Arc<dyn DocumentStore>>,
    Extension(claims): Extension<Claims>,
    Query(filter): Query<ResultFilter>,
) -> Result<Response, AppError> {
    let actor = Actor::from_claims(&claims);
    let mut records = load_scoped(store.as_ref(), &actor, &filter).await?;
    // Same order as the store listing: newest first.
    records.sort_by_key(|r| std::cmp::Reverse(r.time.millis()));

    csv_response(to_csv(&records), &export_filename(Utc::now()))
}

/// Downloads one session as CSV. Sessions are numbered from 1, oldest first.
pub async fn export_group(
    State(store): State<Arc<dyn DocumentStore>>,
    Extension(claims): Extension<Claims>,
    Path(number): Path<usize>,
    Query(filter): Query<ResultFilter>,
) -> Result<Response, AppError> {
    let actor = Actor::from_claims(&claims);
    let records = load_scoped(store.as_ref(), &actor, &filter).await?;

    let (_, group) = numbered_sessions(&records)
        .into_iter()
        .find(|(n, _)| *n == number)
        .ok_or(AppError::NotFound(format!("Session {} not found", number)))?;

    csv_response(to_csv(&group), &group_export_filename(number))
}

async fn load_visible(
    store: &dyn DocumentStore,
    actor: &Actor,
    id: &str,
) -> Result<ResultRecord, AppError> {
    let record: ResultRecord = store::fetch(store, Collection::Results, id)
        .await?
        .ok_or(AppError::NotFound("Result not found".to_string()))?;

    if !is_visible(actor, &record) {
        return Err(AppError::Forbidden(
            "Result is outside your scope".to_string(),
        ));
    }
    Ok(record)
}

/// Returns one result with its wrong answers.
/// Students can only open their own results.
pub async fn get_result(
    State(store): State<Arc<dyn DocumentStore>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let actor = Actor::from_claims(&claims);
    let record = load_visible(store.as_ref(), &actor, &id).await?;

    Ok(Json(ResultDetail::from(&record)))
}

/// Deletes a single result.
/// Staff only, within their scope.
pub async fn delete_result(
    State(store): State<Arc<dyn DocumentStore>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let actor = Actor::from_claims(&claims);
    load_visible(store.as_ref(), &actor, &id).await?;

    if !store.delete(Collection::Results, &id).await? {
        return Err(AppError::NotFound("Result not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Deletes every result.
/// Admin only.
pub async fn clear_results(
    State(store): State<Arc<dyn DocumentStore>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let removed = store.clear(Collection::Results).await?;
    tracing::warn!("{} cleared all results ({} removed)", claims.sub, removed);

    Ok(Json(serde_json::json!({ "deleted": removed })))
}

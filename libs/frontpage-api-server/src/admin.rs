use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use frontpage_api::{Category, ConfigDocument, FrontpageError, GenerationRecord};

use crate::{ApiError, AppState};

pub const ADMIN_KEY_HEADER: &str = "x-admin-key";
pub const ADMIN_KEY_QUERY: &str = "admin_key";
pub const DEFAULT_LOG_LIMIT: usize = 50;
pub const MAX_LOG_LIMIT: usize = 200;

// ═══════════════════════════════════════════════════════════════
//  Auth
// ═══════════════════════════════════════════════════════════════

#[derive(Deserialize)]
struct KeyQuery {
    admin_key: Option<String>,
}

/// Route layer for every admin JSON route. Runs before body extraction,
/// so a rejected request never reaches a store.
pub(crate) async fn require_admin_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.admin_key.as_deref() else {
        return ApiError(FrontpageError::forbidden("admin API key not configured")).into_response();
    };

    let provided = request
        .headers()
        .get(ADMIN_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| {
            Query::<KeyQuery>::try_from_uri(request.uri())
                .ok()
                .and_then(|Query(q)| q.admin_key)
        });

    if provided.as_deref() != Some(expected) {
        tracing::warn!(
            method = %request.method(),
            path = %request.uri().path(),
            "rejected admin request"
        );
        return ApiError(FrontpageError::unauthorized("invalid admin credentials")).into_response();
    }

    next.run(request).await
}

fn payload<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(v)| v)
        .map_err(|e| ApiError(FrontpageError::validation(e.body_text())))
}

fn category(raw: Option<&str>) -> Result<Category, FrontpageError> {
    match raw {
        Some(c) if !c.trim().is_empty() => c.parse(),
        _ => Ok(Category::Cs),
    }
}

// ═══════════════════════════════════════════════════════════════
//  Subjects
// ═══════════════════════════════════════════════════════════════

#[derive(Deserialize)]
pub(crate) struct SubjectPayload {
    category: Option<String>,
    #[serde(default)]
    name: String,
    code: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EditSubjectPayload {
    category: Option<String>,
    #[serde(default, alias = "original_name")]
    old_name: String,
    #[serde(default, alias = "name")]
    new_name: String,
    code: Option<String>,
}

pub(crate) async fn list_subjects(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let doc = state.config.get()?;
    Ok(Json(json!({
        "subjects": doc.subjects,
        "subject_codes": doc.subject_codes,
    })))
}

pub(crate) async fn add_subject(
    State(state): State<AppState>,
    body: Result<Json<SubjectPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let req = payload(body)?;
    let category = category(req.category.as_deref())?;
    let subject = state
        .config
        .add_subject(category, &req.name, req.code.as_deref())?;

    tracing::info!(category = %subject.category, name = %subject.name, "subject added");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Subject saved",
            "category": subject.category,
            "name": subject.name,
        })),
    ))
}

pub(crate) async fn edit_subject(
    State(state): State<AppState>,
    body: Result<Json<EditSubjectPayload>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let req = payload(body)?;
    let category = category(req.category.as_deref())?;
    let subject = state.config.edit_subject(
        category,
        &req.old_name,
        &req.new_name,
        req.code.as_deref(),
    )?;

    tracing::info!(category = %subject.category, from = %req.old_name.trim(), to = %subject.name, "subject updated");
    Ok(Json(json!({
        "message": "Subject updated",
        "category": subject.category,
        "name": subject.name,
    })))
}

pub(crate) async fn delete_subject(
    State(state): State<AppState>,
    body: Result<Json<SubjectPayload>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let req = payload(body)?;
    let category = category(req.category.as_deref())?;
    let subject = state.config.delete_subject(category, &req.name)?;

    tracing::info!(category = %subject.category, name = %subject.name, "subject removed");
    Ok(Json(json!({
        "message": "Subject removed",
        "category": subject.category,
        "name": subject.name,
    })))
}

// ═══════════════════════════════════════════════════════════════
//  Streams
// ═══════════════════════════════════════════════════════════════

#[derive(Deserialize)]
pub(crate) struct StreamPayload {
    #[serde(default)]
    label: String,
}

pub(crate) async fn list_streams(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.config.get()?.streams))
}

pub(crate) async fn add_stream(
    State(state): State<AppState>,
    body: Result<Json<StreamPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let req = payload(body)?;
    let label = state.config.add_stream(&req.label)?;

    tracing::info!(label = %label, "stream added");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Stream saved", "label": label })),
    ))
}

pub(crate) async fn delete_stream(
    State(state): State<AppState>,
    body: Result<Json<StreamPayload>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let req = payload(body)?;
    let label = state.config.delete_stream(&req.label)?;

    tracing::info!(label = %label, "stream removed");
    Ok(Json(json!({ "message": "Stream removed", "label": label })))
}

// ═══════════════════════════════════════════════════════════════
//  Logs and snapshot
// ═══════════════════════════════════════════════════════════════

#[derive(Deserialize)]
pub(crate) struct LogsParams {
    limit: Option<String>,
}

/// Default [`DEFAULT_LOG_LIMIT`], clamped to `1..=MAX_LOG_LIMIT`.
fn log_limit(raw: Option<&str>) -> Result<usize, FrontpageError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(DEFAULT_LOG_LIMIT);
    };
    let n: i64 = raw
        .parse()
        .map_err(|_| FrontpageError::validation("limit must be an integer"))?;
    Ok(n.clamp(1, MAX_LOG_LIMIT as i64) as usize)
}

pub(crate) async fn recent_logs(
    State(state): State<AppState>,
    params: Result<Query<LogsParams>, QueryRejection>,
) -> Result<Json<Vec<GenerationRecord>>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError(FrontpageError::validation(e.body_text())))?;
    let limit = log_limit(params.limit.as_deref())?;
    Ok(Json(state.logs.recent(limit)?))
}

pub(crate) async fn config_snapshot(
    State(state): State<AppState>,
) -> Result<Json<ConfigDocument>, ApiError> {
    Ok(Json(state.config.get()?))
}

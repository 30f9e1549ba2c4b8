use std::time::Instant;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use shardlite_core::shard::{parse_user_id, ShardError};

use crate::{
    handlers::AppError,
    metrics::{Operation, Outcome},
    state::AppState,
};

/// Query parameters for `GET /insert`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct InsertQuery {
    pub id: Option<String>,
    pub username: Option<String>,
    pub payload: Option<String>,
}

/// Query parameters for `GET /get`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GetQuery {
    pub id: Option<String>,
}

fn invalid_id() -> Response {
    (StatusCode::BAD_REQUEST, "invalid id").into_response()
}

fn outcome<T>(result: &Result<T, ShardError>) -> Outcome {
    match result {
        Ok(_) => Outcome::Ok,
        Err(err) if err.is_not_found() => Outcome::NotFound,
        Err(_) => Outcome::Error,
    }
}

/// Insert a user (GET /insert?id=&username=&payload=).
///
/// Missing `username`/`payload` are stored as empty strings. Re-inserting an
/// existing id succeeds without changing the stored row.
pub async fn insert_user(
    State(state): State<AppState>,
    Query(query): Query<InsertQuery>,
) -> Result<Response, AppError> {
    let Some(id) = query.id.as_deref().and_then(parse_user_id) else {
        return Ok(invalid_id());
    };
    let username = query.username.unwrap_or_default();
    let payload = query.payload.unwrap_or_default();

    let start = Instant::now();
    let result = state.manager.insert_user(id, &username, &payload).await;
    state
        .metrics
        .record(Operation::Write, start.elapsed(), outcome(&result));

    result?;

    Ok((StatusCode::OK, "ok").into_response())
}

/// Fetch a user (GET /get?id=).
///
/// Responds with `<username>|<payload>` as plain text.
pub async fn get_user(
    State(state): State<AppState>,
    Query(query): Query<GetQuery>,
) -> Result<Response, AppError> {
    let Some(id) = query.id.as_deref().and_then(parse_user_id) else {
        return Ok(invalid_id());
    };

    let start = Instant::now();
    let result = state.manager.get_user(id).await;
    state
        .metrics
        .record(Operation::Read, start.elapsed(), outcome(&result));

    let user = result?;

    Ok((StatusCode::OK, format!("{}|{}", user.username, user.payload)).into_response())
}

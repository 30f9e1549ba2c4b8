use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use shardlite_core::shard::{shard_error_to_status_code, ShardError};

/// Handler error wrapping `anyhow::Error`.
///
/// A wrapped [`ShardError`] picks its status code from
/// [`shard_error_to_status_code`]; anything else is a 500.
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = match self.0.downcast_ref::<ShardError>() {
            Some(ShardError::NotFound { .. }) => {
                return (StatusCode::NOT_FOUND, "user not found").into_response();
            }
            Some(shard_error) => {
                let code = shard_error_to_status_code(shard_error);
                StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            None => StatusCode::INTERNAL_SERVER_ERROR,
        };

        tracing::error!(error = %self.0, "Request failed");

        (status_code, self.0.to_string()).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

use axum::http::StatusCode;
use tokio::task::JoinError;
use tracing::error;

use banter_store::StoreError;

pub(crate) fn store_status(err: StoreError) -> StatusCode {
    match err {
        StoreError::DuplicateId { .. } | StoreError::DuplicateKey { .. } => StatusCode::CONFLICT,
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        other => {
            error!("Store error: {}", other);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub(crate) fn join_status(err: JoinError) -> StatusCode {
    error!("spawn_blocking join error: {}", err);
    StatusCode::INTERNAL_SERVER_ERROR
}

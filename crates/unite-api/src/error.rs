use axum::http::StatusCode;
use tracing::{debug, error};

use unite_chat::{ChatError, ChatRepository};

use crate::auth::AppState;

/// Map a core error to the status the client sees.
pub fn status_for(err: ChatError) -> StatusCode {
    match err {
        ChatError::NotFound { .. } => {
            debug!("{}", err);
            StatusCode::NOT_FOUND
        }
        ChatError::Conflict(_) => {
            debug!("{}", err);
            StatusCode::CONFLICT
        }
        ChatError::InvalidInput(_) => {
            debug!("{}", err);
            StatusCode::BAD_REQUEST
        }
        ChatError::Storage(e) => {
            error!("Storage failure: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Run a repository call off the async runtime.
pub async fn blocking<T, F>(state: &AppState, f: F) -> Result<T, StatusCode>
where
    T: Send + 'static,
    F: FnOnce(&dyn ChatRepository) -> unite_chat::Result<T> + Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(state.repo.as_ref()))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(status_for)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_variant_has_its_status() {
        assert_eq!(status_for(ChatError::not_found("agent", "x")), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ChatError::Conflict("slug".into())), StatusCode::CONFLICT);
        assert_eq!(status_for(ChatError::InvalidInput("empty".into())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(ChatError::Storage(anyhow::anyhow!("disk full"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

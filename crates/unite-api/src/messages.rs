use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use unite_chat::send_to_agent;
use unite_types::api::{Claims, SendMessageRequest};

use crate::auth::AppState;
use crate::error::blocking;

/// Send a message to an agent and return the stored message with the reply.
/// Without `conversation_id` a new conversation is started.
pub async fn send_message(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let exchange = blocking(&state, move |repo| {
        send_to_agent(repo, claims.sub, &slug, req.conversation_id, &req.content)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(exchange)))
}

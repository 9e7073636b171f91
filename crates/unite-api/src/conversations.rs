use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use unite_chat::history;
use unite_types::api::Claims;

use crate::auth::AppState;
use crate::error::blocking;

/// The caller's conversations, most recently active first.
pub async fn list_conversations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let summaries = blocking(&state, move |repo| history::list_summaries(repo, claims.sub)).await?;
    Ok(Json(summaries))
}

pub async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let conversation = blocking(&state, move |repo| history::get_conversation(repo, claims.sub, id)).await?;
    Ok(Json(conversation))
}

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use unite_chat::users;
use unite_types::api::{CreateUserRequest, UpdateUserRequest};

use crate::auth::AppState;
use crate::error::blocking;

pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, StatusCode> {
    let users = blocking(&state, |repo| users::list_users(repo)).await?;
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, StatusCode> {
    let user = blocking(&state, move |repo| users::get_user(repo, id)).await?;
    Ok(Json(user))
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let user = blocking(&state, move |repo| users::create_user(repo, req)).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let user = blocking(&state, move |repo| users::update_user(repo, id, req)).await?;
    Ok(Json(user))
}

/// Also removes the user's conversations.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, StatusCode> {
    blocking(&state, move |repo| users::delete_user(repo, id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

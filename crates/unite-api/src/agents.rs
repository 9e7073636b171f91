use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use unite_chat::catalogue;
use unite_types::api::{AgentResponse, CreateAgentRequest, UpdateAgentRequest};
use unite_types::models::Sector;

use crate::auth::AppState;
use crate::error::blocking;

#[derive(Debug, Deserialize)]
pub struct AgentQuery {
    pub sector: Option<Sector>,
}

pub async fn list_agents(
    State(state): State<AppState>,
    Query(query): Query<AgentQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let agents = blocking(&state, move |repo| catalogue::list_agents(repo, query.sector)).await?;
    Ok(Json(agents.into_iter().map(AgentResponse::from).collect::<Vec<_>>()))
}

pub async fn list_sectors(State(state): State<AppState>) -> Result<impl IntoResponse, StatusCode> {
    let sectors = blocking(&state, |repo| catalogue::list_sectors(repo)).await?;
    Ok(Json(sectors))
}

pub async fn get_agent(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let agent = blocking(&state, move |repo| catalogue::get_agent_by_slug(repo, &slug)).await?;
    Ok(Json(AgentResponse::from(agent)))
}

pub async fn create_agent(
    State(state): State<AppState>,
    Json(req): Json<CreateAgentRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let agent = blocking(&state, move |repo| catalogue::create_agent(repo, req)).await?;
    Ok((StatusCode::CREATED, Json(AgentResponse::from(agent))))
}

pub async fn update_agent(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateAgentRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let agent = blocking(&state, move |repo| catalogue::update_agent(repo, id, req)).await?;
    Ok(Json(AgentResponse::from(agent)))
}

pub async fn delete_agent(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, StatusCode> {
    blocking(&state, move |repo| catalogue::delete_agent(repo, id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

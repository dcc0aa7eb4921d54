//! Tool listing endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::tool::{CreateTool, ToolDetails, ToolQuery, UpdateTool},
};

use super::Actor;

/// Availability query for a candidate date range
#[derive(Deserialize, ToSchema)]
pub struct AvailabilityQuery {
    /// First day of the candidate range (inclusive)
    pub start_date: NaiveDate,
    /// Last day of the candidate range (inclusive)
    pub end_date: NaiveDate,
}

/// Availability response
#[derive(Serialize, ToSchema)]
pub struct AvailabilityResponse {
    /// True if the range overlaps an accepted reservation
    pub conflict: bool,
}

/// List tools with optional filters
#[utoipa::path(
    get,
    path = "/tools",
    tag = "tools",
    params(
        ("category" = Option<String>, Query, description = "Filter by category"),
        ("search" = Option<String>, Query, description = "Search in title and description"),
        ("owner_id" = Option<i32>, Query, description = "Filter by owner"),
        ("active_only" = Option<bool>, Query, description = "Hide deactivated tools (default true)")
    ),
    responses(
        (status = 200, description = "Matching tools", body = Vec<ToolDetails>)
    )
)]
pub async fn list_tools(
    State(state): State<crate::AppState>,
    Query(query): Query<ToolQuery>,
) -> AppResult<Json<Vec<ToolDetails>>> {
    let tools = state.services.tools.list(&query).await?;
    Ok(Json(tools))
}

/// List distinct categories of active tools
#[utoipa::path(
    get,
    path = "/tools/categories",
    tag = "tools",
    responses(
        (status = 200, description = "Categories in use", body = Vec<String>)
    )
)]
pub async fn get_categories(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<String>>> {
    let categories = state.services.tools.categories().await?;
    Ok(Json(categories))
}

/// Get a tool with owner info
#[utoipa::path(
    get,
    path = "/tools/{id}",
    tag = "tools",
    params(("id" = i32, Path, description = "Tool ID")),
    responses(
        (status = 200, description = "Tool details", body = ToolDetails),
        (status = 404, description = "Tool not found")
    )
)]
pub async fn get_tool(
    State(state): State<crate::AppState>,
    Path(tool_id): Path<i32>,
) -> AppResult<Json<ToolDetails>> {
    let tool = state.services.tools.get(tool_id).await?;
    Ok(Json(tool))
}

/// Create a new tool listing
#[utoipa::path(
    post,
    path = "/tools",
    tag = "tools",
    request_body = CreateTool,
    responses(
        (status = 201, description = "Tool created", body = ToolDetails),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Missing actor header")
    )
)]
pub async fn create_tool(
    State(state): State<crate::AppState>,
    Actor(actor_id): Actor,
    Json(request): Json<CreateTool>,
) -> AppResult<(StatusCode, Json<ToolDetails>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let tool = state.services.tools.create(actor_id, &request).await?;
    Ok((StatusCode::CREATED, Json(tool)))
}

/// Update a tool listing (owner only)
#[utoipa::path(
    put,
    path = "/tools/{id}",
    tag = "tools",
    params(("id" = i32, Path, description = "Tool ID")),
    request_body = UpdateTool,
    responses(
        (status = 200, description = "Tool updated", body = ToolDetails),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Tool not found")
    )
)]
pub async fn update_tool(
    State(state): State<crate::AppState>,
    Actor(actor_id): Actor,
    Path(tool_id): Path<i32>,
    Json(request): Json<UpdateTool>,
) -> AppResult<Json<ToolDetails>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let tool = state.services.tools.update(tool_id, actor_id, &request).await?;
    Ok(Json(tool))
}

/// Deactivate a tool listing (owner only, soft delete)
#[utoipa::path(
    delete,
    path = "/tools/{id}",
    tag = "tools",
    params(("id" = i32, Path, description = "Tool ID")),
    responses(
        (status = 204, description = "Tool deactivated"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Tool not found")
    )
)]
pub async fn delete_tool(
    State(state): State<crate::AppState>,
    Actor(actor_id): Actor,
    Path(tool_id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.tools.deactivate(tool_id, actor_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Calendar days blocked by accepted reservations
#[utoipa::path(
    get,
    path = "/tools/{id}/blocked-dates",
    tag = "tools",
    params(("id" = i32, Path, description = "Tool ID")),
    responses(
        (status = 200, description = "Blocked days, sorted", body = Vec<NaiveDate>)
    )
)]
pub async fn get_blocked_dates(
    State(state): State<crate::AppState>,
    Path(tool_id): Path<i32>,
) -> AppResult<Json<Vec<NaiveDate>>> {
    let dates = state.services.reservations.get_blocked_dates(tool_id).await?;
    Ok(Json(dates))
}

/// Check a candidate date range against accepted reservations
#[utoipa::path(
    get,
    path = "/tools/{id}/availability",
    tag = "tools",
    params(
        ("id" = i32, Path, description = "Tool ID"),
        ("start_date" = NaiveDate, Query, description = "First day (inclusive)"),
        ("end_date" = NaiveDate, Query, description = "Last day (inclusive)")
    ),
    responses(
        (status = 200, description = "Conflict flag for the range", body = AvailabilityResponse)
    )
)]
pub async fn check_availability(
    State(state): State<crate::AppState>,
    Path(tool_id): Path<i32>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<AvailabilityResponse>> {
    let conflict = state
        .services
        .reservations
        .has_conflict(tool_id, query.start_date, query.end_date, None)
        .await?;
    Ok(Json(AvailabilityResponse { conflict }))
}

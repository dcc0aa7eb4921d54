//! Reservation lifecycle endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::reservation::{CreateReservation, ReservationDetails, ReservationStatus},
};

use super::Actor;

/// Create reservation request
#[derive(Deserialize, ToSchema)]
pub struct CreateReservationRequest {
    /// Tool to reserve
    pub tool_id: i32,
    /// First day of the loan (inclusive)
    pub start_date: NaiveDate,
    /// Last day of the loan (inclusive)
    pub end_date: NaiveDate,
}

/// Status transition request
#[derive(Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// Target status; must be a legal edge from the current status
    pub status: ReservationStatus,
}

/// Listing role filter
#[derive(Deserialize, ToSchema)]
pub struct ReservationRoleQuery {
    /// "borrower" (default) or "owner"
    pub role: Option<String>,
}

/// Completion sweep response
#[derive(Serialize, ToSchema)]
pub struct CompleteResponse {
    /// True if the reservation transitioned to completed on this call
    pub completed: bool,
}

/// Request a reservation for a tool
#[utoipa::path(
    post,
    path = "/reservations",
    tag = "reservations",
    request_body = CreateReservationRequest,
    responses(
        (status = 201, description = "Reservation requested", body = ReservationDetails),
        (status = 400, description = "Invalid dates or self-reservation"),
        (status = 404, description = "Tool not found or inactive"),
        (status = 409, description = "Dates overlap an accepted reservation")
    )
)]
pub async fn create_reservation(
    State(state): State<crate::AppState>,
    Actor(actor_id): Actor,
    Json(request): Json<CreateReservationRequest>,
) -> AppResult<(StatusCode, Json<ReservationDetails>)> {
    let create = CreateReservation {
        tool_id: request.tool_id,
        start_date: request.start_date,
        end_date: request.end_date,
    };

    let reservation = state
        .services
        .reservations
        .create_reservation(actor_id, &create)
        .await?;

    Ok((StatusCode::CREATED, Json(reservation)))
}

/// Get a reservation
#[utoipa::path(
    get,
    path = "/reservations/{id}",
    tag = "reservations",
    params(("id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation details", body = ReservationDetails),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn get_reservation(
    State(state): State<crate::AppState>,
    Path(reservation_id): Path<i32>,
) -> AppResult<Json<ReservationDetails>> {
    let reservation = state.services.reservations.get(reservation_id).await?;
    Ok(Json(reservation))
}

/// List a user's reservations, as borrower (default) or as tool owner
#[utoipa::path(
    get,
    path = "/users/{id}/reservations",
    tag = "reservations",
    params(
        ("id" = i32, Path, description = "User ID"),
        ("role" = Option<String>, Query, description = "borrower (default) or owner")
    ),
    responses(
        (status = 200, description = "User's reservations", body = Vec<ReservationDetails>)
    )
)]
pub async fn get_user_reservations(
    State(state): State<crate::AppState>,
    Path(user_id): Path<i32>,
    Query(query): Query<ReservationRoleQuery>,
) -> AppResult<Json<Vec<ReservationDetails>>> {
    let as_borrower = query.role.as_deref() != Some("owner");
    let reservations = state
        .services
        .reservations
        .list_for_user(user_id, as_borrower)
        .await?;
    Ok(Json(reservations))
}

/// Transition a reservation: accept/decline (owner) or cancel (borrower)
#[utoipa::path(
    put,
    path = "/reservations/{id}/status",
    tag = "reservations",
    params(("id" = i32, Path, description = "Reservation ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Reservation updated", body = ReservationDetails),
        (status = 403, description = "Actor may not trigger this transition"),
        (status = 404, description = "Reservation not found"),
        (status = 409, description = "Illegal transition, or acceptance lost to a competing reservation")
    )
)]
pub async fn update_status(
    State(state): State<crate::AppState>,
    Actor(actor_id): Actor,
    Path(reservation_id): Path<i32>,
    Json(request): Json<UpdateStatusRequest>,
) -> AppResult<Json<ReservationDetails>> {
    let reservation = state
        .services
        .reservations
        .update_status(reservation_id, actor_id, request.status)
        .await?;
    Ok(Json(reservation))
}

/// Complete an accepted reservation whose end date has passed (idempotent)
#[utoipa::path(
    post,
    path = "/reservations/{id}/complete",
    tag = "reservations",
    params(("id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Sweep result", body = CompleteResponse),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn complete_reservation(
    State(state): State<crate::AppState>,
    Path(reservation_id): Path<i32>,
) -> AppResult<Json<CompleteResponse>> {
    let completed = state.services.reservations.mark_completed(reservation_id).await?;
    Ok(Json(CompleteResponse { completed }))
}

//! Review endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::review::{CreateReview, Review},
};

use super::Actor;

/// Review eligibility response
#[derive(Serialize, ToSchema)]
pub struct CanReviewResponse {
    /// True if the acting user may review this reservation right now
    pub can_review: bool,
}

/// Get the review for a reservation
#[utoipa::path(
    get,
    path = "/reservations/{id}/review",
    tag = "reviews",
    params(("id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "The review", body = Review),
        (status = 404, description = "Reservation not found or not yet reviewed")
    )
)]
pub async fn get_review(
    State(state): State<crate::AppState>,
    Path(reservation_id): Path<i32>,
) -> AppResult<Json<Review>> {
    let review = state.services.reviews.get_for_reservation(reservation_id).await?;
    Ok(Json(review))
}

/// Check whether the acting user may review this reservation
#[utoipa::path(
    get,
    path = "/reservations/{id}/can-review",
    tag = "reviews",
    params(("id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Eligibility flag", body = CanReviewResponse)
    )
)]
pub async fn can_review(
    State(state): State<crate::AppState>,
    Actor(actor_id): Actor,
    Path(reservation_id): Path<i32>,
) -> AppResult<Json<CanReviewResponse>> {
    let eligible = state.services.reviews.can_review(reservation_id, actor_id).await?;
    Ok(Json(CanReviewResponse { can_review: eligible }))
}

/// Review a completed reservation
#[utoipa::path(
    post,
    path = "/reservations/{id}/review",
    tag = "reviews",
    params(("id" = i32, Path, description = "Reservation ID")),
    request_body = CreateReview,
    responses(
        (status = 201, description = "Review created", body = Review),
        (status = 400, description = "Rating out of range"),
        (status = 404, description = "Reservation not found"),
        (status = 422, description = "Not eligible (not completed, not a participant, or already reviewed)")
    )
)]
pub async fn create_review(
    State(state): State<crate::AppState>,
    Actor(actor_id): Actor,
    Path(reservation_id): Path<i32>,
    Json(request): Json<CreateReview>,
) -> AppResult<(StatusCode, Json<Review>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let review = state
        .services
        .reviews
        .create_review(reservation_id, actor_id, &request)
        .await?;

    Ok((StatusCode::CREATED, Json(review)))
}

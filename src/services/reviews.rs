//! Review gate
//!
//! A completed reservation may receive exactly one review, written by
//! either participant. Eligibility is re-checked at write time: a stale
//! "can review" answer in the caller's UI never produces a second review.

use chrono::{NaiveDate, Utc};
use serde_json::json;

use crate::{
    error::{AppError, AppResult},
    models::review::{CreateReview, Review},
    repository::Repository,
};

#[derive(Clone)]
pub struct ReviewsService {
    repository: Repository,
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

impl ReviewsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// May this user review this reservation right now?
    pub async fn can_review(&self, reservation_id: i32, user_id: i32) -> AppResult<bool> {
        let candidate = self.repository.reviews.get_candidate(reservation_id).await?;
        Ok(candidate.map(|c| c.eligible(user_id, today())).unwrap_or(false))
    }

    /// Create a review for a completed reservation
    pub async fn create_review(
        &self,
        reservation_id: i32,
        reviewer_id: i32,
        review: &CreateReview,
    ) -> AppResult<Review> {
        if !(1..=5).contains(&review.rating) {
            return Err(AppError::InvalidInput(
                "Rating must be between 1 and 5".to_string(),
            ));
        }

        let candidate = self
            .repository
            .reviews
            .get_candidate(reservation_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Reservation with id {} not found", reservation_id))
            })?;

        if !candidate.eligible(reviewer_id, today()) {
            return Err(AppError::NotEligible(
                "Reservation is not eligible for a review by this user".to_string(),
            ));
        }

        let review_id = self
            .repository
            .reviews
            .insert(
                reservation_id,
                reviewer_id,
                review.rating,
                review.comment.as_deref(),
            )
            .await?;

        self.repository
            .audit
            .log_action(
                Some(reviewer_id),
                "review_created",
                json!({
                    "review_id": review_id,
                    "reservation_id": reservation_id,
                    "rating": review.rating
                }),
            )
            .await;
        tracing::info!(
            "Review {} created for reservation {} by user {}",
            review_id,
            reservation_id,
            reviewer_id
        );

        self.repository
            .reviews
            .get_for_reservation(reservation_id)
            .await?
            .ok_or_else(|| AppError::Internal("Review vanished after insert".to_string()))
    }

    /// Get the review for a reservation
    pub async fn get_for_reservation(&self, reservation_id: i32) -> AppResult<Review> {
        // Distinguish "no such reservation" from "no review yet".
        self.repository.reservations.get_by_id(reservation_id).await?;
        self.repository
            .reviews
            .get_for_reservation(reservation_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "No review exists for reservation {}",
                    reservation_id
                ))
            })
    }
}

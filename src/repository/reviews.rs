//! Reviews repository for database operations

use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::review::{Review, ReviewCandidate},
};

use super::reservations;

#[derive(Clone)]
pub struct ReviewsRepository {
    pool: Pool<Postgres>,
}

fn row_to_review(row: &sqlx::postgres::PgRow) -> Review {
    Review {
        id: row.get("id"),
        reservation_id: row.get("reservation_id"),
        reviewer_id: row.get("reviewer_id"),
        rating: row.get("rating"),
        comment: row.get("comment"),
        created_at: row.get("created_at"),
    }
}

impl ReviewsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get the review for a reservation, if any
    pub async fn get_for_reservation(&self, reservation_id: i32) -> AppResult<Option<Review>> {
        let row = sqlx::query("SELECT * FROM reviews WHERE reservation_id = $1")
            .bind(reservation_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(row_to_review))
    }

    /// Everything the eligibility rule needs, in one query. `None` if the
    /// reservation does not exist.
    pub async fn get_candidate(&self, reservation_id: i32) -> AppResult<Option<ReviewCandidate>> {
        let row = sqlx::query(
            r#"
            SELECT r.status, r.end_date, r.borrower_id, t.owner_id,
                   (rv.id IS NOT NULL) AS has_review
            FROM reservations r
            JOIN tools t ON r.tool_id = t.id
            LEFT JOIN reviews rv ON rv.reservation_id = r.id
            WHERE r.id = $1
            "#,
        )
        .bind(reservation_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| {
            let status: String = r.get("status");
            let status = reservations::parse_status(&status)?;
            Ok(ReviewCandidate {
                status,
                end_date: r.get("end_date"),
                borrower_id: r.get("borrower_id"),
                owner_id: r.get("owner_id"),
                has_review: r.get("has_review"),
            })
        })
        .transpose()
    }

    /// Insert a review. The UNIQUE constraint on reservation_id is the last
    /// line of defense against two participants racing: the loser surfaces
    /// as NotEligible, same as if the eligibility check had caught it.
    pub async fn insert(
        &self,
        reservation_id: i32,
        reviewer_id: i32,
        rating: i32,
        comment: Option<&str>,
    ) -> AppResult<i32> {
        let result = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO reviews (reservation_id, reviewer_id, rating, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(reservation_id)
        .bind(reviewer_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(id) => Ok(id),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(
                AppError::NotEligible("Reservation has already been reviewed".to_string()),
            ),
            Err(e) => Err(e.into()),
        }
    }
}

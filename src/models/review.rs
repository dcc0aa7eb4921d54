//! Review model and the post-completion eligibility rule

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::reservation::ReservationStatus;

/// Review row (immutable once created)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Review {
    pub id: i32,
    pub reservation_id: i32,
    pub reviewer_id: i32,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Create review request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReview {
    /// Star rating, 1 to 5 inclusive
    pub rating: i32,
    #[validate(length(max = 2000, message = "Comment must be at most 2000 characters"))]
    pub comment: Option<String>,
}

/// Everything the eligibility rule needs to know about a reservation.
#[derive(Debug, Clone, Copy)]
pub struct ReviewCandidate {
    pub status: ReservationStatus,
    pub end_date: NaiveDate,
    pub borrower_id: i32,
    pub owner_id: i32,
    pub has_review: bool,
}

impl ReviewCandidate {
    /// A user may review iff the reservation is completed, its end date is
    /// strictly past, the user is a participant, and nobody has reviewed it
    /// yet. One review per reservation total — first reviewer wins.
    pub fn eligible(&self, user_id: i32, today: NaiveDate) -> bool {
        self.status == ReservationStatus::Completed
            && self.end_date < today
            && (user_id == self.borrower_id || user_id == self.owner_id)
            && !self.has_review
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn candidate() -> ReviewCandidate {
        ReviewCandidate {
            status: ReservationStatus::Completed,
            end_date: d(2024, 3, 17),
            borrower_id: 2,
            owner_id: 1,
            has_review: false,
        }
    }

    const TODAY: fn() -> NaiveDate = || d(2024, 3, 20);

    #[test]
    fn test_borrower_and_owner_are_eligible() {
        let c = candidate();
        assert!(c.eligible(2, TODAY()));
        assert!(c.eligible(1, TODAY()));
    }

    #[test]
    fn test_third_party_is_not_eligible() {
        assert!(!candidate().eligible(99, TODAY()));
    }

    #[test]
    fn test_requires_completed_status() {
        for status in [
            ReservationStatus::Requested,
            ReservationStatus::Accepted,
            ReservationStatus::Declined,
            ReservationStatus::Cancelled,
        ] {
            let c = ReviewCandidate { status, ..candidate() };
            assert!(!c.eligible(2, TODAY()));
        }
    }

    #[test]
    fn test_end_date_must_be_strictly_past() {
        let c = ReviewCandidate { end_date: TODAY(), ..candidate() };
        assert!(!c.eligible(2, TODAY()));
    }

    #[test]
    fn test_existing_review_blocks_both_participants() {
        let c = ReviewCandidate { has_review: true, ..candidate() };
        assert!(!c.eligible(2, TODAY()));
        assert!(!c.eligible(1, TODAY()));
    }
}

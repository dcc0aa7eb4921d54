//! Reservation model, lifecycle state machine and date-range algebra

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// ReservationStatus
// ---------------------------------------------------------------------------

/// Reservation lifecycle states (stored as lowercase text)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Requested,
    Accepted,
    Declined,
    Cancelled,
    Completed,
}

/// Which participant may trigger a given transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorRole {
    Owner,
    Borrower,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Requested => "requested",
            ReservationStatus::Accepted => "accepted",
            ReservationStatus::Declined => "declined",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "requested" => Some(ReservationStatus::Requested),
            "accepted" => Some(ReservationStatus::Accepted),
            "declined" => Some(ReservationStatus::Declined),
            "cancelled" => Some(ReservationStatus::Cancelled),
            "completed" => Some(ReservationStatus::Completed),
            _ => None,
        }
    }

    /// Declined, cancelled and completed reservations have no outgoing edges.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReservationStatus::Declined
                | ReservationStatus::Cancelled
                | ReservationStatus::Completed
        )
    }

    /// Transition table for caller-driven status changes: maps
    /// `(current, requested)` to the role allowed to trigger it.
    /// `None` means the edge does not exist. Completion is not listed —
    /// it only happens through the end-date sweep, never on request.
    pub fn transition_role(from: Self, to: Self) -> Option<ActorRole> {
        use ReservationStatus::*;
        match (from, to) {
            (Requested, Accepted) => Some(ActorRole::Owner),
            (Requested, Declined) => Some(ActorRole::Owner),
            (Requested, Cancelled) => Some(ActorRole::Borrower),
            (Accepted, Cancelled) => Some(ActorRole::Borrower),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DateRange
// ---------------------------------------------------------------------------

/// A closed calendar-day interval: both endpoints are booked days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Closed intervals `[a,b]` and `[c,d]` overlap iff `a <= d && c <= b`.
    /// Boundary-inclusive: ranges sharing a single day conflict.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Every calendar day the range occupies, endpoints included.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take_while({
            let end = self.end;
            move |d| *d <= end
        })
    }

    /// Validate a requested booking range against ordering and staleness
    /// rules. `allow_same_day` controls whether `start == today` passes.
    pub fn validate_request(
        &self,
        today: NaiveDate,
        allow_same_day: bool,
    ) -> Result<(), &'static str> {
        if self.end < self.start {
            return Err("end date must not precede start date");
        }
        let min_start = if allow_same_day {
            today
        } else {
            today.succ_opt().unwrap_or(today)
        };
        if self.start < min_start {
            return Err("start date is in the past");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Reservation row
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Reservation {
    pub id: i32,
    pub tool_id: i32,
    pub borrower_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reservation with display joins (tool title, participant names)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReservationDetails {
    pub id: i32,
    pub tool_id: i32,
    pub tool_title: String,
    pub owner_id: i32,
    pub owner_username: String,
    pub borrower_id: i32,
    pub borrower_username: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReservationDetails {
    pub fn range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }
}

/// An accepted reservation's span, as consumed by the conflict detector
#[derive(Debug, Clone, Copy)]
pub struct AcceptedSpan {
    pub id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl AcceptedSpan {
    pub fn range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }

    /// Does this span block the candidate range? A reservation never blocks
    /// itself: pass its own id as `exclude_id` during accept re-validation.
    pub fn blocks(&self, candidate: &DateRange, exclude_id: Option<i32>) -> bool {
        exclude_id != Some(self.id) && self.range().overlaps(candidate)
    }
}

/// New reservation request (borrower comes from the authenticated actor)
#[derive(Debug, Deserialize)]
pub struct CreateReservation {
    pub tool_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_overlap_shared_boundary_day() {
        let a = DateRange::new(d(2024, 3, 1), d(2024, 3, 3));
        let b = DateRange::new(d(2024, 3, 3), d(2024, 3, 5));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_overlap_adjacent_days_do_not_conflict() {
        let a = DateRange::new(d(2024, 3, 1), d(2024, 3, 3));
        let b = DateRange::new(d(2024, 3, 4), d(2024, 3, 6));
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn test_overlap_containment_and_identity() {
        let outer = DateRange::new(d(2024, 3, 1), d(2024, 3, 10));
        let inner = DateRange::new(d(2024, 3, 4), d(2024, 3, 5));
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
        assert!(outer.overlaps(&outer));
    }

    #[test]
    fn test_days_expansion_covers_interior() {
        let r = DateRange::new(d(2024, 3, 15), d(2024, 3, 17));
        let days: Vec<NaiveDate> = r.days().collect();
        assert_eq!(days, vec![d(2024, 3, 15), d(2024, 3, 16), d(2024, 3, 17)]);
    }

    #[test]
    fn test_days_single_day_range() {
        let r = DateRange::new(d(2024, 3, 15), d(2024, 3, 15));
        assert_eq!(r.days().count(), 1);
    }

    #[test]
    fn test_validate_request_rejects_inverted_range() {
        let r = DateRange::new(d(2024, 3, 5), d(2024, 3, 4));
        assert!(r.validate_request(d(2024, 3, 1), true).is_err());
    }

    #[test]
    fn test_validate_request_same_day_policy() {
        let today = d(2024, 3, 5);
        let r = DateRange::new(today, d(2024, 3, 7));
        assert!(r.validate_request(today, true).is_ok());
        assert!(r.validate_request(today, false).is_err());
        // Strictly past start always fails.
        let past = DateRange::new(d(2024, 3, 4), d(2024, 3, 7));
        assert!(past.validate_request(today, true).is_err());
    }

    #[test]
    fn test_span_blocks_overlapping_candidate() {
        let span = AcceptedSpan {
            id: 7,
            start_date: d(2024, 3, 1),
            end_date: d(2024, 3, 3),
        };
        let candidate = DateRange::new(d(2024, 3, 3), d(2024, 3, 5));
        assert!(span.blocks(&candidate, None));
        assert!(!span.blocks(&DateRange::new(d(2024, 3, 4), d(2024, 3, 6)), None));
    }

    #[test]
    fn test_span_never_blocks_itself() {
        let span = AcceptedSpan {
            id: 7,
            start_date: d(2024, 3, 1),
            end_date: d(2024, 3, 3),
        };
        let candidate = DateRange::new(d(2024, 3, 2), d(2024, 3, 4));
        assert!(!span.blocks(&candidate, Some(7)));
        assert!(span.blocks(&candidate, Some(8)));
    }

    #[test]
    fn test_transition_table_legal_edges() {
        use ReservationStatus::*;
        assert_eq!(ReservationStatus::transition_role(Requested, Accepted), Some(ActorRole::Owner));
        assert_eq!(ReservationStatus::transition_role(Requested, Declined), Some(ActorRole::Owner));
        assert_eq!(ReservationStatus::transition_role(Requested, Cancelled), Some(ActorRole::Borrower));
        assert_eq!(ReservationStatus::transition_role(Accepted, Cancelled), Some(ActorRole::Borrower));
    }

    #[test]
    fn test_transition_table_terminal_states_have_no_edges() {
        use ReservationStatus::*;
        for from in [Declined, Cancelled, Completed] {
            for to in [Requested, Accepted, Declined, Cancelled, Completed] {
                assert_eq!(ReservationStatus::transition_role(from, to), None);
            }
        }
    }

    #[test]
    fn test_completion_is_not_a_requestable_transition() {
        use ReservationStatus::*;
        assert_eq!(ReservationStatus::transition_role(Accepted, Completed), None);
        assert_eq!(ReservationStatus::transition_role(Requested, Completed), None);
    }

    #[test]
    fn test_status_string_round_trip() {
        for s in [
            ReservationStatus::Requested,
            ReservationStatus::Accepted,
            ReservationStatus::Declined,
            ReservationStatus::Cancelled,
            ReservationStatus::Completed,
        ] {
            assert_eq!(ReservationStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(ReservationStatus::parse("pending"), None);
    }

    #[test]
    fn test_terminal_flags() {
        assert!(!ReservationStatus::Requested.is_terminal());
        assert!(!ReservationStatus::Accepted.is_terminal());
        assert!(ReservationStatus::Declined.is_terminal());
        assert!(ReservationStatus::Cancelled.is_terminal());
        assert!(ReservationStatus::Completed.is_terminal());
    }
}

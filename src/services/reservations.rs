//! Reservation lifecycle engine
//!
//! Owns the reservation state machine and the conflict detector. Conflicts
//! are checked against ACCEPTED reservations only: overlapping REQUESTED
//! requests may coexist, since at most one of them can ultimately be
//! accepted. The check runs once at request time and again at accept time
//! (excluding the reservation itself), closing the window where two
//! requests for the same dates could both be approved.

use std::collections::BTreeSet;

use chrono::{NaiveDate, Utc};
use serde_json::json;

use crate::{
    config::ReservationPolicy,
    error::{AppError, AppResult},
    models::reservation::{
        ActorRole, CreateReservation, DateRange, ReservationDetails, ReservationStatus,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct ReservationsService {
    repository: Repository,
    policy: ReservationPolicy,
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

impl ReservationsService {
    pub fn new(repository: Repository, policy: ReservationPolicy) -> Self {
        Self { repository, policy }
    }

    /// Request a reservation. Created in REQUESTED; the owner decides later.
    pub async fn create_reservation(
        &self,
        borrower_id: i32,
        request: &CreateReservation,
    ) -> AppResult<ReservationDetails> {
        // An inactive tool is not visible for booking.
        let tool = self
            .repository
            .tools
            .get_ref(request.tool_id)
            .await?
            .filter(|t| t.is_active)
            .ok_or_else(|| {
                AppError::NotFound(format!("Tool with id {} not found", request.tool_id))
            })?;

        if tool.owner_id == borrower_id {
            return Err(AppError::InvalidInput(
                "You cannot reserve your own tool".to_string(),
            ));
        }

        let range = DateRange::new(request.start_date, request.end_date);
        range
            .validate_request(today(), self.policy.allow_same_day_start)
            .map_err(|msg| AppError::InvalidInput(msg.to_string()))?;

        let reservation_id = self
            .repository
            .reservations
            .create_requested(request.tool_id, borrower_id, range)
            .await?;

        self.repository
            .audit
            .log_action(
                Some(borrower_id),
                "reservation_requested",
                json!({ "reservation_id": reservation_id, "tool_id": request.tool_id }),
            )
            .await;
        tracing::info!(
            "Reservation {} requested for tool {} by user {}",
            reservation_id,
            request.tool_id,
            borrower_id
        );

        self.repository.reservations.get_details(reservation_id).await
    }

    /// Drive a caller-requested transition: accept/decline by the owner,
    /// cancel by the borrower. The current status is re-fetched, the edge is
    /// checked against the transition table, and acceptance re-validates
    /// conflicts atomically with the status write.
    pub async fn update_status(
        &self,
        reservation_id: i32,
        actor_id: i32,
        new_status: ReservationStatus,
    ) -> AppResult<ReservationDetails> {
        let current = self.repository.reservations.get_details(reservation_id).await?;

        let role = ReservationStatus::transition_role(current.status, new_status).ok_or_else(
            || {
                AppError::InvalidTransition(format!(
                    "Cannot move a {} reservation to {}",
                    current.status, new_status
                ))
            },
        )?;

        let authorized = match role {
            ActorRole::Owner => actor_id == current.owner_id,
            ActorRole::Borrower => actor_id == current.borrower_id,
        };
        if !authorized {
            return Err(AppError::Forbidden(format!(
                "Only the {} may {} this reservation",
                match role {
                    ActorRole::Owner => "tool owner",
                    ActorRole::Borrower => "borrower",
                },
                new_status
            )));
        }

        let updated = if new_status == ReservationStatus::Accepted {
            // If a competing reservation was accepted first, this fails
            // with ToolUnavailable and the row stays REQUESTED.
            self.repository
                .reservations
                .try_accept(reservation_id, current.tool_id, current.range())
                .await?
        } else {
            self.repository
                .reservations
                .conditional_update_status(reservation_id, current.status, new_status)
                .await?
        };

        if !updated {
            // The stored status changed between the fetch and the write; the
            // requested edge no longer starts from the current state.
            return Err(AppError::InvalidTransition(
                "Reservation status changed concurrently".to_string(),
            ));
        }

        self.repository
            .audit
            .log_action(
                Some(actor_id),
                &format!("reservation_{}", new_status),
                json!({ "reservation_id": reservation_id }),
            )
            .await;
        tracing::info!(
            "Reservation {} moved to {} by user {}",
            reservation_id,
            new_status,
            actor_id
        );

        self.repository.reservations.get_details(reservation_id).await
    }

    /// Idempotent sweep: ACCEPTED becomes COMPLETED once the end date is
    /// strictly past. Returns whether a transition happened.
    pub async fn mark_completed(&self, reservation_id: i32) -> AppResult<bool> {
        // Surface a missing id as NotFound rather than a silent no-op.
        self.repository.reservations.get_by_id(reservation_id).await?;
        self.repository
            .reservations
            .complete_due(reservation_id, today())
            .await
    }

    /// Get a reservation with display joins
    pub async fn get(&self, reservation_id: i32) -> AppResult<ReservationDetails> {
        self.repository.reservations.get_details(reservation_id).await
    }

    /// List a user's reservations as borrower or as tool owner, sweeping
    /// due completions first so listings never show stale ACCEPTED rows.
    pub async fn list_for_user(
        &self,
        user_id: i32,
        as_borrower: bool,
    ) -> AppResult<Vec<ReservationDetails>> {
        self.repository
            .reservations
            .complete_due_for_user(user_id, today())
            .await?;
        self.repository.reservations.list_for_user(user_id, as_borrower).await
    }

    /// Does the candidate range overlap any accepted reservation for the
    /// tool? Read-only; `exclude_reservation_id` keeps a reservation from
    /// conflicting with itself during re-validation.
    pub async fn has_conflict(
        &self,
        tool_id: i32,
        start_date: NaiveDate,
        end_date: NaiveDate,
        exclude_reservation_id: Option<i32>,
    ) -> AppResult<bool> {
        let candidate = DateRange::new(start_date, end_date);
        let spans = self
            .repository
            .reservations
            .list_accepted_spans(tool_id)
            .await?;

        Ok(spans
            .iter()
            .any(|s| s.blocks(&candidate, exclude_reservation_id)))
    }

    /// Every calendar day occupied by an accepted reservation of the tool,
    /// for calendar display. Days are deduplicated and sorted.
    pub async fn get_blocked_dates(&self, tool_id: i32) -> AppResult<Vec<NaiveDate>> {
        let spans = self
            .repository
            .reservations
            .list_accepted_spans(tool_id)
            .await?;

        let days: BTreeSet<NaiveDate> =
            spans.iter().flat_map(|s| s.range().days()).collect();
        Ok(days.into_iter().collect())
    }
}

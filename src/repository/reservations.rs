//! Reservations repository for database operations
//!
//! Every conflict-check-then-write runs inside one transaction that takes a
//! row lock on the tool, so two overlapping bookings can never both commit.
//! Status writes are conditional on the expected current status
//! (compare-and-set), never blind updates.

use chrono::NaiveDate;
use sqlx::{Pool, Postgres, Row, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::reservation::{
        AcceptedSpan, DateRange, Reservation, ReservationDetails, ReservationStatus,
    },
};

#[derive(Clone)]
pub struct ReservationsRepository {
    pool: Pool<Postgres>,
}

pub(crate) fn parse_status(s: &str) -> AppResult<ReservationStatus> {
    ReservationStatus::parse(s)
        .ok_or_else(|| AppError::Internal(format!("unknown reservation status '{}'", s)))
}

fn row_to_reservation(row: &sqlx::postgres::PgRow) -> AppResult<Reservation> {
    Ok(Reservation {
        id: row.get("id"),
        tool_id: row.get("tool_id"),
        borrower_id: row.get("borrower_id"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        status: parse_status(row.get("status"))?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn row_to_details(row: &sqlx::postgres::PgRow) -> AppResult<ReservationDetails> {
    Ok(ReservationDetails {
        id: row.get("id"),
        tool_id: row.get("tool_id"),
        tool_title: row.get("tool_title"),
        owner_id: row.get("owner_id"),
        owner_username: row.get("owner_username"),
        borrower_id: row.get("borrower_id"),
        borrower_username: row.get("borrower_username"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        status: parse_status(row.get("status"))?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Lock the tool row, serializing concurrent booking attempts for it.
/// Returns the active flag so callers can gate on it under the lock.
async fn lock_tool(tx: &mut Transaction<'_, Postgres>, tool_id: i32) -> AppResult<bool> {
    let row = sqlx::query("SELECT is_active FROM tools WHERE id = $1 FOR UPDATE")
        .bind(tool_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Tool with id {} not found", tool_id)))?;
    Ok(row.get("is_active"))
}

/// Symmetric closed-interval overlap test against accepted reservations,
/// evaluated inside the caller's transaction.
async fn accepted_conflict_exists(
    tx: &mut Transaction<'_, Postgres>,
    tool_id: i32,
    range: DateRange,
    exclude_reservation_id: Option<i32>,
) -> AppResult<bool> {
    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM reservations
            WHERE tool_id = $1
              AND status = 'accepted'
              AND start_date <= $3
              AND end_date >= $2
              AND ($4::int IS NULL OR id != $4)
        )
        "#,
    )
    .bind(tool_id)
    .bind(range.start)
    .bind(range.end)
    .bind(exclude_reservation_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(exists)
}

impl ReservationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get reservation by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Reservation> {
        let row = sqlx::query("SELECT * FROM reservations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reservation with id {} not found", id)))?;

        row_to_reservation(&row)
    }

    /// Get reservation with tool and participant display info
    pub async fn get_details(&self, id: i32) -> AppResult<ReservationDetails> {
        let row = sqlx::query(
            r#"
            SELECT r.*, t.title AS tool_title, t.owner_id,
                   b.username AS borrower_username,
                   o.username AS owner_username
            FROM reservations r
            JOIN tools t ON r.tool_id = t.id
            JOIN users b ON r.borrower_id = b.id
            JOIN users o ON t.owner_id = o.id
            WHERE r.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Reservation with id {} not found", id)))?;

        row_to_details(&row)
    }

    /// Spans of all accepted reservations for a tool, the comparison set of
    /// the conflict detector. Read-only, no locking; exclusion is the
    /// caller's business.
    pub async fn list_accepted_spans(&self, tool_id: i32) -> AppResult<Vec<AcceptedSpan>> {
        let rows = sqlx::query(
            r#"
            SELECT id, start_date, end_date FROM reservations
            WHERE tool_id = $1
              AND status = 'accepted'
            ORDER BY start_date
            "#,
        )
        .bind(tool_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|r| AcceptedSpan {
                id: r.get("id"),
                start_date: r.get("start_date"),
                end_date: r.get("end_date"),
            })
            .collect())
    }

    /// Atomically check for conflicts with accepted reservations and insert
    /// a new REQUESTED reservation. Overlapping REQUESTED rows are allowed;
    /// they compete for the slot and lose at accept time.
    pub async fn create_requested(
        &self,
        tool_id: i32,
        borrower_id: i32,
        range: DateRange,
    ) -> AppResult<i32> {
        let mut tx = self.pool.begin().await?;

        // Re-checked under the lock: the service's visibility check raced
        // with a possible concurrent deactivation.
        if !lock_tool(&mut tx, tool_id).await? {
            return Err(AppError::NotFound(format!(
                "Tool with id {} not found",
                tool_id
            )));
        }

        if accepted_conflict_exists(&mut tx, tool_id, range, None).await? {
            return Err(AppError::ToolUnavailable(
                "Tool is already booked for the requested dates".to_string(),
            ));
        }

        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO reservations (tool_id, borrower_id, start_date, end_date, status)
            VALUES ($1, $2, $3, $4, 'requested')
            RETURNING id
            "#,
        )
        .bind(tool_id)
        .bind(borrower_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(id)
    }

    /// Atomically re-validate conflicts (excluding the reservation itself)
    /// and flip REQUESTED to ACCEPTED. Returns false if the stored status
    /// was no longer REQUESTED when the write ran.
    pub async fn try_accept(&self, id: i32, tool_id: i32, range: DateRange) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;
        lock_tool(&mut tx, tool_id).await?;

        if accepted_conflict_exists(&mut tx, tool_id, range, Some(id)).await? {
            return Err(AppError::ToolUnavailable(
                "Another accepted reservation overlaps these dates".to_string(),
            ));
        }

        let result = sqlx::query(
            r#"
            UPDATE reservations SET status = 'accepted', updated_at = NOW()
            WHERE id = $1 AND status = 'requested'
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result.rows_affected() == 1)
    }

    /// Compare-and-set status update. Returns false if the stored status
    /// did not match `expected`.
    pub async fn conditional_update_status(
        &self,
        id: i32,
        expected: ReservationStatus,
        new: ReservationStatus,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE reservations SET status = $1, updated_at = NOW()
            WHERE id = $2 AND status = $3
            "#,
        )
        .bind(new.as_str())
        .bind(id)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Flip an accepted reservation to completed once its end date has
    /// passed. Idempotent: a no-op (false) if already completed, not
    /// accepted, or the end date has not passed.
    pub async fn complete_due(&self, id: i32, today: NaiveDate) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE reservations SET status = 'completed', updated_at = NOW()
            WHERE id = $1 AND status = 'accepted' AND end_date < $2
            "#,
        )
        .bind(id)
        .bind(today)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Sweep all of a user's due accepted reservations (as borrower or as
    /// tool owner) to completed. Run lazily before listing.
    pub async fn complete_due_for_user(&self, user_id: i32, today: NaiveDate) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE reservations SET status = 'completed', updated_at = NOW()
            WHERE status = 'accepted'
              AND end_date < $2
              AND (borrower_id = $1
                   OR tool_id IN (SELECT id FROM tools WHERE owner_id = $1))
            "#,
        )
        .bind(user_id)
        .bind(today)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Reservations for a user, either the ones they requested or the ones
    /// on tools they own.
    pub async fn list_for_user(
        &self,
        user_id: i32,
        as_borrower: bool,
    ) -> AppResult<Vec<ReservationDetails>> {
        let filter = if as_borrower {
            "r.borrower_id = $1"
        } else {
            "t.owner_id = $1"
        };

        let query = format!(
            r#"
            SELECT r.*, t.title AS tool_title, t.owner_id,
                   b.username AS borrower_username,
                   o.username AS owner_username
            FROM reservations r
            JOIN tools t ON r.tool_id = t.id
            JOIN users b ON r.borrower_id = b.id
            JOIN users o ON t.owner_id = o.id
            WHERE {}
            ORDER BY r.created_at DESC
            "#,
            filter
        );

        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_details).collect()
    }
}

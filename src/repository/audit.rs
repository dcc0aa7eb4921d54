//! Audit log sink
//!
//! Fire-and-forget: a failed audit write must never abort or delay the
//! operation being audited, so errors are logged and swallowed here.

use sqlx::{Pool, Postgres};

#[derive(Clone)]
pub struct AuditRepository {
    pool: Pool<Postgres>,
}

impl AuditRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Record an action in the audit log
    pub async fn log_action(
        &self,
        actor_id: Option<i32>,
        action_type: &str,
        payload: serde_json::Value,
    ) {
        let result = sqlx::query(
            "INSERT INTO audit_logs (actor_id, action_type, payload) VALUES ($1, $2, $3)",
        )
        .bind(actor_id)
        .bind(action_type)
        .bind(payload)
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            tracing::warn!("Failed to write audit log for '{}': {}", action_type, e);
        }
    }
}

//! Repository layer for database operations

pub mod audit;
pub mod reservations;
pub mod reviews;
pub mod tools;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub tools: tools::ToolsRepository,
    pub reservations: reservations::ReservationsRepository,
    pub reviews: reviews::ReviewsRepository,
    pub audit: audit::AuditRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            tools: tools::ToolsRepository::new(pool.clone()),
            reservations: reservations::ReservationsRepository::new(pool.clone()),
            reviews: reviews::ReviewsRepository::new(pool.clone()),
            audit: audit::AuditRepository::new(pool.clone()),
            pool,
        }
    }
}

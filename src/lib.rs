//! ToolShare Server
//!
//! A peer-to-peer tool lending marketplace backend: users list tools,
//! other users request date-ranged reservations, owners approve or
//! decline, and completed loans can be reviewed. Exposes a REST JSON API.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pool: sqlx::PgPool,
    pub services: Arc<services::Services>,
}

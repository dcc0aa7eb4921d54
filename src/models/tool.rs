//! Tool (listing) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Physical condition of a listed tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ToolCondition {
    New,
    Good,
    Fair,
}

impl ToolCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolCondition::New => "new",
            ToolCondition::Good => "good",
            ToolCondition::Fair => "fair",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(ToolCondition::New),
            "good" => Some(ToolCondition::Good),
            "fair" => Some(ToolCondition::Fair),
            _ => None,
        }
    }
}

impl std::fmt::Display for ToolCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tool with owner display info
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ToolDetails {
    pub id: i32,
    pub owner_id: i32,
    pub owner_username: String,
    pub owner_full_name: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub condition: ToolCondition,
    pub image_paths: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Owner identity and active flag, the only tool fields the reservation
/// engine reads.
#[derive(Debug, Clone, Copy)]
pub struct ToolRef {
    pub owner_id: i32,
    pub is_active: bool,
}

/// Create tool request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTool {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(length(min = 1, max = 100, message = "Category must be 1-100 characters"))]
    pub category: String,
    pub condition: ToolCondition,
    #[serde(default)]
    pub image_paths: Vec<String>,
}

/// Update tool request (owner only)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTool {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(length(min = 1, max = 100, message = "Category must be 1-100 characters"))]
    pub category: String,
    pub condition: ToolCondition,
    #[serde(default)]
    pub image_paths: Vec<String>,
}

/// Tool listing filters
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ToolQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub owner_id: Option<i32>,
    /// Defaults to true: deactivated tools are hidden from browse
    pub active_only: Option<bool>,
}

//! Tool listing service

use serde_json::json;

use crate::{
    error::{AppError, AppResult},
    models::tool::{CreateTool, ToolDetails, ToolQuery, UpdateTool},
    repository::Repository,
};

#[derive(Clone)]
pub struct ToolsService {
    repository: Repository,
}

impl ToolsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List tools with optional filters
    pub async fn list(&self, query: &ToolQuery) -> AppResult<Vec<ToolDetails>> {
        self.repository.tools.list(query).await
    }

    /// Get a tool with owner info
    pub async fn get(&self, tool_id: i32) -> AppResult<ToolDetails> {
        self.repository.tools.get_details(tool_id).await
    }

    /// Create a new tool listing
    pub async fn create(&self, owner_id: i32, tool: &CreateTool) -> AppResult<ToolDetails> {
        let tool_id = self.repository.tools.create(owner_id, tool).await?;

        self.repository
            .audit
            .log_action(
                Some(owner_id),
                "tool_created",
                json!({ "tool_id": tool_id, "title": tool.title, "category": tool.category }),
            )
            .await;
        tracing::info!("Tool created: {} (ID: {}) by user {}", tool.title, tool_id, owner_id);

        self.repository.tools.get_details(tool_id).await
    }

    /// Update a tool listing. Only the owner may update.
    pub async fn update(
        &self,
        tool_id: i32,
        actor_id: i32,
        tool: &UpdateTool,
    ) -> AppResult<ToolDetails> {
        self.check_ownership(tool_id, actor_id).await?;
        self.repository.tools.update(tool_id, tool).await?;

        self.repository
            .audit
            .log_action(
                Some(actor_id),
                "tool_updated",
                json!({ "tool_id": tool_id, "title": tool.title }),
            )
            .await;

        self.repository.tools.get_details(tool_id).await
    }

    /// Deactivate a tool listing. Only the owner may deactivate; the row is
    /// kept so reservation and review history stays intact.
    pub async fn deactivate(&self, tool_id: i32, actor_id: i32) -> AppResult<()> {
        self.check_ownership(tool_id, actor_id).await?;
        self.repository.tools.deactivate(tool_id).await?;

        self.repository
            .audit
            .log_action(Some(actor_id), "tool_deactivated", json!({ "tool_id": tool_id }))
            .await;
        tracing::info!("Tool {} deactivated by user {}", tool_id, actor_id);

        Ok(())
    }

    /// Distinct categories across active tools
    pub async fn categories(&self) -> AppResult<Vec<String>> {
        self.repository.tools.categories().await
    }

    async fn check_ownership(&self, tool_id: i32, actor_id: i32) -> AppResult<()> {
        let tool = self
            .repository
            .tools
            .get_ref(tool_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tool with id {} not found", tool_id)))?;

        if tool.owner_id != actor_id {
            return Err(AppError::Forbidden(
                "Only the tool owner may modify this listing".to_string(),
            ));
        }
        Ok(())
    }
}

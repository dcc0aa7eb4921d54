//! Tools repository for database operations

use sqlx::{Pool, Postgres, QueryBuilder, Row};

use crate::{
    error::{AppError, AppResult},
    models::tool::{CreateTool, ToolCondition, ToolDetails, ToolQuery, ToolRef, UpdateTool},
};

#[derive(Clone)]
pub struct ToolsRepository {
    pool: Pool<Postgres>,
}

fn row_to_details(row: &sqlx::postgres::PgRow) -> AppResult<ToolDetails> {
    let condition: String = row.get("condition");
    let condition = ToolCondition::parse(&condition)
        .ok_or_else(|| AppError::Internal(format!("unknown tool condition '{}'", condition)))?;
    let image_paths: serde_json::Value = row.get("image_paths");
    let image_paths: Vec<String> = serde_json::from_value(image_paths).unwrap_or_default();

    Ok(ToolDetails {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        owner_username: row.get("username"),
        owner_full_name: row.get("full_name"),
        title: row.get("title"),
        description: row.get("description"),
        category: row.get("category"),
        condition,
        image_paths,
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

impl ToolsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Create a new tool listing
    pub async fn create(&self, owner_id: i32, tool: &CreateTool) -> AppResult<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO tools (owner_id, title, description, category, condition, image_paths)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(owner_id)
        .bind(&tool.title)
        .bind(&tool.description)
        .bind(&tool.category)
        .bind(tool.condition.as_str())
        .bind(serde_json::json!(tool.image_paths))
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Get tool by ID with owner information
    pub async fn get_details(&self, id: i32) -> AppResult<ToolDetails> {
        let row = sqlx::query(
            r#"
            SELECT t.*, u.username, u.full_name
            FROM tools t
            JOIN users u ON t.owner_id = u.id
            WHERE t.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Tool with id {} not found", id)))?;

        row_to_details(&row)
    }

    /// Owner identity and active flag, the only fields the reservation
    /// engine needs. `None` if the tool does not exist.
    pub async fn get_ref(&self, id: i32) -> AppResult<Option<ToolRef>> {
        let row = sqlx::query("SELECT owner_id, is_active FROM tools WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| ToolRef {
            owner_id: r.get("owner_id"),
            is_active: r.get("is_active"),
        }))
    }

    /// List tools with optional category/search/owner filters
    pub async fn list(&self, query: &ToolQuery) -> AppResult<Vec<ToolDetails>> {
        let mut builder = QueryBuilder::<Postgres>::new(
            r#"
            SELECT t.*, u.username, u.full_name
            FROM tools t
            JOIN users u ON t.owner_id = u.id
            WHERE 1=1
            "#,
        );

        if query.active_only.unwrap_or(true) {
            builder.push(" AND t.is_active = TRUE");
        }
        if let Some(ref category) = query.category {
            builder.push(" AND t.category = ");
            builder.push_bind(category);
        }
        if let Some(ref search) = query.search {
            let pattern = format!("%{}%", search);
            builder.push(" AND (t.title ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR t.description ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }
        if let Some(owner_id) = query.owner_id {
            builder.push(" AND t.owner_id = ");
            builder.push_bind(owner_id);
        }
        builder.push(" ORDER BY t.created_at DESC");

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_details).collect()
    }

    /// Update a tool listing (ownership is checked by the service)
    pub async fn update(&self, id: i32, tool: &UpdateTool) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE tools
            SET title = $1, description = $2, category = $3, condition = $4,
                image_paths = $5, updated_at = NOW()
            WHERE id = $6
            "#,
        )
        .bind(&tool.title)
        .bind(&tool.description)
        .bind(&tool.category)
        .bind(tool.condition.as_str())
        .bind(serde_json::json!(tool.image_paths))
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Soft-deactivate a tool. Tools are never hard-deleted: reservation
    /// and review history keeps referring to them.
    pub async fn deactivate(&self, id: i32) -> AppResult<()> {
        sqlx::query("UPDATE tools SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Distinct categories across active tools
    pub async fn categories(&self) -> AppResult<Vec<String>> {
        let categories = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT category FROM tools WHERE is_active = TRUE ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }
}

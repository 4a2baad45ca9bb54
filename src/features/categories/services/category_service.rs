use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::CategoryResponseDto;
use crate::features::categories::models::Category;

/// Service for category lookups
pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all categories
    pub async fn list(&self) -> Result<Vec<CategoryResponseDto>> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, created_at
            FROM categories
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list categories: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(categories.into_iter().map(|c| c.into()).collect())
    }
}

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{handle_db_error, AppError, Result};
use crate::features::categories::models::{Category, CategoryDependents};

/// Persistence for categories
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn insert(&self, name: &str) -> Result<Category>;

    /// All categories, newest first
    async fn list(&self) -> Result<Vec<Category>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>>;

    /// Case-insensitive lookup by name
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>>;

    async fn dependents(&self, id: Uuid) -> Result<CategoryDependents>;

    /// Returns false when no row was deleted
    async fn delete(&self, id: Uuid) -> Result<bool>;

    async fn count(&self) -> Result<i64>;
}

pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn insert(&self, name: &str) -> Result<Category> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name)
            VALUES ($1)
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "Category already exists."))
    }

    async fn list(&self) -> Result<Vec<Category>> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM categories
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list categories: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get category by id: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM categories
            WHERE LOWER(name) = LOWER($1)
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get category by name: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn dependents(&self, id: Uuid) -> Result<CategoryDependents> {
        sqlx::query_as::<_, CategoryDependents>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM subcategories WHERE category_id = $1) AS subcategories,
                (SELECT COUNT(*) FROM products WHERE category_id = $1) AS products
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count category dependents: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                handle_db_error(e, "Category still has subcategories or products.")
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count categories: {:?}", e);
                AppError::Database(e)
            })
    }
}

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{handle_db_error, handle_reference_error, AppError, Result};
use crate::features::subcategories::models::{
    NewSubcategory, Subcategory, SubcategoryChanges, SubcategoryFilter,
};

/// Persistence for subcategories
#[async_trait]
pub trait SubcategoryRepository: Send + Sync {
    async fn insert(&self, new: NewSubcategory) -> Result<Subcategory>;

    /// Matching subcategories, newest first
    async fn list(&self, filter: &SubcategoryFilter) -> Result<Vec<Subcategory>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Subcategory>>;

    /// Exact (case-sensitive) name match within one category
    async fn exists_in_category(&self, name: &str, category_id: Uuid) -> Result<bool>;

    /// Returns `None` when the subcategory does not exist
    async fn update(&self, id: Uuid, changes: SubcategoryChanges) -> Result<Option<Subcategory>>;

    async fn product_count(&self, id: Uuid) -> Result<i64>;

    /// Returns false when no row was deleted
    async fn delete(&self, id: Uuid) -> Result<bool>;

    async fn count(&self) -> Result<i64>;
}

pub struct PgSubcategoryRepository {
    pool: PgPool,
}

impl PgSubcategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_WITH_CATEGORY: &str = r#"
    SELECT s.id, s.name, s.category_id, c.name AS category_name,
           s.created_by, s.created_at, s.updated_at
    FROM subcategories s
    JOIN categories c ON c.id = s.category_id
"#;

#[async_trait]
impl SubcategoryRepository for PgSubcategoryRepository {
    async fn insert(&self, new: NewSubcategory) -> Result<Subcategory> {
        sqlx::query_as::<_, Subcategory>(
            r#"
            WITH inserted AS (
                INSERT INTO subcategories (name, category_id, created_by)
                VALUES ($1, $2, $3)
                RETURNING id, name, category_id, created_by, created_at, updated_at
            )
            SELECT i.id, i.name, i.category_id, c.name AS category_name,
                   i.created_by, i.created_at, i.updated_at
            FROM inserted i
            JOIN categories c ON c.id = i.category_id
            "#,
        )
        .bind(&new.name)
        .bind(new.category_id)
        .bind(&new.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| handle_reference_error(e, "Parent category not found"))
    }

    async fn list(&self, filter: &SubcategoryFilter) -> Result<Vec<Subcategory>> {
        let sql = format!(
            "{} WHERE ($1::uuid IS NULL OR s.category_id = $1) \
             AND ($2::text IS NULL OR s.created_by = $2) \
             ORDER BY s.created_at DESC, s.id DESC",
            SELECT_WITH_CATEGORY
        );

        sqlx::query_as::<_, Subcategory>(&sql)
            .bind(filter.category_id)
            .bind(&filter.created_by)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list subcategories: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Subcategory>> {
        let sql = format!("{} WHERE s.id = $1", SELECT_WITH_CATEGORY);

        sqlx::query_as::<_, Subcategory>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get subcategory by id: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn exists_in_category(&self, name: &str, category_id: Uuid) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM subcategories WHERE name = $1 AND category_id = $2)",
        )
        .bind(name)
        .bind(category_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check subcategory uniqueness: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn update(&self, id: Uuid, changes: SubcategoryChanges) -> Result<Option<Subcategory>> {
        let updated = sqlx::query(
            r#"
            UPDATE subcategories
            SET name = COALESCE($2, name),
                category_id = COALESCE($3, category_id),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(changes.category_id)
        .execute(&self.pool)
        .await
        .map_err(|e| handle_reference_error(e, "Parent category not found"))?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn product_count(&self, id: Uuid) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE sub_category_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count subcategory products: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM subcategories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| handle_db_error(e, "Subcategory still has products."))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM subcategories")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count subcategories: {:?}", e);
                AppError::Database(e)
            })
    }
}

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{handle_reference_error, AppError, Result};
use crate::features::products::models::{NewProduct, Product, ProductChanges};

/// Persistence for products
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn insert(&self, new: NewProduct) -> Result<Product>;

    /// All products, newest first
    async fn list(&self) -> Result<Vec<Product>>;

    /// The `limit` most recently created products
    async fn recent(&self, limit: usize) -> Result<Vec<Product>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>>;

    /// Returns `None` when the product does not exist
    async fn update(&self, id: Uuid, changes: ProductChanges) -> Result<Option<Product>>;

    /// Returns false when no row was deleted
    async fn delete(&self, id: Uuid) -> Result<bool>;

    async fn count(&self) -> Result<i64>;
}

pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_POPULATED: &str = r#"
    SELECT p.id, p.name,
           p.category_id, c.name AS category_name,
           p.sub_category_id, s.name AS sub_category_name,
           p.quantity, p.mrp, p.image, p.created_at, p.updated_at
    FROM products p
    JOIN categories c ON c.id = p.category_id
    JOIN subcategories s ON s.id = p.sub_category_id
"#;

const MISSING_REFERENCE: &str = "Category or subcategory no longer exists";

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn insert(&self, new: NewProduct) -> Result<Product> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO products (name, category_id, sub_category_id, quantity, mrp, image)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&new.name)
        .bind(new.category_id)
        .bind(new.sub_category_id)
        .bind(new.quantity)
        .bind(new.mrp)
        .bind(&new.image)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| handle_reference_error(e, MISSING_REFERENCE))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Internal(format!("Product {} vanished right after insert", id))
        })
    }

    async fn list(&self) -> Result<Vec<Product>> {
        let sql = format!("{} ORDER BY p.created_at DESC, p.id DESC", SELECT_POPULATED);

        sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list products: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn recent(&self, limit: usize) -> Result<Vec<Product>> {
        let sql = format!(
            "{} ORDER BY p.created_at DESC, p.id DESC LIMIT $1",
            SELECT_POPULATED
        );

        sqlx::query_as::<_, Product>(&sql)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list recent products: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>> {
        let sql = format!("{} WHERE p.id = $1", SELECT_POPULATED);

        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get product by id: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn update(&self, id: Uuid, changes: ProductChanges) -> Result<Option<Product>> {
        let updated = sqlx::query(
            r#"
            UPDATE products
            SET name = COALESCE($2, name),
                category_id = COALESCE($3, category_id),
                sub_category_id = COALESCE($4, sub_category_id),
                quantity = COALESCE($5, quantity),
                mrp = COALESCE($6, mrp),
                image = COALESCE($7, image),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(changes.category_id)
        .bind(changes.sub_category_id)
        .bind(changes.quantity)
        .bind(changes.mrp)
        .bind(&changes.image)
        .execute(&self.pool)
        .await
        .map_err(|e| handle_reference_error(e, MISSING_REFERENCE))?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete product: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count products: {:?}", e);
                AppError::Database(e)
            })
    }
}

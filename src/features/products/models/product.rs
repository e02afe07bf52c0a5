use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for product, joined with its category and subcategory names
#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub category_id: Uuid,
    pub category_name: String,
    pub sub_category_id: Uuid,
    pub sub_category_name: String,
    pub quantity: i64,
    pub mrp: Decimal,
    /// Stored asset path or absolute URL
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub category_id: Uuid,
    pub sub_category_id: Uuid,
    pub quantity: i64,
    pub mrp: Decimal,
    pub image: Option<String>,
}

/// Partial update; `None` leaves the column unchanged
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub category_id: Option<Uuid>,
    pub sub_category_id: Option<Uuid>,
    pub quantity: Option<i64>,
    pub mrp: Option<Decimal>,
    pub image: Option<String>,
}

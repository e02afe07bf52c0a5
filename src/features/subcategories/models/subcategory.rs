use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for subcategory, joined with its category name
#[derive(Debug, Clone, FromRow)]
pub struct Subcategory {
    pub id: Uuid,
    pub name: String,
    pub category_id: Uuid,
    pub category_name: String,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSubcategory {
    pub name: String,
    pub category_id: Uuid,
    pub created_by: Option<String>,
}

/// Partial update; `None` leaves the column unchanged
#[derive(Debug, Clone, Default)]
pub struct SubcategoryChanges {
    pub name: Option<String>,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct SubcategoryFilter {
    pub category_id: Option<Uuid>,
    pub created_by: Option<String>,
}

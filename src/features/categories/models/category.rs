use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for category
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Records that still reference a category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct CategoryDependents {
    pub subcategories: i64,
    pub products: i64,
}

impl CategoryDependents {
    pub fn is_empty(&self) -> bool {
        self.subcategories == 0 && self.products == 0
    }
}

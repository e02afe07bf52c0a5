use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::categories::models::Category;
use crate::shared::validation::validate_category_name;

/// Request DTO for creating a category
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryDto {
    /// Category name, 2-50 characters, unique regardless of case
    #[serde(default)]
    #[validate(custom(function = "validate_category_name"))]
    #[schema(example = "Electronics")]
    pub name: String,
}

/// Response DTO for category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponseDto {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponseDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

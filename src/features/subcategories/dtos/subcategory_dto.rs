use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::subcategories::models::Subcategory;
use crate::shared::types::EntityRef;

/// Request DTO for creating a subcategory
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubcategoryDto {
    #[schema(example = "Mobiles")]
    pub name: Option<String>,
    pub category_id: Option<Uuid>,
    /// Ignored when the request carries an `x-user-id` header
    pub created_by: Option<String>,
}

/// Request DTO for updating a subcategory; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubcategoryDto {
    pub name: Option<String>,
    pub category_id: Option<Uuid>,
}

/// Query params for listing subcategories
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListSubcategoriesQuery {
    /// Only subcategories of this category; blank means no filter
    #[param(value_type = Option<Uuid>)]
    pub category_id: Option<String>,
    /// Only subcategories created by the requesting user (needs `x-user-id`)
    #[serde(default)]
    pub mine: bool,
}

impl ListSubcategoriesQuery {
    /// Parsed category filter
    pub fn category(&self) -> Result<Option<Uuid>> {
        match self.category_id.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => Uuid::parse_str(raw)
                .map(Some)
                .map_err(|_| AppError::Validation("Invalid categoryId".to_string())),
        }
    }
}

/// Response DTO for subcategory
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubcategoryResponseDto {
    pub id: Uuid,
    pub name: String,
    /// Owning category, populated with its name
    pub category_id: EntityRef,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Subcategory> for SubcategoryResponseDto {
    fn from(s: Subcategory) -> Self {
        Self {
            id: s.id,
            name: s.name,
            category_id: EntityRef {
                id: s.category_id,
                name: s.category_name,
            },
            created_by: s.created_by,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

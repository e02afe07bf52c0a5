use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::CategoryRepository;
use crate::features::subcategories::dtos::{
    CreateSubcategoryDto, ListSubcategoriesQuery, SubcategoryResponseDto, UpdateSubcategoryDto,
};
use crate::features::subcategories::models::{
    NewSubcategory, Subcategory, SubcategoryChanges, SubcategoryFilter,
};
use crate::features::subcategories::repositories::SubcategoryRepository;
use crate::shared::constants::NAME_MAX_LEN;

/// Service for subcategory operations
pub struct SubcategoryService {
    repo: Arc<dyn SubcategoryRepository>,
    categories: Arc<dyn CategoryRepository>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn ensure_name_length(name: &str) -> Result<()> {
    if name.chars().count() > NAME_MAX_LEN {
        return Err(AppError::Validation(format!(
            "Subcategory name must be at most {} characters",
            NAME_MAX_LEN
        )));
    }
    Ok(())
}

impl SubcategoryService {
    pub fn new(
        repo: Arc<dyn SubcategoryRepository>,
        categories: Arc<dyn CategoryRepository>,
    ) -> Self {
        Self { repo, categories }
    }

    /// Create a subcategory under an existing category.
    ///
    /// `acting_user` comes from the request context and takes precedence over
    /// any `createdBy` sent in the body.
    pub async fn create(
        &self,
        dto: CreateSubcategoryDto,
        acting_user: Option<&str>,
    ) -> Result<SubcategoryResponseDto> {
        let (name, category_id) = match (non_blank(dto.name), dto.category_id) {
            (Some(name), Some(category_id)) => (name, category_id),
            _ => {
                return Err(AppError::Validation(
                    "Name and Category are required".to_string(),
                ))
            }
        };

        ensure_name_length(&name)?;
        self.ensure_category(category_id).await?;

        if self.repo.exists_in_category(&name, category_id).await? {
            return Err(AppError::Conflict(
                "Subcategory already exists in this category".to_string(),
            ));
        }

        let created_by = acting_user
            .map(str::to_string)
            .or_else(|| non_blank(dto.created_by));

        let subcategory = self
            .repo
            .insert(NewSubcategory {
                name,
                category_id,
                created_by,
            })
            .await?;

        tracing::info!(
            "Subcategory created: id={}, name={}, category_id={}",
            subcategory.id,
            subcategory.name,
            subcategory.category_id
        );
        Ok(subcategory.into())
    }

    /// List subcategories, optionally narrowed to one category or to the acting user
    pub async fn list(
        &self,
        query: ListSubcategoriesQuery,
        acting_user: Option<&str>,
    ) -> Result<Vec<SubcategoryResponseDto>> {
        let category_id = query.category()?;
        let created_by = if query.mine {
            let user = acting_user.ok_or_else(|| {
                AppError::Validation(
                    "Listing your own subcategories requires a user context".to_string(),
                )
            })?;
            Some(user.to_string())
        } else {
            None
        };

        let filter = SubcategoryFilter {
            category_id,
            created_by,
        };

        let subcategories = self.repo.list(&filter).await?;
        Ok(subcategories.into_iter().map(Into::into).collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<SubcategoryResponseDto> {
        self.find(id).await.map(Into::into)
    }

    /// Apply the provided fields; a new category must exist
    pub async fn update(
        &self,
        id: Uuid,
        dto: UpdateSubcategoryDto,
    ) -> Result<SubcategoryResponseDto> {
        self.find(id).await?;

        let name = non_blank(dto.name);
        if let Some(name) = &name {
            ensure_name_length(name)?;
        }
        if let Some(category_id) = dto.category_id {
            self.ensure_category(category_id).await?;
        }

        let changes = SubcategoryChanges {
            name,
            category_id: dto.category_id,
        };

        let subcategory = self
            .repo
            .update(id, changes)
            .await?
            .ok_or_else(|| AppError::NotFound("Subcategory not found".to_string()))?;

        tracing::info!("Subcategory updated: id={}", subcategory.id);
        Ok(subcategory.into())
    }

    /// Delete a subcategory that no product references
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let subcategory = self.find(id).await?;

        let products = self.repo.product_count(id).await?;
        if products > 0 {
            return Err(AppError::Conflict(format!(
                "Subcategory '{}' still has {} products. Delete them first.",
                subcategory.name, products
            )));
        }

        if !self.repo.delete(id).await? {
            return Err(AppError::NotFound("Subcategory not found".to_string()));
        }

        tracing::info!(
            "Subcategory deleted: id={}, name={}",
            subcategory.id,
            subcategory.name
        );
        Ok(())
    }

    pub async fn count(&self) -> Result<i64> {
        self.repo.count().await
    }

    async fn find(&self, id: Uuid) -> Result<Subcategory> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Subcategory not found".to_string()))
    }

    async fn ensure_category(&self, category_id: Uuid) -> Result<()> {
        match self.categories.find_by_id(category_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound("Parent category not found".to_string())),
        }
    }
}

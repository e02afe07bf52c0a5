use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{CategoryResponseDto, CreateCategoryDto};
use crate::features::categories::models::Category;
use crate::features::categories::repositories::CategoryRepository;
use crate::shared::validation::first_message;

/// Service for category operations
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(repo: Arc<dyn CategoryRepository>) -> Self {
        Self { repo }
    }

    /// Create a category with a trimmed, case-insensitively unique name
    pub async fn create(&self, dto: CreateCategoryDto) -> Result<CategoryResponseDto> {
        dto.validate()
            .map_err(|e| AppError::Validation(first_message(&e)))?;
        let name = dto.name.trim();

        if self.repo.find_by_name(name).await?.is_some() {
            return Err(AppError::Conflict("Category already exists.".to_string()));
        }

        let category = self.repo.insert(name).await?;
        tracing::info!("Category created: id={}, name={}", category.id, category.name);

        Ok(category.into())
    }

    /// List all categories, most recently created first
    pub async fn list(&self) -> Result<Vec<CategoryResponseDto>> {
        let categories = self.repo.list().await?;
        Ok(categories.into_iter().map(Into::into).collect())
    }

    /// Get a category by id
    pub async fn get(&self, id: Uuid) -> Result<CategoryResponseDto> {
        self.find(id).await.map(Into::into)
    }

    /// Delete a category that nothing references any more
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let category = self.find(id).await?;

        let dependents = self.repo.dependents(id).await?;
        if !dependents.is_empty() {
            return Err(AppError::Conflict(format!(
                "Category '{}' still has {} subcategories and {} products. Delete them first.",
                category.name, dependents.subcategories, dependents.products
            )));
        }

        if !self.repo.delete(id).await? {
            return Err(AppError::NotFound("Category not found.".to_string()));
        }

        tracing::info!("Category deleted: id={}, name={}", category.id, category.name);
        Ok(())
    }

    pub async fn count(&self) -> Result<i64> {
        self.repo.count().await
    }

    async fn find(&self, id: Uuid) -> Result<Category> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Category not found.".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::MemoryStore;

    fn service(store: &MemoryStore) -> CategoryService {
        CategoryService::new(Arc::new(store.clone()))
    }

    fn dto(name: &str) -> CreateCategoryDto {
        CreateCategoryDto {
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_trims_name() {
        let store = MemoryStore::new();
        let service = service(&store);

        let category = service.create(dto("  Electronics  ")).await.unwrap();
        assert_eq!(category.name, "Electronics");
    }

    #[tokio::test]
    async fn test_create_rejects_case_insensitive_duplicate() {
        let store = MemoryStore::new();
        let service = service(&store);

        service.create(dto("Electronics")).await.unwrap();
        let err = service.create(dto("ELECTRONICS")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_and_out_of_range_names() {
        let store = MemoryStore::new();
        let service = service(&store);

        let err = service.create(dto("   ")).await.unwrap_err();
        match err {
            AppError::Validation(msg) => assert_eq!(msg, "Category name is required."),
            other => panic!("expected validation error, got {:?}", other),
        }

        assert!(matches!(
            service.create(dto("x")).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            service.create(dto(&"x".repeat(51))).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = MemoryStore::new();
        let service = service(&store);

        service.create(dto("First")).await.unwrap();
        service.create(dto("Second")).await.unwrap();

        let names: Vec<String> = service
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Second", "First"]);
    }

    #[tokio::test]
    async fn test_delete_missing_and_existing() {
        let store = MemoryStore::new();
        let service = service(&store);

        let err = service.delete(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let category = service.create(dto("Toys")).await.unwrap();
        service.delete(category.id).await.unwrap();
        assert!(service.list().await.unwrap().is_empty());
        assert!(matches!(
            service.get(category.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_refuses_category_with_subcategories() {
        let store = MemoryStore::new();
        let service = service(&store);

        let category = service.create(dto("Books")).await.unwrap();
        store.seed_subcategory("Novels", category.id);

        let err = service.delete(category.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(service.count().await.unwrap(), 1);
    }
}

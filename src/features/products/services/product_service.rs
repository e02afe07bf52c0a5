use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::CategoryRepository;
use crate::features::products::dtos::{
    CreateProductInput, ImageUpload, ProductResponseDto, UpdateProductInput,
};
use crate::features::products::models::{NewProduct, Product, ProductChanges};
use crate::features::products::repositories::ProductRepository;
use crate::features::subcategories::SubcategoryRepository;
use crate::modules::storage::{validate_image, AssetStore};

/// Service for product operations, including the product image lifecycle
pub struct ProductService {
    repo: Arc<dyn ProductRepository>,
    categories: Arc<dyn CategoryRepository>,
    subcategories: Arc<dyn SubcategoryRepository>,
    assets: Arc<dyn AssetStore>,
}

impl ProductService {
    pub fn new(
        repo: Arc<dyn ProductRepository>,
        categories: Arc<dyn CategoryRepository>,
        subcategories: Arc<dyn SubcategoryRepository>,
        assets: Arc<dyn AssetStore>,
    ) -> Self {
        Self {
            repo,
            categories,
            subcategories,
            assets,
        }
    }

    /// Create a product, storing its image first when one is supplied
    pub async fn create(&self, input: CreateProductInput) -> Result<ProductResponseDto> {
        self.ensure_references(input.category_id, input.sub_category_id)
            .await?;

        let image = match &input.image {
            Some(upload) => Some(self.store_image(upload).await?),
            None => None,
        };

        let new = NewProduct {
            name: input.name,
            category_id: input.category_id,
            sub_category_id: input.sub_category_id,
            quantity: input.quantity,
            mrp: input.mrp,
            image: image.clone(),
        };

        let product = match self.repo.insert(new).await {
            Ok(product) => product,
            Err(e) => {
                if let Some(path) = image {
                    self.discard_image(&path).await;
                }
                return Err(e);
            }
        };

        info!(
            "Product created: id={}, name={}, image={}",
            product.id,
            product.name,
            product.image.as_deref().unwrap_or("-")
        );
        Ok(self.to_dto(product))
    }

    /// All products, newest first
    pub async fn list(&self) -> Result<Vec<ProductResponseDto>> {
        let products = self.repo.list().await?;
        Ok(products.into_iter().map(|p| self.to_dto(p)).collect())
    }

    /// The most recently created products
    pub async fn recent(&self, limit: usize) -> Result<Vec<ProductResponseDto>> {
        let products = self.repo.recent(limit).await?;
        Ok(products.into_iter().map(|p| self.to_dto(p)).collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<ProductResponseDto> {
        self.find(id).await.map(|p| self.to_dto(p))
    }

    /// Apply the provided fields.
    ///
    /// A new image is stored before the record changes; the previous image is
    /// removed afterwards and a failure to remove it is only logged.
    pub async fn update(&self, id: Uuid, input: UpdateProductInput) -> Result<ProductResponseDto> {
        let existing = self.find(id).await?;

        if input.category_id.is_some() || input.sub_category_id.is_some() {
            self.ensure_references(
                input.category_id.unwrap_or(existing.category_id),
                input.sub_category_id.unwrap_or(existing.sub_category_id),
            )
            .await?;
        }

        let new_image = match &input.image {
            Some(upload) => Some(self.store_image(upload).await?),
            None => None,
        };

        let changes = ProductChanges {
            name: input.name,
            category_id: input.category_id,
            sub_category_id: input.sub_category_id,
            quantity: input.quantity,
            mrp: input.mrp,
            image: new_image.clone(),
        };

        let updated = match self.repo.update(id, changes).await {
            Ok(Some(product)) => product,
            result => {
                if let Some(path) = &new_image {
                    self.discard_image(path).await;
                }
                return match result {
                    Err(e) => Err(e),
                    _ => Err(AppError::NotFound("Product not found".to_string())),
                };
            }
        };

        if new_image.is_some() {
            if let Some(old) = existing.image.as_deref() {
                self.discard_image(old).await;
            }
        }

        info!("Product updated: id={}", updated.id);
        Ok(self.to_dto(updated))
    }

    /// Delete a product and, best-effort, its image
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let product = self.find(id).await?;

        if let Some(path) = product.image.as_deref() {
            self.discard_image(path).await;
        }

        if !self.repo.delete(id).await? {
            return Err(AppError::NotFound("Product not found".to_string()));
        }

        info!("Product deleted: id={}, name={}", product.id, product.name);
        Ok(())
    }

    pub async fn count(&self) -> Result<i64> {
        self.repo.count().await
    }

    async fn find(&self, id: Uuid) -> Result<Product> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
    }

    async fn ensure_references(&self, category_id: Uuid, sub_category_id: Uuid) -> Result<()> {
        if self.categories.find_by_id(category_id).await?.is_none() {
            return Err(AppError::NotFound("Category not found".to_string()));
        }

        let subcategory = self
            .subcategories
            .find_by_id(sub_category_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Subcategory not found".to_string()))?;

        if subcategory.category_id != category_id {
            return Err(AppError::Validation(
                "Subcategory does not belong to the selected category".to_string(),
            ));
        }
        Ok(())
    }

    async fn store_image(&self, upload: &ImageUpload) -> Result<String> {
        validate_image(&upload.file_name, upload.data.len())?;
        self.assets
            .store(upload.data.clone(), &upload.file_name)
            .await
    }

    async fn discard_image(&self, path: &str) {
        if let Err(e) = self.assets.delete(path).await {
            warn!(
                "Failed to delete image '{}' from {} storage: {}",
                path,
                self.assets.backend_name(),
                e
            );
        }
    }

    fn to_dto(&self, product: Product) -> ProductResponseDto {
        ProductResponseDto::from_product(product, self.assets.as_ref())
    }
}

//! In-memory repositories for service and router tests

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::{Category, CategoryDependents};
use crate::features::categories::CategoryRepository;
use crate::features::products::models::{NewProduct, Product, ProductChanges};
use crate::features::products::ProductRepository;
use crate::features::subcategories::models::{
    NewSubcategory, Subcategory, SubcategoryChanges, SubcategoryFilter,
};
use crate::features::subcategories::SubcategoryRepository;

#[derive(Debug, Clone)]
struct SubcategoryRow {
    id: Uuid,
    name: String,
    category_id: Uuid,
    created_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct ProductRow {
    id: Uuid,
    name: String,
    category_id: Uuid,
    sub_category_id: Uuid,
    quantity: i64,
    mrp: Decimal,
    image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Rows are kept in insertion order; listings walk them backwards.
#[derive(Default)]
struct Tables {
    categories: Vec<Category>,
    subcategories: Vec<SubcategoryRow>,
    products: Vec<ProductRow>,
}

impl Tables {
    fn category_name(&self, id: Uuid) -> Result<String> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.clone())
            .ok_or_else(|| AppError::Internal(format!("dangling category {}", id)))
    }

    fn populate_subcategory(&self, row: &SubcategoryRow) -> Result<Subcategory> {
        Ok(Subcategory {
            id: row.id,
            name: row.name.clone(),
            category_id: row.category_id,
            category_name: self.category_name(row.category_id)?,
            created_by: row.created_by.clone(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    fn populate_product(&self, row: &ProductRow) -> Result<Product> {
        let sub_category_name = self
            .subcategories
            .iter()
            .find(|s| s.id == row.sub_category_id)
            .map(|s| s.name.clone())
            .ok_or_else(|| {
                AppError::Internal(format!("dangling subcategory {}", row.sub_category_id))
            })?;

        Ok(Product {
            id: row.id,
            name: row.name.clone(),
            category_id: row.category_id,
            category_name: self.category_name(row.category_id)?,
            sub_category_id: row.sub_category_id,
            sub_category_name,
            quantity: row.quantity,
            mrp: row.mrp,
            image: row.image.clone(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    fn check_references(&self, category_id: Uuid, sub_category_id: Option<Uuid>) -> Result<()> {
        let category_ok = self.categories.iter().any(|c| c.id == category_id);
        let sub_ok = sub_category_id
            .map(|id| self.subcategories.iter().any(|s| s.id == id))
            .unwrap_or(true);

        if category_ok && sub_ok {
            Ok(())
        } else {
            Err(AppError::NotFound("Referenced record does not exist".to_string()))
        }
    }
}

/// Shared in-memory store implementing every repository trait.
///
/// Clones share the same tables, so one store can back several services.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    pub fn seed_category(&self, name: &str) -> Category {
        let now = Utc::now();
        let category = Category {
            id: Uuid::now_v7(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.lock().categories.push(category.clone());
        category
    }

    pub fn seed_subcategory(&self, name: &str, category_id: Uuid) -> Subcategory {
        let now = Utc::now();
        let row = SubcategoryRow {
            id: Uuid::now_v7(),
            name: name.to_string(),
            category_id,
            created_by: None,
            created_at: now,
            updated_at: now,
        };

        let mut tables = self.lock();
        tables.subcategories.push(row.clone());
        tables.populate_subcategory(&row).unwrap()
    }

    pub fn seed_product(&self, name: &str, category_id: Uuid, sub_category_id: Uuid) -> Product {
        let now = Utc::now();
        let row = ProductRow {
            id: Uuid::now_v7(),
            name: name.to_string(),
            category_id,
            sub_category_id,
            quantity: 0,
            mrp: Decimal::ZERO,
            image: None,
            created_at: now,
            updated_at: now,
        };

        let mut tables = self.lock();
        tables.products.push(row.clone());
        tables.populate_product(&row).unwrap()
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn insert(&self, name: &str) -> Result<Category> {
        if CategoryRepository::find_by_name(self, name).await?.is_some() {
            return Err(AppError::Conflict("Category already exists.".to_string()));
        }
        Ok(self.seed_category(name))
    }

    async fn list(&self) -> Result<Vec<Category>> {
        Ok(self.lock().categories.iter().rev().cloned().collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>> {
        Ok(self.lock().categories.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>> {
        let needle = name.to_lowercase();
        Ok(self
            .lock()
            .categories
            .iter()
            .find(|c| c.name.to_lowercase() == needle)
            .cloned())
    }

    async fn dependents(&self, id: Uuid) -> Result<CategoryDependents> {
        let tables = self.lock();
        Ok(CategoryDependents {
            subcategories: tables
                .subcategories
                .iter()
                .filter(|s| s.category_id == id)
                .count() as i64,
            products: tables
                .products
                .iter()
                .filter(|p| p.category_id == id)
                .count() as i64,
        })
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.lock();
        let before = tables.categories.len();
        tables.categories.retain(|c| c.id != id);
        Ok(tables.categories.len() < before)
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.lock().categories.len() as i64)
    }
}

#[async_trait]
impl SubcategoryRepository for MemoryStore {
    async fn insert(&self, new: NewSubcategory) -> Result<Subcategory> {
        let mut tables = self.lock();
        tables.check_references(new.category_id, None)?;

        let now = Utc::now();
        let row = SubcategoryRow {
            id: Uuid::now_v7(),
            name: new.name,
            category_id: new.category_id,
            created_by: new.created_by,
            created_at: now,
            updated_at: now,
        };
        tables.subcategories.push(row.clone());
        tables.populate_subcategory(&row)
    }

    async fn list(&self, filter: &SubcategoryFilter) -> Result<Vec<Subcategory>> {
        let tables = self.lock();
        tables
            .subcategories
            .iter()
            .rev()
            .filter(|s| filter.category_id.map_or(true, |id| s.category_id == id))
            .filter(|s| {
                filter
                    .created_by
                    .as_deref()
                    .map_or(true, |user| s.created_by.as_deref() == Some(user))
            })
            .map(|s| tables.populate_subcategory(s))
            .collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Subcategory>> {
        let tables = self.lock();
        tables
            .subcategories
            .iter()
            .find(|s| s.id == id)
            .map(|s| tables.populate_subcategory(s))
            .transpose()
    }

    async fn exists_in_category(&self, name: &str, category_id: Uuid) -> Result<bool> {
        Ok(self
            .lock()
            .subcategories
            .iter()
            .any(|s| s.name == name && s.category_id == category_id))
    }

    async fn update(&self, id: Uuid, changes: SubcategoryChanges) -> Result<Option<Subcategory>> {
        let mut tables = self.lock();
        if let Some(category_id) = changes.category_id {
            tables.check_references(category_id, None)?;
        }

        let Some(row) = tables.subcategories.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            row.name = name;
        }
        if let Some(category_id) = changes.category_id {
            row.category_id = category_id;
        }
        row.updated_at = Utc::now();

        let row = row.clone();
        tables.populate_subcategory(&row).map(Some)
    }

    async fn product_count(&self, id: Uuid) -> Result<i64> {
        Ok(self
            .lock()
            .products
            .iter()
            .filter(|p| p.sub_category_id == id)
            .count() as i64)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.lock();
        let before = tables.subcategories.len();
        tables.subcategories.retain(|s| s.id != id);
        Ok(tables.subcategories.len() < before)
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.lock().subcategories.len() as i64)
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn insert(&self, new: NewProduct) -> Result<Product> {
        let mut tables = self.lock();
        tables.check_references(new.category_id, Some(new.sub_category_id))?;

        let now = Utc::now();
        let row = ProductRow {
            id: Uuid::now_v7(),
            name: new.name,
            category_id: new.category_id,
            sub_category_id: new.sub_category_id,
            quantity: new.quantity,
            mrp: new.mrp,
            image: new.image,
            created_at: now,
            updated_at: now,
        };
        tables.products.push(row.clone());
        tables.populate_product(&row)
    }

    async fn list(&self) -> Result<Vec<Product>> {
        let tables = self.lock();
        tables
            .products
            .iter()
            .rev()
            .map(|p| tables.populate_product(p))
            .collect()
    }

    async fn recent(&self, limit: usize) -> Result<Vec<Product>> {
        let tables = self.lock();
        tables
            .products
            .iter()
            .rev()
            .take(limit)
            .map(|p| tables.populate_product(p))
            .collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>> {
        let tables = self.lock();
        tables
            .products
            .iter()
            .find(|p| p.id == id)
            .map(|p| tables.populate_product(p))
            .transpose()
    }

    async fn update(&self, id: Uuid, changes: ProductChanges) -> Result<Option<Product>> {
        let mut tables = self.lock();
        if let Some(category_id) = changes.category_id {
            tables.check_references(category_id, changes.sub_category_id)?;
        } else if let Some(sub_category_id) = changes.sub_category_id {
            if !tables.subcategories.iter().any(|s| s.id == sub_category_id) {
                return Err(AppError::NotFound(
                    "Referenced record does not exist".to_string(),
                ));
            }
        }

        let Some(row) = tables.products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            row.name = name;
        }
        if let Some(category_id) = changes.category_id {
            row.category_id = category_id;
        }
        if let Some(sub_category_id) = changes.sub_category_id {
            row.sub_category_id = sub_category_id;
        }
        if let Some(quantity) = changes.quantity {
            row.quantity = quantity;
        }
        if let Some(mrp) = changes.mrp {
            row.mrp = mrp;
        }
        if let Some(image) = changes.image {
            row.image = Some(image);
        }
        row.updated_at = Utc::now();

        let row = row.clone();
        tables.populate_product(&row).map(Some)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.lock();
        let before = tables.products.len();
        tables.products.retain(|p| p.id != id);
        Ok(tables.products.len() < before)
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.lock().products.len() as i64)
    }
}

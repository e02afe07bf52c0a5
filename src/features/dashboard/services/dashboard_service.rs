use std::sync::Arc;

use crate::core::error::Result;
use crate::features::categories::CategoryService;
use crate::features::dashboard::dtos::DashboardStatsDto;
use crate::features::products::ProductService;
use crate::features::subcategories::SubcategoryService;

/// Service for admin dashboard aggregates
pub struct DashboardService {
    categories: Arc<CategoryService>,
    subcategories: Arc<SubcategoryService>,
    products: Arc<ProductService>,
}

impl DashboardService {
    pub fn new(
        categories: Arc<CategoryService>,
        subcategories: Arc<SubcategoryService>,
        products: Arc<ProductService>,
    ) -> Self {
        Self {
            categories,
            subcategories,
            products,
        }
    }

    /// Count every store; the three counts run concurrently and are never cached
    pub async fn stats(&self) -> Result<DashboardStatsDto> {
        let (categories, sub_categories, products) = futures::try_join!(
            self.categories.count(),
            self.subcategories.count(),
            self.products.count(),
        )?;

        Ok(DashboardStatsDto {
            categories,
            sub_categories,
            products,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::categories::CategoryRepository;
    use crate::modules::storage::LocalDiskStore;
    use crate::shared::test_helpers::MemoryStore;

    #[tokio::test]
    async fn test_stats_track_live_counts() {
        let store = MemoryStore::new();
        let dir = tempfile::TempDir::new().unwrap();
        let shared = Arc::new(store.clone());
        let service = DashboardService::new(
            Arc::new(CategoryService::new(shared.clone())),
            Arc::new(SubcategoryService::new(shared.clone(), shared.clone())),
            Arc::new(ProductService::new(
                shared.clone(),
                shared.clone(),
                shared,
                Arc::new(LocalDiskStore::new(dir.path(), "/uploads", "http://localhost")),
            )),
        );

        assert_eq!(service.stats().await.unwrap(), DashboardStatsDto::default());

        let electronics = store.seed_category("Electronics");
        let toys = store.seed_category("Toys");
        let mobiles = store.seed_subcategory("Mobiles", electronics.id);
        store.seed_product("Phone X", electronics.id, mobiles.id);
        store.seed_product("Phone Y", electronics.id, mobiles.id);

        assert_eq!(
            service.stats().await.unwrap(),
            DashboardStatsDto {
                categories: 2,
                sub_categories: 1,
                products: 2,
            }
        );

        CategoryRepository::delete(&store, toys.id).await.unwrap();
        assert_eq!(service.stats().await.unwrap().categories, 1);
    }
}

use std::sync::Arc;

use crate::features::categories::CategoryService;
use crate::features::dashboard::DashboardService;
use crate::features::products::ProductService;
use crate::features::subcategories::SubcategoryService;

/// Services the admin pages call in-process
#[derive(Clone)]
pub struct PagesState {
    pub categories: Arc<CategoryService>,
    pub subcategories: Arc<SubcategoryService>,
    pub products: Arc<ProductService>,
    pub dashboard: Arc<DashboardService>,
}

use utoipa::{Modify, OpenApi};

use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::dashboard::{dtos as dashboard_dtos, handlers as dashboard_handlers};
use crate::features::products::{dtos as products_dtos, handlers as products_handlers};
use crate::features::subcategories::{
    dtos as subcategories_dtos, handlers as subcategories_handlers,
};
use crate::shared::types::{ApiResponse, EntityRef, MessageResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Categories
        categories_handlers::create_category,
        categories_handlers::list_categories,
        categories_handlers::get_category,
        categories_handlers::delete_category,
        // Subcategories
        subcategories_handlers::create_subcategory,
        subcategories_handlers::list_subcategories,
        subcategories_handlers::get_subcategory,
        subcategories_handlers::update_subcategory,
        subcategories_handlers::delete_subcategory,
        // Products
        products_handlers::create_product,
        products_handlers::list_products,
        products_handlers::get_product,
        products_handlers::update_product,
        products_handlers::delete_product,
        // Dashboard
        dashboard_handlers::get_stats,
    ),
    components(
        schemas(
            // Shared
            Meta,
            EntityRef,
            MessageResponse,
            // Categories
            categories_dtos::CreateCategoryDto,
            categories_dtos::CategoryResponseDto,
            ApiResponse<Vec<categories_dtos::CategoryResponseDto>>,
            ApiResponse<categories_dtos::CategoryResponseDto>,
            // Subcategories
            subcategories_dtos::CreateSubcategoryDto,
            subcategories_dtos::UpdateSubcategoryDto,
            subcategories_dtos::SubcategoryResponseDto,
            // Products
            products_dtos::ProductFormSchema,
            products_dtos::ProductResponseDto,
            // Dashboard
            dashboard_dtos::DashboardStatsDto,
        )
    ),
    tags(
        (name = "categories", description = "Top-level product categories"),
        (name = "subcategories", description = "Subcategories owned by a category"),
        (name = "products", description = "Products with optional images"),
        (name = "dashboard", description = "Aggregate counts for the admin dashboard"),
    ),
    info(
        title = "Inventory Admin API",
        version = "0.1.0",
        description = "API documentation for the inventory admin panel",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

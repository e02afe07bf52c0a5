use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::features::pages::handlers;
use crate::features::pages::state::PagesState;
use crate::shared::constants::MAX_IMAGE_SIZE;

const FORM_OVERHEAD: usize = 1024 * 1024;

/// Create routes for the server-rendered admin pages
pub fn routes(state: Arc<PagesState>) -> Router {
    Router::new()
        .route("/admin", get(handlers::dashboard_page))
        .route(
            "/admin/categories",
            get(handlers::categories_page).post(handlers::create_category),
        )
        .route(
            "/admin/categories/{id}/delete",
            post(handlers::delete_category),
        )
        .route(
            "/admin/subcategories",
            get(handlers::subcategories_page).post(handlers::create_subcategory),
        )
        .route(
            "/admin/subcategories/{id}/delete",
            post(handlers::delete_subcategory),
        )
        .route(
            "/admin/products",
            get(handlers::products_page).post(handlers::create_product),
        )
        .route("/admin/products/{id}", post(handlers::update_product))
        .route("/admin/products/{id}/delete", post(handlers::delete_product))
        .layer(DefaultBodyLimit::max(MAX_IMAGE_SIZE + FORM_OVERHEAD))
        .with_state(state)
}

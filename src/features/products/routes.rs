use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::get, Router};

use crate::features::products::handlers;
use crate::features::products::services::ProductService;
use crate::shared::constants::MAX_IMAGE_SIZE;

/// Room for the text fields and multipart framing around the image
const FORM_OVERHEAD: usize = 1024 * 1024;

/// Create routes for the products feature
pub fn routes(service: Arc<ProductService>) -> Router {
    Router::new()
        .route(
            "/api/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/api/products/{id}",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .layer(DefaultBodyLimit::max(MAX_IMAGE_SIZE + FORM_OVERHEAD))
        .with_state(service)
}

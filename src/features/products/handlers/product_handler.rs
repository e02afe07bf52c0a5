use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::AppPath;
use crate::features::products::dtos::{ProductForm, ProductFormSchema, ProductResponseDto};
use crate::features::products::services::ProductService;
use crate::shared::types::MessageResponse;

/// Create a product
///
/// Accepts multipart/form-data with `name`, `categoryId`, `subCategoryId`,
/// optional `quantity` and `mrp` (default 0) and an optional `image` file.
#[utoipa::path(
    post,
    path = "/api/products",
    request_body(
        content = ProductFormSchema,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 201, description = "Product created", body = ProductResponseDto),
        (status = 400, description = "Missing fields, invalid numbers or unsupported image"),
        (status = 404, description = "Category or subcategory not found"),
        (status = 413, description = "Image too large")
    ),
    tag = "products"
)]
pub async fn create_product(
    State(service): State<Arc<ProductService>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ProductResponseDto>)> {
    let input = ProductForm::from_multipart(multipart).await?.into_create()?;
    let product = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// List all products, newest first
#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "List of products", body = Vec<ProductResponseDto>),
    ),
    tag = "products"
)]
pub async fn list_products(
    State(service): State<Arc<ProductService>>,
) -> Result<Json<Vec<ProductResponseDto>>> {
    Ok(Json(service.list().await?))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = ProductResponseDto),
        (status = 404, description = "Product not found")
    ),
    tag = "products"
)]
pub async fn get_product(
    State(service): State<Arc<ProductService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ProductResponseDto>> {
    Ok(Json(service.get(id).await?))
}

/// Update a product
///
/// Every field is optional. A new `image` replaces the stored one.
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body(
        content = ProductFormSchema,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 200, description = "Product updated", body = ProductResponseDto),
        (status = 400, description = "Invalid field value or unsupported image"),
        (status = 404, description = "Product, category or subcategory not found")
    ),
    tag = "products"
)]
pub async fn update_product(
    State(service): State<Arc<ProductService>>,
    AppPath(id): AppPath<Uuid>,
    multipart: Multipart,
) -> Result<Json<ProductResponseDto>> {
    let input = ProductForm::from_multipart(multipart).await?.into_update()?;
    Ok(Json(service.update(id, input).await?))
}

/// Delete a product and its image
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deleted", body = MessageResponse),
        (status = 404, description = "Product not found")
    ),
    tag = "products"
)]
pub async fn delete_product(
    State(service): State<Arc<ProductService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MessageResponse>> {
    service.delete(id).await?;
    Ok(Json(MessageResponse::new("Product deleted successfully")))
}

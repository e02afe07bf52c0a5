use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppPath, AppQuery, RequestUser};
use crate::features::subcategories::dtos::{
    CreateSubcategoryDto, ListSubcategoriesQuery, SubcategoryResponseDto, UpdateSubcategoryDto,
};
use crate::features::subcategories::services::SubcategoryService;
use crate::shared::types::MessageResponse;

/// Create a subcategory
///
/// When the `x-user-id` header is present it is recorded as `createdBy`.
#[utoipa::path(
    post,
    path = "/api/subcategories",
    request_body = CreateSubcategoryDto,
    params(
        ("x-user-id" = Option<String>, Header, description = "Acting user")
    ),
    responses(
        (status = 201, description = "Subcategory created", body = SubcategoryResponseDto),
        (status = 400, description = "Name or category missing"),
        (status = 404, description = "Parent category not found"),
        (status = 409, description = "Subcategory already exists in this category")
    ),
    tag = "subcategories"
)]
pub async fn create_subcategory(
    State(service): State<Arc<SubcategoryService>>,
    user: RequestUser,
    AppJson(dto): AppJson<CreateSubcategoryDto>,
) -> Result<(StatusCode, Json<SubcategoryResponseDto>)> {
    let subcategory = service.create(dto, user.id()).await?;
    Ok((StatusCode::CREATED, Json(subcategory)))
}

/// List subcategories
#[utoipa::path(
    get,
    path = "/api/subcategories",
    params(
        ListSubcategoriesQuery,
        ("x-user-id" = Option<String>, Header, description = "Acting user, required with mine=true")
    ),
    responses(
        (status = 200, description = "List of subcategories", body = Vec<SubcategoryResponseDto>),
        (status = 400, description = "Malformed categoryId or mine, or mine=true without a user context")
    ),
    tag = "subcategories"
)]
pub async fn list_subcategories(
    State(service): State<Arc<SubcategoryService>>,
    user: RequestUser,
    AppQuery(query): AppQuery<ListSubcategoriesQuery>,
) -> Result<Json<Vec<SubcategoryResponseDto>>> {
    let subcategories = service.list(query, user.id()).await?;
    Ok(Json(subcategories))
}

#[utoipa::path(
    get,
    path = "/api/subcategories/{id}",
    params(
        ("id" = Uuid, Path, description = "Subcategory ID")
    ),
    responses(
        (status = 200, description = "Subcategory found", body = SubcategoryResponseDto),
        (status = 404, description = "Subcategory not found")
    ),
    tag = "subcategories"
)]
pub async fn get_subcategory(
    State(service): State<Arc<SubcategoryService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<SubcategoryResponseDto>> {
    Ok(Json(service.get(id).await?))
}

/// Update a subcategory's name and/or category
#[utoipa::path(
    put,
    path = "/api/subcategories/{id}",
    request_body = UpdateSubcategoryDto,
    params(
        ("id" = Uuid, Path, description = "Subcategory ID")
    ),
    responses(
        (status = 200, description = "Subcategory updated", body = SubcategoryResponseDto),
        (status = 404, description = "Subcategory or new category not found")
    ),
    tag = "subcategories"
)]
pub async fn update_subcategory(
    State(service): State<Arc<SubcategoryService>>,
    AppPath(id): AppPath<Uuid>,
    AppJson(dto): AppJson<UpdateSubcategoryDto>,
) -> Result<Json<SubcategoryResponseDto>> {
    let subcategory = service.update(id, dto).await?;
    Ok(Json(subcategory))
}

/// Delete a subcategory
#[utoipa::path(
    delete,
    path = "/api/subcategories/{id}",
    params(
        ("id" = Uuid, Path, description = "Subcategory ID")
    ),
    responses(
        (status = 200, description = "Subcategory deleted", body = MessageResponse),
        (status = 404, description = "Subcategory not found"),
        (status = 409, description = "Subcategory still has products")
    ),
    tag = "subcategories"
)]
pub async fn delete_subcategory(
    State(service): State<Arc<SubcategoryService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MessageResponse>> {
    service.delete(id).await?;
    Ok(Json(MessageResponse::new("Subcategory deleted successfully")))
}

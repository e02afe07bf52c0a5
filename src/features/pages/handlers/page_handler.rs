use std::sync::Arc;

use axum::{
    extract::{Multipart, Query, State},
    response::{Html, Redirect},
    Form,
};
use minijinja::context;
use serde::Deserialize;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppPath, RequestUser};
use crate::features::categories::dtos::CreateCategoryDto;
use crate::features::dashboard::dtos::DashboardStatsDto;
use crate::features::pages::state::PagesState;
use crate::features::pages::templates::render;
use crate::features::pages::views::{
    redirect_with_notice, safe_return_to, subcategory_options, Notice, PageQuery,
};
use crate::features::products::dtos::ProductForm;
use crate::features::subcategories::dtos::{CreateSubcategoryDto, ListSubcategoriesQuery};
use crate::shared::constants::RECENT_PRODUCTS_LIMIT;

const CATEGORIES_PAGE: &str = "/admin/categories";
const SUBCATEGORIES_PAGE: &str = "/admin/subcategories";
const PRODUCTS_PAGE: &str = "/admin/products";

#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SubcategoryForm {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "categoryId")]
    pub category_id: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    pub return_to: Option<String>,
}

fn outcome<T>(result: Result<T>, success: &str) -> Notice {
    match result {
        Ok(_) => Notice::success(success),
        Err(e) => Notice::from_error(&e),
    }
}

/// Dashboard with stat cards and the most recent products
pub async fn dashboard_page(
    State(state): State<Arc<PagesState>>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>> {
    let stats = state.dashboard.stats().await.unwrap_or_else(|e| {
        tracing::error!("Failed to load dashboard stats: {}", e);
        DashboardStatsDto::default()
    });
    let products = state.products.recent(RECENT_PRODUCTS_LIMIT).await?;

    Ok(render(
        "dashboard.html",
        context! {
            active => "dashboard",
            notice => query.notice(),
            stats => stats,
            products => products,
        },
    )?)
}

pub async fn categories_page(
    State(state): State<Arc<PagesState>>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>> {
    let categories = state.categories.list().await?;

    Ok(render(
        "categories.html",
        context! {
            active => "categories",
            notice => query.notice(),
            categories => categories,
        },
    )?)
}

pub async fn create_category(
    State(state): State<Arc<PagesState>>,
    Form(form): Form<CategoryForm>,
) -> Redirect {
    let result = state
        .categories
        .create(CreateCategoryDto { name: form.name })
        .await;
    redirect_with_notice(
        CATEGORIES_PAGE,
        &outcome(result, "Category added successfully!"),
    )
}

pub async fn delete_category(
    State(state): State<Arc<PagesState>>,
    AppPath(id): AppPath<Uuid>,
) -> Redirect {
    let result = state.categories.delete(id).await;
    redirect_with_notice(CATEGORIES_PAGE, &outcome(result, "Category deleted!"))
}

/// Subcategory list; narrowed to the acting user when the request has one
pub async fn subcategories_page(
    State(state): State<Arc<PagesState>>,
    user: RequestUser,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>> {
    let list_query = ListSubcategoriesQuery {
        category_id: None,
        mine: user.id().is_some(),
    };
    let (categories, subcategories) = futures::try_join!(
        state.categories.list(),
        state.subcategories.list(list_query, user.id()),
    )?;

    Ok(render(
        "subcategories.html",
        context! {
            active => "subcategories",
            notice => query.notice(),
            categories => categories,
            subcategories => subcategories,
        },
    )?)
}

pub async fn create_subcategory(
    State(state): State<Arc<PagesState>>,
    user: RequestUser,
    Form(form): Form<SubcategoryForm>,
) -> Redirect {
    let category_id = Uuid::parse_str(form.category_id.trim()).ok();
    let result = if category_id.is_none() || form.name.trim().is_empty() {
        Err(AppError::Validation("Select category & enter name".to_string()))
    } else {
        state
            .subcategories
            .create(
                CreateSubcategoryDto {
                    name: Some(form.name),
                    category_id,
                    created_by: None,
                },
                user.id(),
            )
            .await
    };

    redirect_with_notice(
        SUBCATEGORIES_PAGE,
        &outcome(result, "Subcategory added successfully!"),
    )
}

pub async fn delete_subcategory(
    State(state): State<Arc<PagesState>>,
    AppPath(id): AppPath<Uuid>,
) -> Redirect {
    let result = state.subcategories.delete(id).await;
    redirect_with_notice(
        SUBCATEGORIES_PAGE,
        &outcome(result, "Subcategory deleted successfully!"),
    )
}

/// Product grid with the create form and, for `?edit=`, the edit modal
pub async fn products_page(
    State(state): State<Arc<PagesState>>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>> {
    let (products, categories, subcategories) = futures::try_join!(
        state.products.list(),
        state.categories.list(),
        state.subcategories.list(ListSubcategoriesQuery::default(), None),
    )?;

    let editing = query
        .edit_id()
        .and_then(|id| products.iter().find(|p| p.id == id).cloned());
    let selected_category = query
        .category()
        .or_else(|| editing.as_ref().map(|p| p.category_id.id));
    let options = subcategory_options(&subcategories, selected_category);

    Ok(render(
        "products.html",
        context! {
            active => "products",
            notice => query.notice(),
            products => products,
            categories => categories,
            subcategory_options => options,
            selected_category => selected_category,
            editing => editing,
        },
    )?)
}

pub async fn create_product(
    State(state): State<Arc<PagesState>>,
    multipart: Multipart,
) -> Redirect {
    let result = async {
        let input = ProductForm::from_multipart(multipart).await?.into_create()?;
        state.products.create(input).await
    }
    .await;

    redirect_with_notice(
        PRODUCTS_PAGE,
        &outcome(result, "Product added successfully!"),
    )
}

pub async fn update_product(
    State(state): State<Arc<PagesState>>,
    AppPath(id): AppPath<Uuid>,
    multipart: Multipart,
) -> Redirect {
    let result = async {
        let input = ProductForm::from_multipart(multipart).await?.into_update()?;
        state.products.update(id, input).await
    }
    .await;

    match result {
        Ok(_) => redirect_with_notice(
            PRODUCTS_PAGE,
            &Notice::success("Product updated successfully!"),
        ),
        Err(e) => redirect_with_notice(
            &format!("{}?edit={}", PRODUCTS_PAGE, id),
            &Notice::from_error(&e),
        ),
    }
}

/// Delete a product from either the dashboard or the products page
pub async fn delete_product(
    State(state): State<Arc<PagesState>>,
    AppPath(id): AppPath<Uuid>,
    Form(form): Form<DeleteForm>,
) -> Redirect {
    let result = state.products.delete(id).await;
    let target = safe_return_to(form.return_to.as_deref(), PRODUCTS_PAGE);
    redirect_with_notice(&target, &outcome(result, "Product deleted successfully!"))
}

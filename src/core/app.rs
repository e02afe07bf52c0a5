//! Application wiring: services, storage backend and the HTTP router

use std::path::PathBuf;
use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, http::StatusCode, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::core::config::{AppConfig, StorageBackend, StorageConfig};
use crate::core::error::Result;
use crate::core::middleware;
use crate::features::categories::{routes as categories_routes, CategoryRepository, CategoryService};
use crate::features::dashboard::{routes as dashboard_routes, DashboardService};
use crate::features::pages::{routes as pages_routes, PagesState};
use crate::features::products::{routes as products_routes, ProductRepository, ProductService};
use crate::features::subcategories::{
    routes as subcategories_routes, SubcategoryRepository, SubcategoryService,
};
use crate::modules::storage::{AssetStore, LocalDiskStore, ObjectStorageStore};

/// All feature services, built over one set of repositories and one asset store
#[derive(Clone)]
pub struct AppServices {
    pub categories: Arc<CategoryService>,
    pub subcategories: Arc<SubcategoryService>,
    pub products: Arc<ProductService>,
    pub dashboard: Arc<DashboardService>,
}

impl AppServices {
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        subcategories: Arc<dyn SubcategoryRepository>,
        products: Arc<dyn ProductRepository>,
        assets: Arc<dyn AssetStore>,
    ) -> Self {
        let category_service = Arc::new(CategoryService::new(Arc::clone(&categories)));
        let subcategory_service = Arc::new(SubcategoryService::new(
            Arc::clone(&subcategories),
            Arc::clone(&categories),
        ));
        let product_service = Arc::new(ProductService::new(
            products,
            categories,
            subcategories,
            assets,
        ));
        let dashboard_service = Arc::new(DashboardService::new(
            Arc::clone(&category_service),
            Arc::clone(&subcategory_service),
            Arc::clone(&product_service),
        ));

        Self {
            categories: category_service,
            subcategories: subcategory_service,
            products: product_service,
            dashboard: dashboard_service,
        }
    }
}

/// Directory served as static files under a URL prefix
#[derive(Debug, Clone)]
pub struct StaticUploads {
    pub public_path: String,
    pub dir: PathBuf,
}

/// HTTP-level settings for `build_router`
#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
    /// Set when images live on local disk
    pub uploads: Option<StaticUploads>,
}

impl RouterOptions {
    pub fn from_config(app: &AppConfig, storage: &StorageConfig) -> Self {
        let uploads = match storage.backend {
            StorageBackend::Local => Some(StaticUploads {
                public_path: storage.local.public_path.clone(),
                dir: storage.local.upload_dir.clone(),
            }),
            StorageBackend::ObjectStorage => None,
        };

        Self {
            cors_allowed_origins: app.cors_allowed_origins.clone(),
            max_request_body_size: app.max_request_body_size,
            uploads,
        }
    }
}

/// Build the configured image store
pub async fn build_asset_store(
    storage: &StorageConfig,
    public_base_url: &str,
) -> Result<Arc<dyn AssetStore>> {
    let store: Arc<dyn AssetStore> = match storage.backend {
        StorageBackend::Local => {
            Arc::new(LocalDiskStore::from_config(&storage.local, public_base_url).await?)
        }
        StorageBackend::ObjectStorage => {
            Arc::new(ObjectStorageStore::new(storage.object.clone()).await?)
        }
    };

    tracing::info!("Image storage backend: {}", store.backend_name());
    Ok(store)
}

async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Assemble API routes, admin pages, static uploads and the shared middleware stack.
///
/// `docs` is merged as-is so the caller decides how the OpenAPI UI is guarded.
pub fn build_router(services: &AppServices, options: &RouterOptions, docs: Router) -> Router {
    let pages_state = Arc::new(PagesState {
        categories: Arc::clone(&services.categories),
        subcategories: Arc::clone(&services.subcategories),
        products: Arc::clone(&services.products),
        dashboard: Arc::clone(&services.dashboard),
    });

    let mut app = Router::new()
        .merge(docs)
        .merge(categories_routes::routes(Arc::clone(&services.categories)))
        .merge(subcategories_routes::routes(Arc::clone(
            &services.subcategories,
        )))
        .merge(products_routes::routes(Arc::clone(&services.products)))
        .merge(dashboard_routes::routes(Arc::clone(&services.dashboard)))
        .merge(pages_routes::routes(pages_state))
        .route("/health", get(health_check));

    if let Some(uploads) = &options.uploads {
        let prefix = format!("/{}", uploads.public_path.trim_matches('/'));
        app = app.nest_service(&prefix, ServeDir::new(&uploads.dir));
    }

    app.fallback(middleware::not_found_handler)
        .layer(DefaultBodyLimit::max(options.max_request_body_size))
        .layer(
            ServiceBuilder::new()
                // Generate X-Request-Id using UUID v7 (or use client-provided one)
                .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(middleware::MakeSpanWithRequestId)
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(middleware::cors_layer(options.cors_allowed_origins.clone()))
                .layer(CatchPanicLayer::custom(middleware::panic_response)),
        )
}

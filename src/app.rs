use std::sync::Arc;

use axum::{Json, Router, http::Uri, routing::get};
use sea_orm::DatabaseConnection;
use tower_http::trace::TraceLayer;
use utoipa::openapi::{OpenApi, path::PathItem};

use crate::{
    config::AppConfig,
    core::{record::RecordCore, router::RouterCore},
    errors::ApiError,
    openapi,
    resources,
    response::Envelope,
};

/// Collects resource routers and their documentation into one application.
pub struct ApiBuilder {
    db: DatabaseConnection,
    routes: Router,
    paths: Vec<(String, PathItem)>,
}

impl ApiBuilder {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            routes: Router::new(),
            paths: Vec::new(),
        }
    }

    #[must_use]
    pub fn resource<R: RecordCore>(mut self, core: RouterCore<R>) -> Self {
        self.paths
            .extend(openapi::resource_paths::<R>(&core.action_names()));
        self.routes = self.routes.merge(core.into_router(self.db.clone()));
        tracing::debug!(resource = R::ENDPOINT, "resource mounted");
        self
    }

    /// `/ping`, `/openapi.json` and the resources under `/{api_prefix}`.
    #[must_use]
    pub fn build(self, config: &AppConfig) -> Router {
        let doc = Arc::new(openapi::document(&config.api_prefix, self.paths));

        let api = if config.api_prefix.is_empty() {
            self.routes
        } else {
            Router::new().nest(&format!("/{}", config.api_prefix), self.routes)
        };

        Router::new()
            .route("/ping", get(ping))
            .route(
                "/openapi.json",
                get(move || {
                    let doc = Arc::clone(&doc);
                    async move { openapi_json(&doc) }
                }),
            )
            .merge(api)
            .fallback(route_not_found)
            .layer(TraceLayer::new_for_http())
    }
}

async fn ping() -> Envelope<()> {
    Envelope::ok()
}

fn openapi_json(doc: &OpenApi) -> Json<OpenApi> {
    Json(doc.clone())
}

async fn route_not_found(uri: Uri) -> ApiError {
    ApiError::not_found("route", uri.path())
}

/// The application the binary serves.
#[must_use]
pub fn build_app(db: DatabaseConnection, config: &AppConfig) -> Router {
    resources::register(ApiBuilder::new(db)).build(config)
}

// ABOUTME: Main entry point for the fieldmap geospatial data collection service
// ABOUTME: Sets up the web server, routes, and initialization logic

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

mod access;
mod auth;
mod datasets;
mod entities;
mod error;
mod geometry;
mod map_data;
mod mapping_areas;
mod middleware;
mod migration;
mod session;
mod storage;
mod types;

#[cfg(test)]
mod access_tests;
#[cfg(test)]
mod storage_tests;

use session::SessionStore;
use storage::Storage;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<Storage>,
    pub sessions: SessionStore,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/datasets", get(datasets::list_datasets))
        .route("/datasets/create", post(datasets::create_dataset))
        .route("/dataset/:dataset_id/fields/", get(datasets::list_fields))
        .route("/dataset/:dataset_id/fields/create", post(datasets::create_field))
        .route("/dataset/:dataset_id/access/", post(datasets::update_access))
        .route("/dataset/:dataset_id/mapping-areas/", get(mapping_areas::list))
        .route("/dataset/:dataset_id/mapping-areas/create/", post(mapping_areas::create))
        .route(
            "/dataset/:dataset_id/mapping-areas/:area_id/update/",
            post(mapping_areas::update),
        )
        .route(
            "/dataset/:dataset_id/mapping-areas/:area_id/delete/",
            post(mapping_areas::delete),
        )
        .route("/dataset/:dataset_id/map-data/", get(map_data::map_data))
        .route(
            "/dataset/:dataset_id/geometries/create",
            post(map_data::create_geometry),
        )
        .route("/geometry/:geometry_id/", get(map_data::geometry_detail))
        .route("/geometry/:geometry_id/update", post(map_data::update_geometry))
        .route("/geometry/:geometry_id/delete", post(map_data::delete_geometry))
        .route("/geometry/:geometry_id/entries/save", post(map_data::save_entries))
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fieldmap=info,tower_http=info".into()),
        )
        .init();

    // Initialize storage and run migrations
    let storage = Arc::new(Storage::new().await?);
    let sessions = SessionStore::new();

    let state = AppState { storage, sessions };

    let listener = TcpListener::bind("0.0.0.0:3000").await?;
    tracing::info!("Server running on http://localhost:3000");

    axum::serve(listener, app(state)).await?;
    Ok(())
}

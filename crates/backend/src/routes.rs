use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;

use crate::domain::import::service::MAX_FILE_BYTES;
use crate::{handlers, AppState};

pub fn configure_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route(
            "/clients",
            get(handlers::clients::list).post(handlers::clients::create),
        )
        // Static segments win over :id in axum, so these two register safely
        // alongside the parameterized client routes.
        .route(
            "/clients/import",
            post(handlers::import_export::import)
                // Multipart framing overhead on top of the file limit.
                .layer(DefaultBodyLimit::max(MAX_FILE_BYTES + 64 * 1024)),
        )
        .route(
            "/clients/export/template",
            get(handlers::import_export::download_template),
        )
        .route(
            "/clients/:id",
            get(handlers::clients::get_by_id)
                .put(handlers::clients::update)
                .delete(handlers::clients::delete),
        )
        .route(
            "/clients/:id/activities",
            post(handlers::activities::create),
        )
        .route(
            "/clients/:id/activities/:activity_id",
            delete(handlers::activities::delete),
        )
        .route(
            "/clients/:id/stage-history",
            get(handlers::stage_history::list),
        )
        .route(
            "/clients/:id/timeline",
            get(handlers::stage_history::timeline),
        )
        .route("/analytics/stages", get(handlers::analytics::stages))
        .route("/analytics/dashboard", get(handlers::analytics::dashboard))
        .route(
            "/analytics/backfill-stage-history",
            post(handlers::analytics::backfill),
        )
        .route(
            "/services",
            get(handlers::services::list).post(handlers::services::create),
        )
        .with_state(state)
}

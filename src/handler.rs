use std::sync::Arc;

use axum::{
    Json, Router,
    http::HeaderName,
    response::IntoResponse,
    routing::get,
};

use tracing::info;

use crate::api::APIResponse;
use crate::bookmarks;
use crate::db::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub identity_header: HeaderName,
}

pub async fn healthcheck() -> impl IntoResponse {
    info!("got healthcheck request");
    Json(APIResponse::new_from_msg("ok"))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(healthcheck))
        .merge(bookmarks::routes())
        .with_state(state)
}

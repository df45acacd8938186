use axum::{
    Router,
    routing::{get, post},
};

use levelthumbs_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::handlers::health::{healthz, readyz};
use crate::handlers::user::{get_uploads, get_user, merge_user};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Users
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/uploads", get(get_uploads))
        .route("/users/{id}/merge", post(merge_user))
        .with_state(state)
        .layer(propagate_request_id_layer())
        .layer(trace_layer())
        .layer(request_id_layer())
}

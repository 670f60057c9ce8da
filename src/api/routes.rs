use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::api::handlers;
use crate::store::traits::Store;

pub fn create_router<S: Store + 'static>() -> Router<Arc<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Posts
        .route(
            "/api/posts",
            get(handlers::list_posts::<S>).post(handlers::create_post::<S>),
        )
        .route(
            "/api/posts/:id",
            get(handlers::get_post::<S>)
                .put(handlers::update_post::<S>)
                .delete(handlers::delete_post::<S>),
        )
        // Tags
        .route("/api/tag", post(handlers::create_tag::<S>))
        .route(
            "/api/tag/:id",
            get(handlers::get_tag::<S>)
                .put(handlers::update_tag::<S>)
                .delete(handlers::delete_tag::<S>),
        )
}

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::api::handlers;
use crate::store::traits::CatalogStore;

pub fn create_router<S: CatalogStore + 'static>() -> Router<Arc<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Ingredient catalog
        .route("/ingredients", post(handlers::create_ingredient::<S>))
        .route("/ingredients", get(handlers::list_ingredients::<S>))
        .route("/ingredients/:id", get(handlers::get_ingredient::<S>))
        .route("/ingredients/:id", put(handlers::update_ingredient::<S>))
        .route("/ingredients/:id", delete(handlers::delete_ingredient::<S>))
        // Drinks
        .route("/drinks", post(handlers::create_drink::<S>))
        .route("/drinks", get(handlers::list_drinks::<S>))
        .route("/drinks/info", get(handlers::drinks_info::<S>))
        .route("/drinks/:id", get(handlers::get_drink::<S>))
        .route("/drinks/:id", put(handlers::update_drink::<S>))
        .route("/drinks/:id", delete(handlers::delete_drink::<S>))
        // Variants (composed under a drink, updated standalone)
        .route(
            "/drinks/:drink_id/variants",
            post(handlers::create_variant::<S>),
        )
        .route("/variants/:id", put(handlers::update_variant::<S>))
}

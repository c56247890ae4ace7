pub mod api;
pub mod config;
pub mod error;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;

// Export the error taxonomy
pub use error::CatalogError;

// Export core logic
pub use logic::{
    clone_scale_factor, compose_variant, resolve_ingredients, unit_price, variant_pricing,
    ComposedVariant, ResolvedLine, VariantPricing,
};

// Export all model types
pub use model::*;

// Export store types
pub use store::{CatalogStore, MemoryStore, PostgresStore};

// Function for integration testing
pub async fn run_server() -> anyhow::Result<()> {
    use axum::serve;
    use std::sync::Arc;
    use tokio::net::TcpListener;

    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let config = crate::config::AppConfig::load()?;

    let database_url = config.database_url()?;
    let postgres_store = crate::store::PostgresStore::new(&database_url).await?;
    postgres_store.migrate().await?;

    let store = Arc::new(postgres_store);
    let app = crate::api::routes::create_router().with_state(store);

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;

    serve(listener, app).await?;

    Ok(())
}

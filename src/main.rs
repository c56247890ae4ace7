use axum::serve;
use brew_catalog::api::routes::create_router;
use brew_catalog::config::AppConfig;
use brew_catalog::seed;
use brew_catalog::store::PostgresStore;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("sqlx", LevelFilter::Warn)
        .init();

    let config = AppConfig::load()?;
    log::info!(
        "configuration loaded: server={}:{}",
        config.server.host,
        config.server.port
    );

    let database_url = config.database_url()?;
    let postgres_store = PostgresStore::new(&database_url).await?;

    log::info!("running database migrations");
    postgres_store.migrate().await?;

    let store = Arc::new(postgres_store);

    // Optional demo catalog for local development
    if std::env::var("LOAD_SEED_DATA").unwrap_or_default() == "true" {
        seed::load_seed_data(&*store).await?;
    }

    run_server(create_router().with_state(store), &config).await?;

    Ok(())
}

async fn run_server(app: axum::Router, config: &AppConfig) -> anyhow::Result<()> {
    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    log::info!("brew-catalog server running on http://{}", bind_address);

    serve(listener, app).await?;

    Ok(())
}

use axum::serve;
use blog_db_rust::api::routes::create_router;
use blog_db_rust::config::AppConfig;
use blog_db_rust::prepare_store;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Info by default, sqlx capped at warn; RUST_LOG overrides both
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info,sqlx=warn"),
    )
    .init();

    let config = AppConfig::load()?;
    log::info!(
        "Configuration loaded: server={}, database={}:{}/{}",
        config.server_address(),
        config.database.host,
        config.database.port,
        config.database.dbname
    );

    log::info!("Synchronizing database schema...");
    let store = match prepare_store(&config).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            log::error!("Error setting up database: {:#}", e);
            return Err(e);
        }
    };

    run_server(create_router().with_state(store), &config).await?;

    Ok(())
}

async fn run_server(app: axum::Router, config: &AppConfig) -> anyhow::Result<()> {
    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    log::info!("Starting server on {}", bind_address);

    serve(listener, app).await?;

    Ok(())
}

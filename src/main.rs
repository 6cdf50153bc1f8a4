use std::sync::Arc;

use anyhow::Context;

use diettrack_api::config::Config;
use diettrack_api::db::{self, PgStore, Store};
use diettrack_api::services::analyzer::RandomChoiceAnalyzer;
use diettrack_api::services::seed::seed_default_foods;
use diettrack_api::storage::UploadStore;
use diettrack_api::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "diettrack_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env()?);

    // Database
    let pool = db::create_pool(&config.database_url, config.db_max_connections)
        .await
        .context("Failed to connect to database")?;
    let pg = PgStore::new(pool);
    pg.migrate()
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    let store: Arc<dyn Store> = Arc::new(pg);
    if config.seed_default_foods {
        seed_default_foods(store.as_ref()).await?;
    }

    let uploads = Arc::new(UploadStore::open(config.upload_dir.clone()).await?);

    let state = AppState {
        store: store.clone(),
        config: config.clone(),
        uploads,
        analyzer: Arc::new(RandomChoiceAnalyzer::default()),
    };

    let app = build_router(state);

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

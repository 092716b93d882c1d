use anyhow::Context;
use polyclinic::bootstrap;
use polyclinic::config::Config;
use polyclinic::infrastructure::http::router::build_router;
use polyclinic::infrastructure::observability;
use polyclinic::infrastructure::persistence::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration before logging so a bad .env fails loudly
    let config = Config::from_env().context("Failed to load configuration")?;

    let _guard = observability::init(&config)?;
    tracing::info!("Configuration loaded");

    let db = Database::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection established");

    db.run_migrations()
        .await
        .context("Failed to apply migrations")?;
    tracing::info!("Database migrations applied");

    let state = bootstrap::build_app_state(db, &config);

    bootstrap::initialize_admin(&state, &config)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize admin user: {}", e))?;

    let app = build_router(state);

    let addr = config.server_address();
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

//! BizDesk Backend server binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bizdesk_backend::config::{Config, LogFormat};
use bizdesk_backend::{auth, create_router, db, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!("Starting BizDesk Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    if !config.enforce_permissions {
        tracing::warn!(
            "Permission enforcement is disabled (BIZ_ENFORCE_PERMISSIONS). The role table is advisory only!"
        );
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let state = AppState::new(pool, config.clone());

    if let Some(admin) = auth::seed_admin(&state.users, &config).await? {
        tracing::info!(user_id = %admin.id, "Seeded bootstrap administrator");
    }
    if state.users.count_users().await? == 0 {
        tracing::warn!("No users exist and BIZ_ADMIN_PIN is unset; nobody can log in");
    }

    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

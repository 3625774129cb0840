use anyhow::Result;
use gym_crm::api::{create_routes, AppState};
use gym_crm::config::{run_migrations, AppConfig, DatabaseConfig, DatabaseSeeder, StorageBackend};
use gym_crm::repositories::Repositories;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    let repositories = match config.storage_backend {
        StorageBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let pool = db_config.create_pool().await?;
            run_migrations(&pool).await?;
            info!("Connected to Postgres, migrations applied");
            Repositories::postgres(pool)
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on shutdown");
            Repositories::in_memory()
        }
    };

    let state = AppState::new(&repositories, &config);

    if config.seed_demo_data && config.is_production() {
        warn!("SEED_DEMO_DATA is ignored in production");
    } else if config.seed_demo_data {
        DatabaseSeeder::new(
            state.trainee_service.clone(),
            state.trainer_service.clone(),
            state.training_service.clone(),
        )
        .log_credentials(config.is_development())
        .seed_all()
        .await?;
    }

    let app = create_routes(state);

    let address = config.server_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Gym CRM server starting on http://{} ({})", address, config.environment);
    info!("Health check available at http://{}/health", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

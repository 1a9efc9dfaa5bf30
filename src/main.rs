//! ExpoHub
//!
//! Main application entry point

use tracing::info;

use ExpoHub::{
    config::Settings,
    database::{connection::create_pool, connection::DatabaseConfig, DatabaseService},
    services::ServiceFactory,
    utils::logging,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging; the guard keeps the file writer alive until exit
    let _guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", ExpoHub::info());

    // Initialize database connection
    info!("Connecting to database...");
    let db_config = DatabaseConfig::from_settings(&settings.database);
    let db_pool = create_pool(&db_config).await?;

    // Run database migrations
    info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&db_pool).await?;

    // Initialize services
    info!("Initializing services...");
    let database_service = DatabaseService::new(db_pool.clone());
    let _services = ServiceFactory::new(settings, database_service);

    info!("ExpoHub started; services ready for the embedding server");

    // The transport layer (out of scope here) drives the services; keep the
    // process alive and report liveness until shut down.
    loop {
        tokio::time::sleep(std::time::Duration::from_secs(60)).await;
        ExpoHub::database::health_check(&db_pool).await?;
    }
}

use dotenvy::dotenv;
use recurring_ledger::{
    config::{self, database},
    errors::Result,
    scheduler,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Tracing first so config loading can log
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Non-fatal, env vars can be set externally
    dotenv().ok();

    let app_config = config::load_app_configuration()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    let db = database::create_connection(&app_config.database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    if app_config.run_on_startup {
        // A failed startup check is retried by the daily run
        if let Err(e) = scheduler::run_startup_check(&db).await {
            error!("Startup check failed: {}", e);
        }
    }

    if !app_config.run_daily {
        info!("Daily run disabled, exiting.");
        return Ok(());
    }

    tokio::select! {
        () = scheduler::run_daily(&db, app_config.daily_run_hour) => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("Shutdown signal received, stopping.");
        }
    }

    Ok(())
}

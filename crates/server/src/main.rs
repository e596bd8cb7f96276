mod bootstrap;
mod health;

use anyhow::Result;
use propfair_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use propfair_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Config and logging come up before anything that can fail noisily.
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;

    health::spawn(
        &app.config.server.bind_address,
        app.config.server.health_check_port,
        app.db_pool.clone(),
    )
    .await?;

    tracing::info!(
        event_name = "system.server.started",
        admin_user_id = app.config.chat.admin_user_id,
        "propfair-server started"
    );

    tokio::select! {
        poll_result = app.poller.run() => {
            poll_result?;
            tracing::info!(
                event_name = "system.server.poller_finished",
                "update poller finished"
            );
        }
        shutdown = wait_for_shutdown() => {
            shutdown?;
            tracing::info!(event_name = "system.server.stopping", "propfair-server stopping");
        }
    }

    app.db_pool.close().await;
    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}

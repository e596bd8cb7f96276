use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use propfair_chat::api::HttpBotApi;
use propfair_chat::handlers::BotHandler;
use propfair_chat::poller::{ReconnectPolicy, UpdatePoller};
use propfair_core::config::{AppConfig, ConfigError, LoadOptions};
use propfair_core::domain::UserId;
use propfair_core::wizard::{InMemorySessionStore, WizardEngine};
use propfair_db::{connect_with_settings, migrations, DbPool, SqlSaleStore};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub poller: UpdatePoller<InMemorySessionStore>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(event_name = "system.bootstrap.database_connected", "database connection established");

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(event_name = "system.bootstrap.migrations_applied", "database migrations applied");

    let store = Arc::new(SqlSaleStore::new(db_pool.clone()));
    let sessions =
        InMemorySessionStore::new(Duration::from_secs(config.wizard.session_ttl_secs));
    let engine = WizardEngine::new(
        sessions,
        store.clone(),
        config.catalog.clone(),
        UserId(config.chat.admin_user_id),
    );
    let handler = BotHandler::new(engine, store, config.stats.clone());

    let api = Arc::new(HttpBotApi::new(
        config.chat.api_base_url.clone(),
        config.chat.bot_token.clone(),
    ));
    let poller = UpdatePoller::new(
        api,
        handler,
        config.chat.poll_timeout_secs,
        ReconnectPolicy::default(),
    );

    Ok(Application { config, db_pool, poller })
}

#[cfg(test)]
mod tests {
    use propfair_core::config::{ConfigOverrides, LoadOptions};

    use crate::bootstrap::bootstrap;

    fn overrides(database_url: &str, bot_token: &str, admin: Option<i64>) -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some(database_url.to_string()),
                bot_token: Some(bot_token.to_string()),
                admin_user_id: admin,
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_without_admin_identity() {
        let result = bootstrap(overrides("sqlite::memory:", "12345:token", None)).await;

        assert!(result.is_err());
        let message = result.err().expect("error").to_string();
        assert!(message.contains("chat.admin_user_id"));
    }

    #[tokio::test]
    async fn bootstrap_applies_migrations_and_wires_the_runtime() {
        let app = bootstrap(overrides("sqlite::memory:?cache=shared", "12345:token", Some(42)))
            .await
            .expect("bootstrap should succeed with valid overrides");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'sale'",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("sale table should exist after bootstrap");
        assert_eq!(table_count, 1);

        assert_eq!(app.config.chat.admin_user_id, 42);
        app.db_pool.close().await;
    }
}

use crate::commands::CommandResult;
use propfair_core::config::{AppConfig, LoadOptions};
use propfair_db::{connect_with_settings, fixtures, migrations, SqlSaleStore};

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "seed",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match crate::commands::runtime() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "seed",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let store = SqlSaleStore::new(pool.clone());
        let inserted = fixtures::seed(&store)
            .await
            .map_err(|error| ("seed_insert", error.to_string(), 6u8))?;
        pool.close().await;
        Ok::<usize, (&'static str, String, u8)>(inserted)
    });

    match result {
        Ok(inserted) => {
            CommandResult::success("seed", format!("inserted {inserted} demo sales"))
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

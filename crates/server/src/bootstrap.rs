use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use pollbot_core::config::{AppConfig, ConfigError, LoadOptions};
use pollbot_db::{connect_with_settings, migrations, DbPool, SqlLunchRepository};
use pollbot_mattermost::directory::UserDirectory;
use pollbot_mattermost::urls::PollUrls;

use crate::routes::AppState;
use crate::store::InMemoryPollStore;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("http client initialization failed: {0}")]
    HttpClient(#[source] reqwest::Error),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "server.bootstrap.start", "starting application bootstrap");

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(event_name = "server.bootstrap.database_connected", "database connection established");

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(event_name = "server.bootstrap.migrations_applied", "database migrations applied");

    let directory =
        UserDirectory::from_config(&config.mattermost).map_err(BootstrapError::HttpClient)?;
    let state = AppState {
        polls: Arc::new(InMemoryPollStore::default()),
        lunch: Arc::new(SqlLunchRepository::new(db_pool.clone())),
        resolver: Arc::new(directory),
        urls: PollUrls::new(config.server.public_url.clone()),
    };

    Ok(Application { config, db_pool, state })
}

#[cfg(test)]
mod tests {
    use pollbot_core::config::{ConfigOverrides, LoadOptions};

    use crate::bootstrap::bootstrap;

    #[tokio::test]
    async fn bootstrap_migrates_the_lunch_table() {
        let app = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:?cache=shared".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await
        .expect("bootstrap should succeed with in-memory database");

        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master \
             WHERE type = 'table' AND name = 'lunch_preferences'",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("lunch table should exist after bootstrap");
        assert_eq!(count, 1);

        app.db_pool.close().await;
    }

    #[tokio::test]
    async fn bootstrap_rejects_an_invalid_public_url() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:".to_string()),
                public_url: Some("not-a-url".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await;

        assert!(result.is_err());
        let message = result.err().expect("error").to_string();
        assert!(message.contains("public_url"));
    }
}

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use teller_chat::ChatEngine;
use teller_core::auth::verify_credentials;
use teller_core::config::{AppConfig, ConfigError, LoadOptions};
use teller_core::customers::{ClusterAssignments, CustomerTable};
use teller_core::domain::customer::CustomerId;
use teller_core::domain::session::{Sender, SessionContext};
use teller_core::errors::{ApplicationError, DomainError};
use teller_core::faq::{FaqResponder, FaqTable};
use teller_core::model::ModelBundle;
use teller_core::recommend::Recommender;
use teller_db::{
    connect_from_config, migrations, ChatLogRepository, DbPool, NewChatMessage,
    SqlChatLogRepository,
};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Fully wired process state: configuration, database pool, the loaded
/// startup artifacts, the chat engine, and the one interactive session.
pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub customers: Arc<CustomerTable>,
    pub engine: ChatEngine,
    pub session: RwLock<SessionContext>,
    pub chat_log: SqlChatLogRepository,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("startup artifact load failed: {0}")]
    ArtifactLoad(#[from] DomainError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool =
        connect_from_config(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let clusters = ClusterAssignments::load(&config.data.clusters_json)?;
    let customers = Arc::new(CustomerTable::load(&config.data.customers_csv, &clusters)?);
    let faq_table = FaqTable::load(&config.data.faq_csv)?;
    let model = ModelBundle::load(&config.data.model_json)?;
    info!(
        event_name = "system.bootstrap.artifacts_loaded",
        correlation_id = "bootstrap",
        customers = customers.len(),
        clustered = clusters.len(),
        faq_answers = faq_table.len(),
        "startup artifacts loaded"
    );

    let engine = ChatEngine::new(
        FaqResponder::new(model, faq_table),
        Recommender::new(Arc::clone(&customers)),
    );

    Ok(Application {
        config,
        db_pool: db_pool.clone(),
        customers,
        engine,
        session: RwLock::new(SessionContext::default()),
        chat_log: SqlChatLogRepository::new(db_pool),
    })
}

static TURN_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_turn_id() -> String {
    format!("turn-{:06}", TURN_COUNTER.fetch_add(1, Ordering::Relaxed) + 1)
}

impl Application {
    /// Run one conversation turn: compose the reply, persist both rows to the
    /// chat log ("You" first, then "Bot"), then mirror them into the session
    /// history. A persistence failure leaves the session history untouched so
    /// the transcript never shows a turn the log missed.
    pub async fn handle_turn(&self, input: &str) -> Result<String, ApplicationError> {
        let turn_id = next_turn_id();
        let mut session = self.session.write().await;
        let reply = self.engine.respond(&session, input);

        self.chat_log
            .append(NewChatMessage::now(Sender::You, input))
            .await
            .map_err(|error| ApplicationError::Persistence(error.to_string()))?;
        self.chat_log
            .append(NewChatMessage::now(Sender::Bot, reply.clone()))
            .await
            .map_err(|error| ApplicationError::Persistence(error.to_string()))?;

        session.record_turn(Sender::You, input);
        session.record_turn(Sender::Bot, reply.clone());

        info!(
            event_name = "chat.turn.handled",
            correlation_id = %turn_id,
            customer_id = session.customer_id.as_ref().map(CustomerId::as_str).unwrap_or("-"),
            input_chars = input.len(),
            reply_chars = reply.len(),
            "conversation turn handled"
        );

        Ok(reply)
    }

    /// Exact-match login. On failure the session is left exactly as it was,
    /// so a retry needs no reset.
    pub async fn login_customer(&self, customer_id: &str, dob: &str) -> bool {
        match verify_credentials(&self.customers, customer_id, dob) {
            Some(id) => {
                let mut session = self.session.write().await;
                info!(
                    event_name = "session.login.customer",
                    customer_id = %id.as_str(),
                    "customer session opened"
                );
                session.login_customer(id);
                true
            }
            None => {
                warn!(event_name = "session.login.rejected", "customer credentials rejected");
                false
            }
        }
    }

    pub async fn login_guest(&self) {
        self.session.write().await.login_guest();
        info!(event_name = "session.login.guest", "guest session opened");
    }

    pub async fn logout(&self) {
        self.session.write().await.logout();
        info!(event_name = "session.logout", "session cleared");
    }

    pub async fn session_snapshot(&self) -> SessionContext {
        self.session.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use teller_core::config::{AppConfig, ConfigOverrides, DataConfig, LoadOptions};
    use teller_core::fixtures::DemoDataset;
    use tempfile::TempDir;

    use crate::bootstrap::{bootstrap, bootstrap_with_config, BootstrapError};

    fn demo_config(dir: &TempDir) -> AppConfig {
        let mut config = AppConfig::default();
        config.database.url = "sqlite::memory:".to_string();
        config.database.max_connections = 1;
        config.data = DataConfig {
            customers_csv: dir.path().join("customers.csv"),
            clusters_json: dir.path().join("clusters.json"),
            faq_csv: dir.path().join("faq.csv"),
            model_json: dir.path().join("model.json"),
        };
        DemoDataset::write(&config.data).expect("demo artifacts should be writable");
        config
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_when_startup_artifacts_are_missing() {
        let empty_dir = TempDir::new().expect("tempdir");

        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:".to_string()),
                data_dir: Some(empty_dir.path().to_path_buf()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await;

        let error = match result {
            Ok(_) => panic!("bootstrap should fail without artifacts"),
            Err(error) => error,
        };
        assert!(matches!(error, BootstrapError::ArtifactLoad(_)));
        assert!(error.to_string().contains("clusters.json"));
    }

    #[tokio::test]
    async fn integration_smoke_covers_startup_login_and_turn_logging() {
        let dir = TempDir::new().expect("tempdir");
        let app = bootstrap_with_config(demo_config(&dir))
            .await
            .expect("bootstrap should succeed with demo artifacts");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'chat'",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("chat table should exist after bootstrap");
        assert_eq!(table_count, 1);

        assert!(
            app.login_customer(DemoDataset::CUSTOMER_ID, DemoDataset::CUSTOMER_DOB).await,
            "demo credentials should authenticate"
        );

        let reply = app
            .handle_turn("What are your branch hours and suggest a loan")
            .await
            .expect("turn should be handled");
        assert!(reply.contains("Loan Recommendations:"));
        assert!(reply.contains(DemoDataset::CUSTOMER_ID));

        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT sender, message FROM chat ORDER BY id")
                .fetch_all(&app.db_pool)
                .await
                .expect("chat rows should be readable");
        assert_eq!(rows.len(), 2, "one turn should append exactly two rows");
        assert_eq!(rows[0].0, "You");
        assert_eq!(rows[0].1, "What are your branch hours and suggest a loan");
        assert_eq!(rows[1].0, "Bot");
        assert_eq!(rows[1].1, reply);

        let session = app.session_snapshot().await;
        assert_eq!(session.history.len(), 2);

        app.db_pool.close().await;
    }

    #[tokio::test]
    async fn rejected_login_leaves_the_session_untouched() {
        let dir = TempDir::new().expect("tempdir");
        let app = bootstrap_with_config(demo_config(&dir))
            .await
            .expect("bootstrap should succeed with demo artifacts");

        assert!(!app.login_customer("C0000000", "01-01-1990").await);
        assert!(!app.login_customer(DemoDataset::CUSTOMER_ID, "99-99-9999").await);

        let session = app.session_snapshot().await;
        assert!(!session.logged_in);
        assert!(session.customer_id.is_none());
        assert!(session.history.is_empty());

        app.db_pool.close().await;
    }
}

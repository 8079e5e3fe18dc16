use crate::commands::CommandResult;
use teller_core::config::{AppConfig, DataConfig, LoadOptions};
use teller_core::customers::{ClusterAssignments, CustomerTable};
use teller_core::faq::FaqTable;
use teller_core::fixtures::DemoDataset;
use teller_core::model::ModelBundle;
use teller_db::{connect_with_settings, migrations};

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

    // Write the four startup artifacts to the configured data paths
    if let Err(error) = DemoDataset::write(&config.data) {
        return CommandResult::failure("seed", "seed_execution", error.to_string(), 5);
    }

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
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
        pool.close().await;
        Ok::<(), (&'static str, String, u8)>(())
    });

    if let Err((error_class, message, exit_code)) = result {
        return CommandResult::failure("seed", error_class, message, exit_code);
    }

    // Read the artifacts back so a broken write surfaces here, not at server startup
    match verify_artifacts(&config.data) {
        Ok(summary) => CommandResult::success(
            "seed",
            format!("demo dataset written and verified:\n{summary}"),
        ),
        Err(message) => CommandResult::failure("seed", "seed_verification", message, 6),
    }
}

fn verify_artifacts(data: &DataConfig) -> Result<String, String> {
    let clusters =
        ClusterAssignments::load(&data.clusters_json).map_err(|error| error.to_string())?;
    let customers =
        CustomerTable::load(&data.customers_csv, &clusters).map_err(|error| error.to_string())?;
    let faq = FaqTable::load(&data.faq_csv).map_err(|error| error.to_string())?;
    ModelBundle::load(&data.model_json).map_err(|error| error.to_string())?;

    Ok(format!(
        "  - {} ({} customers)\n  - {} ({} cluster assignments)\n  - {} ({} answer rows)\n  - {} (model bundle)",
        data.customers_csv.display(),
        customers.len(),
        data.clusters_json.display(),
        clusters.len(),
        data.faq_csv.display(),
        faq.len(),
        data.model_json.display(),
    ))
}

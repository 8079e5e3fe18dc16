use std::env;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use serde_json::Value;
use teller_cli::commands::{config, doctor, migrate, seed, smoke, start};
use tempfile::TempDir;

#[test]
fn migrate_returns_success_with_valid_env() {
    with_env(&[("TELLER_DATABASE_URL", "sqlite::memory:")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn migrate_returns_config_failure_with_non_sqlite_url() {
    with_env(&[("TELLER_DATABASE_URL", "postgres://teller")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn start_returns_config_failure_with_non_sqlite_url() {
    with_env(&[("TELLER_DATABASE_URL", "postgres://teller")], || {
        let result = start::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "start");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn seed_writes_and_verifies_the_demo_dataset() {
    let data = DataDirEnv::new();
    with_env(&data.vars(), || {
        let result = seed::run();
        assert_eq!(result.exit_code, 0, "expected successful seed run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "seed");
        assert_eq!(payload["status"], "ok");

        let message = payload["message"].as_str().unwrap_or("");
        assert!(message.contains("demo dataset written and verified"));

        assert!(data.path("customers.csv").exists());
        assert!(data.path("clusters.json").exists());
        assert!(data.path("faq.csv").exists());
        assert!(data.path("model.json").exists());
    });
}

#[test]
fn seed_is_idempotent_across_runs() {
    let data = DataDirEnv::new();
    with_env(&data.vars(), || {
        let first = seed::run();
        assert_eq!(first.exit_code, 0, "expected first seed invocation success");
        let first_payload = parse_payload(&first.output);
        assert_eq!(first_payload["command"], "seed");
        assert_eq!(first_payload["status"], "ok");

        let second = seed::run();
        assert_eq!(second.exit_code, 0, "expected second seed invocation success");
        let second_payload = parse_payload(&second.output);
        assert_eq!(second_payload["command"], "seed");
        assert_eq!(second_payload["status"], "ok");

        assert_eq!(first_payload["message"], second_payload["message"]);
    });
}

#[test]
fn smoke_returns_success_report_with_valid_env() {
    with_env(&[("TELLER_DATABASE_URL", "sqlite::memory:")], || {
        let result = smoke::run();
        assert_eq!(result.exit_code, 0, "expected successful smoke report");

        let payload = parse_payload(last_line(&result.output));
        assert_eq!(payload["command"], "smoke");
        assert_eq!(payload["status"], "pass");
        assert_eq!(payload["checks"].as_array().map(Vec::len), Some(4));
    });
}

#[test]
fn smoke_returns_failure_when_config_invalid() {
    with_env(&[("TELLER_DATABASE_URL", "postgres://teller")], || {
        let result = smoke::run();
        assert_eq!(result.exit_code, 6, "expected smoke failure code");

        let payload = parse_payload(last_line(&result.output));
        assert_eq!(payload["command"], "smoke");
        assert_eq!(payload["status"], "fail");
    });
}

#[test]
fn doctor_json_reports_pass_after_seed() {
    let data = DataDirEnv::new();
    with_env(&data.vars(), || {
        let seeded = seed::run();
        assert_eq!(seeded.exit_code, 0, "expected seed to succeed before doctor");

        let output = doctor::run(true);
        let payload = parse_payload(&output);
        assert_eq!(payload["overall_status"], "pass");

        let names: Vec<&str> = payload["checks"]
            .as_array()
            .map(|checks| checks.iter().filter_map(|check| check["name"].as_str()).collect())
            .unwrap_or_default();
        assert_eq!(names, vec!["config_validation", "artifact_readiness", "database_connectivity"]);
    });
}

#[test]
fn config_attributes_env_overrides() {
    with_env(&[("TELLER_DATABASE_URL", "sqlite::memory:")], || {
        let output = config::run();
        assert!(output.starts_with("effective config (source precedence: env > file > default):"));
        assert!(output.contains("- database.url = sqlite::memory: (source: env (TELLER_DATABASE_URL))"));
        assert!(output.contains("- server.port = 8080 (source: default)"));
        assert!(output.contains("- logging.format = Compact (source: default)"));
    });
}

struct DataDirEnv {
    dir: TempDir,
    customers_csv: String,
    clusters_json: String,
    faq_csv: String,
    model_json: String,
}

impl DataDirEnv {
    fn new() -> Self {
        let dir = TempDir::new().expect("create data tempdir");
        let join = |name: &str| dir.path().join(name).display().to_string();
        let customers_csv = join("customers.csv");
        let clusters_json = join("clusters.json");
        let faq_csv = join("faq.csv");
        let model_json = join("model.json");
        Self { dir, customers_csv, clusters_json, faq_csv, model_json }
    }

    fn vars(&self) -> [(&str, &str); 5] {
        [
            ("TELLER_DATABASE_URL", "sqlite::memory:"),
            ("TELLER_DATA_CUSTOMERS_CSV", self.customers_csv.as_str()),
            ("TELLER_DATA_CLUSTERS_JSON", self.clusters_json.as_str()),
            ("TELLER_DATA_FAQ_CSV", self.faq_csv.as_str()),
            ("TELLER_DATA_MODEL_JSON", self.model_json.as_str()),
        ]
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn last_line(output: &str) -> &str {
    output.lines().last().unwrap_or_default()
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "TELLER_DATABASE_URL",
        "TELLER_DATABASE_MAX_CONNECTIONS",
        "TELLER_DATABASE_TIMEOUT_SECS",
        "TELLER_SERVER_BIND_ADDRESS",
        "TELLER_SERVER_PORT",
        "TELLER_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "TELLER_DATA_CUSTOMERS_CSV",
        "TELLER_DATA_CLUSTERS_JSON",
        "TELLER_DATA_FAQ_CSV",
        "TELLER_DATA_MODEL_JSON",
        "TELLER_LOGGING_LEVEL",
        "TELLER_LOGGING_FORMAT",
        "TELLER_LOG_LEVEL",
        "TELLER_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}

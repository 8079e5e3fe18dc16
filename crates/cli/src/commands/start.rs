use crate::commands::CommandResult;
use teller_core::config::{AppConfig, LoadOptions};

/// Run the portal server in the foreground. Blocks until the serve loop
/// returns, which normally means a shutdown signal was handled.
pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "start",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    teller_server::init_logging(&config);

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "start",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    match runtime.block_on(teller_server::serve(config)) {
        Ok(()) => CommandResult::success("start", "server stopped cleanly"),
        Err(error) => CommandResult::failure("start", "server_runtime", error.to_string(), 4),
    }
}

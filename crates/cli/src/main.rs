use std::process::ExitCode;

fn main() -> ExitCode {
    teller_cli::run()
}

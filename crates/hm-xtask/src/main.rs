mod inspect_config;

use std::io;
use std::process::ExitCode;

use tracing::error;

fn main() -> ExitCode {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    if let Err(err) = inspect_config::run() {
        error!("{err}");

        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

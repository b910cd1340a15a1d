use std::io::{self, Write};
use std::process::ExitCode;

use hm_installer::{AgentPaths, InstallError, InstallOutcome, install, report};
use tracing::error;

/// Exit code for failures other than a missing agent file.
const UNEXPECTED_FAILURE: u8 = 2;

fn main() -> ExitCode {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let outcome = match run() {
        Ok(outcome) => outcome,
        Err(err) => {
            error!("{err}");
            #[allow(clippy::print_stderr)]
            {
                let _ = writeln!(io::stderr(), "Error: {err}");
            }

            return ExitCode::from(UNEXPECTED_FAILURE);
        }
    };

    if let Err(err) = report::write_outcome(&mut io::stdout().lock(), &outcome) {
        error!("Failed to write install report: {err}");

        return ExitCode::from(UNEXPECTED_FAILURE);
    }

    ExitCode::from(outcome.exit_code())
}

fn run() -> Result<InstallOutcome, InstallError> {
    let paths = AgentPaths::resolve()?;

    install(&paths)
}

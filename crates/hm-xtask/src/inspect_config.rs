use std::env::{self, JoinPathsError};
use std::ffi::{OsStr, OsString};
use std::io::{self, Write};
use std::path::Path;
use std::process::Command;

use thiserror::Error;
use tracing::debug;

const CONFIG_MODULE: &str = "hylang_migrations.config";
const MODULE_ROOT: &str = "src";
const PYTHON: &str = "python3";
const PYTHON_PATH_VAR: &str = "PYTHONPATH";

/// Imports the module named by `argv[1]` and prints `dir(module)` one name per
/// line. Import failures print only the exception text to stderr.
const INTROSPECT_SCRIPT: &str = "\
import importlib, sys
try:
    module = importlib.import_module(sys.argv[1])
except Exception as error:
    sys.stderr.write(str(error))
    sys.exit(1)
print('\\n'.join(dir(module)))
";

#[derive(Debug, Error)]
pub(crate) enum InspectError {
    #[error("Failed to execute {python}: {source}")]
    Spawn {
        python: String,
        #[source]
        source: io::Error,
    },
    #[error("{detail}")]
    Import { detail: String },
    #[error("Invalid PYTHONPATH: {0}")]
    PythonPath(#[from] JoinPathsError),
}

/// Prints the public attributes of the hylang-migrations config module.
///
/// Inspection failures are reported on stdout and do not fail the task.
pub(crate) fn run() -> io::Result<()> {
    let inherited_python_path = env::var_os(PYTHON_PATH_VAR);
    let result = inspect(
        PYTHON,
        Path::new(MODULE_ROOT),
        CONFIG_MODULE,
        inherited_python_path.as_deref(),
    );

    write_report(&mut io::stdout().lock(), &result)
}

fn inspect(
    python: &str,
    module_root: &Path,
    module: &str,
    inherited_python_path: Option<&OsStr>,
) -> Result<Vec<String>, InspectError> {
    let mut command = introspect_command(python, module_root, module, inherited_python_path)?;
    debug!(python, module, "Importing module for inspection");
    let output = command.output().map_err(|source| InspectError::Spawn {
        python: python.to_string(),
        source,
    })?;

    if !output.status.success() {
        let detail = String::from_utf8_lossy(&output.stderr).trim().to_string();

        return Err(InspectError::Import { detail });
    }

    Ok(public_attributes(&String::from_utf8_lossy(&output.stdout)))
}

/// Builds the interpreter invocation with `module_root` searched first.
fn introspect_command(
    python: &str,
    module_root: &Path,
    module: &str,
    inherited_python_path: Option<&OsStr>,
) -> Result<Command, InspectError> {
    let python_path = prepend_search_path(module_root, inherited_python_path)?;
    let mut command = Command::new(python);
    command
        .arg("-c")
        .arg(INTROSPECT_SCRIPT)
        .arg(module)
        .env(PYTHON_PATH_VAR, python_path);

    Ok(command)
}

fn prepend_search_path(
    module_root: &Path,
    inherited_python_path: Option<&OsStr>,
) -> Result<OsString, JoinPathsError> {
    let mut search_paths = vec![module_root.to_path_buf()];
    if let Some(inherited) = inherited_python_path {
        search_paths
            .extend(env::split_paths(inherited).filter(|path| !path.as_os_str().is_empty()));
    }

    env::join_paths(search_paths)
}

/// Keeps attribute names that are not underscore-prefixed, in order.
fn public_attributes(names_output: &str) -> Vec<String> {
    names_output
        .lines()
        .map(str::trim)
        .filter(|name| !name.is_empty() && !name.starts_with('_'))
        .map(str::to_string)
        .collect()
}

fn write_report(
    out: &mut impl Write,
    result: &Result<Vec<String>, InspectError>,
) -> io::Result<()> {
    match result {
        Ok(attributes) => {
            writeln!(out, "Available in config module:")?;
            for attribute in attributes {
                writeln!(out, "  - {attribute}")?;
            }

            Ok(())
        }
        Err(err) => writeln!(out, "Error: {err}"),
    }
}

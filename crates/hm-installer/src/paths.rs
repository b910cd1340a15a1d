//! Source and target path resolution for the bundled agent file.

use std::path::{Path, PathBuf};
use std::{env, fs};

use tracing::debug;

use crate::install::InstallError;

/// File name of the bundled Claude agent.
pub const AGENT_FILE_NAME: &str = "hylang-migrate-assistant.md";

/// Returns the `.claude/agents` directory under `root`.
pub fn agents_dir(root: &Path) -> PathBuf {
    root.join(".claude").join("agents")
}

/// Where the agent file is read from and where it is installed to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AgentPaths {
    source_file: PathBuf,
    target_dir: PathBuf,
}

impl AgentPaths {
    /// Builds paths from an explicit source root and home directory.
    pub fn new(source_root: &Path, home_dir: &Path) -> Self {
        Self {
            source_file: agents_dir(source_root).join(AGENT_FILE_NAME),
            target_dir: agents_dir(home_dir),
        }
    }

    /// Resolves paths for the running process.
    ///
    /// The source root is anchored to the running executable rather than the
    /// current directory, so the installer behaves the same wherever it is
    /// invoked from. The search never reaches the home directory, whose
    /// `.claude/agents` is the install target.
    ///
    /// # Errors
    /// Returns an error if the executable path or the home directory cannot
    /// be determined.
    pub fn resolve() -> Result<Self, InstallError> {
        let executable =
            env::current_exe().map_err(|source| InstallError::ExecutableLocation { source })?;
        let home_dir = dirs::home_dir().ok_or(InstallError::HomeDirUnavailable)?;
        let executable_dir = executable.parent().unwrap_or_else(|| Path::new("."));
        let source_root = find_source_root(executable_dir, &home_dir);
        debug!(
            executable = %executable.display(),
            source_root = %source_root.display(),
            home_dir = %home_dir.display(),
            "Resolved agent install anchors"
        );

        Ok(Self::new(&source_root, &home_dir))
    }

    pub fn source_file(&self) -> &Path {
        &self.source_file
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// Returns the installed agent file path inside the target directory.
    pub fn target_file(&self) -> PathBuf {
        self.target_dir.join(AGENT_FILE_NAME)
    }
}

/// Returns the nearest ancestor of `executable_dir` bundling the agent file,
/// stopping before `home_dir`.
///
/// Falls back to `executable_dir` itself so a missing file is reported next to
/// the binary.
fn find_source_root(executable_dir: &Path, home_dir: &Path) -> PathBuf {
    let canonical_home_dir = fs::canonicalize(home_dir).ok();
    let is_home_dir = |candidate: &Path| {
        candidate == home_dir || canonical_home_dir.as_deref() == Some(candidate)
    };

    executable_dir
        .ancestors()
        .take_while(|candidate| !is_home_dir(*candidate))
        .find(|candidate| agents_dir(candidate).join(AGENT_FILE_NAME).is_file())
        .unwrap_or(executable_dir)
        .to_path_buf()
}

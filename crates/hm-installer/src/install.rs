//! Installs the bundled agent file into the user's Claude agents directory.

use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::paths::AgentPaths;

/// Unexpected failures while installing the agent file.
///
/// A missing source file is not an error; see [`InstallOutcome::SourceMissing`].
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("Failed to determine the installer executable path: {source}")]
    ExecutableLocation {
        #[source]
        source: io::Error,
    },
    #[error("Failed to determine the home directory")]
    HomeDirUnavailable,
    #[error("Agent file source and target are the same file: {}", .path.display())]
    SameFile { path: PathBuf },
    #[error("Failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result of a completed install run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InstallOutcome {
    /// The agent file was copied to `target_file`.
    Installed { target_file: PathBuf },
    /// No agent file exists at `source_file`; nothing was copied.
    SourceMissing { source_file: PathBuf },
}

impl InstallOutcome {
    /// Returns the process exit code reported for this outcome.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Installed { .. } => 0,
            Self::SourceMissing { .. } => 1,
        }
    }
}

/// Copies the agent file into the target directory, creating it if needed.
///
/// The target directory is created even when the source file is missing. An
/// existing target file is overwritten and receives the source's timestamps.
///
/// # Errors
/// Returns an error if the target directory cannot be created, the source and
/// target are the same file, or the file cannot be copied.
pub fn install(paths: &AgentPaths) -> Result<InstallOutcome, InstallError> {
    let target_dir = paths.target_dir();
    fs::create_dir_all(target_dir).map_err(|source| InstallError::Io {
        action: "create directory",
        path: target_dir.to_path_buf(),
        source,
    })?;

    let source_file = paths.source_file();
    if !source_file.is_file() {
        debug!(source_file = %source_file.display(), "Agent file not found");

        return Ok(InstallOutcome::SourceMissing {
            source_file: source_file.to_path_buf(),
        });
    }

    let target_file = paths.target_file();
    if is_same_file(source_file, &target_file) {
        return Err(InstallError::SameFile { path: target_file });
    }
    copy_with_times(source_file, &target_file)?;
    debug!(
        source_file = %source_file.display(),
        target_file = %target_file.display(),
        "Copied agent file"
    );

    Ok(InstallOutcome::Installed { target_file })
}

/// Returns `true` when both paths resolve to one existing file, which a copy
/// would truncate.
fn is_same_file(source_file: &Path, target_file: &Path) -> bool {
    match (fs::canonicalize(source_file), fs::canonicalize(target_file)) {
        (Ok(source), Ok(target)) => source == target,
        _ => false,
    }
}

/// Copies contents and permissions, then carries over access and
/// modification times.
fn copy_with_times(source_file: &Path, target_file: &Path) -> Result<(), InstallError> {
    fs::copy(source_file, target_file).map_err(|source| InstallError::Io {
        action: "copy agent file to",
        path: target_file.to_path_buf(),
        source,
    })?;

    let read_times = |source: io::Error| InstallError::Io {
        action: "read timestamps of",
        path: source_file.to_path_buf(),
        source,
    };
    let metadata = fs::metadata(source_file).map_err(read_times)?;
    let times = FileTimes::new()
        .set_accessed(metadata.accessed().map_err(read_times)?)
        .set_modified(metadata.modified().map_err(read_times)?);

    let write_times = |source: io::Error| InstallError::Io {
        action: "set timestamps of",
        path: target_file.to_path_buf(),
        source,
    };
    File::open(target_file)
        .and_then(|file| file.set_times(times))
        .map_err(write_times)
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use tempfile::{TempDir, tempdir};

    use super::*;
    use crate::paths::{AGENT_FILE_NAME, agents_dir};

    fn write_source(repo: &TempDir, content: &str) -> PathBuf {
        let bundled_dir = agents_dir(repo.path());
        fs::create_dir_all(&bundled_dir).expect("mkdir");
        let source_file = bundled_dir.join(AGENT_FILE_NAME);
        fs::write(&source_file, content).expect("write");

        source_file
    }

    #[test]
    fn test_install_copies_agent_file() {
        // Arrange
        let repo = tempdir().expect("failed to create temp dir");
        let home = tempdir().expect("failed to create temp dir");
        write_source(&repo, "X");
        let paths = AgentPaths::new(repo.path(), home.path());

        // Act
        let outcome = install(&paths).expect("install failed");

        // Assert
        let target_file = agents_dir(home.path()).join(AGENT_FILE_NAME);
        assert_eq!(
            outcome,
            InstallOutcome::Installed {
                target_file: target_file.clone()
            }
        );
        assert_eq!(outcome.exit_code(), 0);
        assert!(paths.target_dir().is_dir());
        assert_eq!(fs::read(target_file).expect("read"), b"X");
    }

    #[test]
    fn test_install_twice_yields_same_content() {
        // Arrange
        let repo = tempdir().expect("failed to create temp dir");
        let home = tempdir().expect("failed to create temp dir");
        write_source(&repo, "agent body\n");
        let paths = AgentPaths::new(repo.path(), home.path());

        // Act
        let first = install(&paths).expect("first install failed");
        let first_content = fs::read(paths.target_file()).expect("read");
        let second = install(&paths).expect("second install failed");

        // Assert
        assert_eq!(first.exit_code(), 0);
        assert_eq!(second.exit_code(), 0);
        assert_eq!(fs::read(paths.target_file()).expect("read"), first_content);
    }

    #[test]
    fn test_install_overwrites_existing_target() {
        // Arrange
        let repo = tempdir().expect("failed to create temp dir");
        let home = tempdir().expect("failed to create temp dir");
        write_source(&repo, "X");
        let paths = AgentPaths::new(repo.path(), home.path());
        fs::create_dir_all(paths.target_dir()).expect("mkdir");
        fs::write(paths.target_file(), "Y").expect("write");

        // Act
        let outcome = install(&paths).expect("install failed");

        // Assert
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(fs::read(paths.target_file()).expect("read"), b"X");
    }

    #[test]
    fn test_install_missing_source_creates_target_dir_only() {
        // Arrange
        let repo = tempdir().expect("failed to create temp dir");
        let home = tempdir().expect("failed to create temp dir");
        let paths = AgentPaths::new(repo.path(), home.path());

        // Act
        let outcome = install(&paths).expect("install failed");

        // Assert
        assert_eq!(
            outcome,
            InstallOutcome::SourceMissing {
                source_file: paths.source_file().to_path_buf()
            }
        );
        assert_eq!(outcome.exit_code(), 1);
        assert!(paths.target_dir().is_dir());
        assert!(!paths.target_file().exists());
    }

    #[test]
    fn test_install_missing_source_leaves_existing_target_untouched() {
        // Arrange
        let repo = tempdir().expect("failed to create temp dir");
        let home = tempdir().expect("failed to create temp dir");
        let paths = AgentPaths::new(repo.path(), home.path());
        fs::create_dir_all(paths.target_dir()).expect("mkdir");
        fs::write(paths.target_file(), "Y").expect("write");

        // Act
        let outcome = install(&paths).expect("install failed");

        // Assert
        assert_eq!(outcome.exit_code(), 1);
        assert_eq!(fs::read(paths.target_file()).expect("read"), b"Y");
    }

    #[test]
    fn test_install_preserves_modification_time() {
        // Arrange
        let repo = tempdir().expect("failed to create temp dir");
        let home = tempdir().expect("failed to create temp dir");
        let source_file = write_source(&repo, "X");
        let modified = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        File::options()
            .write(true)
            .open(&source_file)
            .and_then(|file| file.set_modified(modified))
            .expect("set mtime");
        let paths = AgentPaths::new(repo.path(), home.path());

        // Act
        install(&paths).expect("install failed");

        // Assert
        let target_modified = fs::metadata(paths.target_file())
            .and_then(|metadata| metadata.modified())
            .expect("read mtime");
        assert_eq!(target_modified, modified);
    }

    #[test]
    fn test_install_reports_unwritable_target_dir() {
        // Arrange
        let repo = tempdir().expect("failed to create temp dir");
        let home = tempdir().expect("failed to create temp dir");
        write_source(&repo, "X");
        fs::write(home.path().join(".claude"), "not a directory").expect("write");
        let paths = AgentPaths::new(repo.path(), home.path());

        // Act
        let result = install(&paths);

        // Assert
        let error = result.expect_err("install should fail");
        assert!(matches!(error, InstallError::Io { .. }));
        assert!(
            error.to_string().contains("Failed to create directory"),
            "{error}"
        );
    }

    #[test]
    fn test_install_refuses_to_copy_file_onto_itself() {
        // Arrange
        let home = tempdir().expect("failed to create temp dir");
        write_source(&home, "previously installed agent");
        let paths = AgentPaths::new(home.path(), home.path());

        // Act
        let result = install(&paths);

        // Assert
        let error = result.expect_err("install should fail");
        assert!(matches!(error, InstallError::SameFile { .. }), "{error}");
        assert_eq!(
            fs::read_to_string(paths.target_file()).expect("read"),
            "previously installed agent"
        );
    }

    #[test]
    fn test_install_copies_read_only_source() {
        // Arrange
        let repo = tempdir().expect("failed to create temp dir");
        let home = tempdir().expect("failed to create temp dir");
        let source_file = write_source(&repo, "X");
        let mut permissions = fs::metadata(&source_file).expect("metadata").permissions();
        permissions.set_readonly(true);
        fs::set_permissions(&source_file, permissions).expect("chmod");
        let paths = AgentPaths::new(repo.path(), home.path());

        // Act
        let outcome = install(&paths).expect("install failed");

        // Assert
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(fs::read(paths.target_file()).expect("read"), b"X");
        assert!(
            fs::metadata(paths.target_file())
                .expect("metadata")
                .permissions()
                .readonly()
        );
    }
}

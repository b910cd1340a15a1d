//! Installs the hylang-migrate-assistant Claude agent into `~/.claude/agents`.

pub mod install;
pub mod paths;
pub mod report;

pub use install::{InstallError, InstallOutcome, install};
pub use paths::{AGENT_FILE_NAME, AgentPaths};

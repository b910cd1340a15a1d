//! Console messages for install outcomes.

use std::io::{self, Write};
use std::path::Path;

use crate::install::InstallOutcome;

const REPOSITORY_HINT: &str = "Make sure you're running from the hylang-migrations repository root";
const CAPABILITIES: [&str; 4] = [
    "Creating and managing migrations",
    "Debugging migration issues",
    "Schema design best practices",
    "Hylang v1.1.0 migration syntax",
];

/// Writes the human-readable report for `outcome`.
///
/// # Errors
/// Returns an error if writing to `out` fails.
pub fn write_outcome(out: &mut impl Write, outcome: &InstallOutcome) -> io::Result<()> {
    match outcome {
        InstallOutcome::Installed { target_file } => write_installed(out, target_file),
        InstallOutcome::SourceMissing { source_file } => write_source_missing(out, source_file),
    }
}

fn write_installed(out: &mut impl Write, target_file: &Path) -> io::Result<()> {
    writeln!(
        out,
        "✅ Successfully installed Claude agent to: {}",
        target_file.display()
    )?;
    writeln!(out)?;
    writeln!(out, "📝 The hylang-migrate-assistant is now available!")?;
    writeln!(out, "   Use it in Claude Code to get expert help with:")?;
    for capability in CAPABILITIES {
        writeln!(out, "   • {capability}")?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "💡 Tip: In Claude Code, type '/agents' to see and use the assistant!"
    )
}

fn write_source_missing(out: &mut impl Write, source_file: &Path) -> io::Result<()> {
    writeln!(
        out,
        "❌ Error: Agent file not found at {}",
        source_file.display()
    )?;
    writeln!(out, "   {REPOSITORY_HINT}")
}

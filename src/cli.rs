//! CLI argument definitions.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::config::ConfigOverrides;
use crate::scanner::Dialect;

/// Top-level CLI parser for `goldthread`.
#[derive(Debug, Parser)]
#[command(name = "goldthread", version, about = "Trace requirements to the tests that verify them")]
pub struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the traceability report and orphan list.
    Audit {
        /// Input selection.
        #[command(flatten)]
        inputs: InputArgs,
        /// Report path (default: <root>/visual/traceability_audit.json).
        #[arg(long)]
        out: Option<PathBuf>,
        /// Orphan list path (default: <root>/visual/traceability_orphans.tsv).
        #[arg(long)]
        orphans_out: Option<PathBuf>,
        /// Report title.
        #[arg(long)]
        title: Option<String>,
        /// Report subtitle.
        #[arg(long)]
        subtitle: Option<String>,
        /// Exit with status 1 when the audit is not clean.
        #[arg(long)]
        strict: bool,
    },
    /// Check traceability without writing any files.
    Check {
        /// Input selection.
        #[command(flatten)]
        inputs: InputArgs,
        /// Output format.
        #[arg(long, value_enum, default_value_t = CheckFormat::Text)]
        format: CheckFormat,
    },
}

/// Output of `goldthread check`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CheckFormat {
    /// Tab-separated orphan list.
    Text,
    /// Classified graph as JSON.
    Json,
}

/// Options shared by every command that reads the input tree.
#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// Project root that every input directory is relative to.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
    /// Config file (default: $GOLDTHREAD_CONFIG, then <root>/goldthread.yaml).
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Label shown for the root in reports.
    #[arg(long)]
    pub display_root: Option<String>,
    /// Requirement directory, relative to root. Can be repeated.
    #[arg(long = "req-dir")]
    pub req_dirs: Vec<PathBuf>,
    /// Test item directory, relative to root. Can be repeated.
    #[arg(long = "test-dir")]
    pub test_dirs: Vec<PathBuf>,
    /// Directory scanned for test annotations, relative to root. Can be repeated.
    #[arg(long = "test-scan-dir")]
    pub test_scan_dirs: Vec<PathBuf>,
    /// Annotation dialect to recognise. Can be repeated (default: all).
    #[arg(long = "dialect", value_enum)]
    pub dialects: Vec<Dialect>,
    /// Structured-comment marker prefix.
    #[arg(long)]
    pub marker_prefix: Option<String>,
    /// Use the file name as the id of records without a `uid`.
    #[arg(long = "uid-from-filename")]
    pub uid_from_file_stem: bool,
}

impl InputArgs {
    /// The config values these flags override.
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            requirement_dirs: self.req_dirs.clone(),
            test_item_dirs: self.test_dirs.clone(),
            test_scan_dirs: self.test_scan_dirs.clone(),
            dialects: self.dialects.clone(),
            marker_prefix: self.marker_prefix.clone(),
            uid_from_file_stem: self.uid_from_file_stem,
            display_root: self.display_root.clone(),
            ..ConfigOverrides::default()
        }
    }
}

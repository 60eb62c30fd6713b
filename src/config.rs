//! Audit configuration.
//!
//! Sources, lowest precedence first: built-in defaults, a YAML config file,
//! then command-line overrides. Relative paths in a config file are relative
//! to the audit root; relative paths on the command line are relative to the
//! working directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::ServiceContext;
use crate::diagnostics::AuditError;
use crate::loader::LoadOptions;
use crate::scanner::{Dialect, ScanOptions};
use crate::trace::DuplicatePolicy;

/// Config file looked up in the audit root when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "goldthread.yaml";

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "GOLDTHREAD_CONFIG";

const DEFAULT_SKIP_DIRS: [&str; 10] = [
    ".git",
    ".venv",
    "__pycache__",
    ".mypy_cache",
    ".pytest_cache",
    ".ruff_cache",
    "node_modules",
    "dist",
    "build",
    "target",
];

const DEFAULT_SKIP_NAMES: [&str; 4] =
    [".doorstop.yml", "doorstop.yml", ".doorstop.skip", ".doorstop.skip-all"];

/// Everything one audit run needs to know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuditConfig {
    /// Audit root; never read from a config file.
    #[serde(skip)]
    pub root: PathBuf,
    /// Requirement record directories.
    pub requirement_dirs: Vec<PathBuf>,
    /// YAML test item directories.
    pub test_item_dirs: Vec<PathBuf>,
    /// Test source directories to scan for annotations.
    pub test_scan_dirs: Vec<PathBuf>,
    /// Directory names never descended into.
    pub skip_dirs: Vec<String>,
    /// Record file names to ignore.
    pub skip_names: Vec<String>,
    /// Enabled annotation dialects, in detection order.
    pub dialects: Vec<Dialect>,
    /// Structured-comment marker prefix.
    pub marker_prefix: String,
    /// Labels that open a docstring block.
    pub docstring_labels: Vec<String>,
    /// Fall back to the file stem when a record has no `uid`.
    pub uid_from_file_stem: bool,
    /// Whether colliding explicit test ids make a run unclean.
    pub duplicate_test_ids: DuplicatePolicy,
    /// Label shown for the root in reports (default `.`).
    pub display_root: Option<String>,
    /// Report title.
    pub title: String,
    /// Report subtitle.
    pub subtitle: String,
    /// Report path (default `<root>/visual/traceability_audit.json`).
    pub output: Option<PathBuf>,
    /// Orphan list path (default `<root>/visual/traceability_orphans.tsv`).
    pub orphans_output: Option<PathBuf>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            requirement_dirs: vec![PathBuf::from("reqs/mon")],
            test_item_dirs: Vec::new(),
            test_scan_dirs: Vec::new(),
            skip_dirs: DEFAULT_SKIP_DIRS.iter().map(ToString::to_string).collect(),
            skip_names: DEFAULT_SKIP_NAMES.iter().map(ToString::to_string).collect(),
            dialects: Dialect::ALL.to_vec(),
            marker_prefix: "HODOR".to_string(),
            docstring_labels: vec!["Requirements:".to_string()],
            uid_from_file_stem: false,
            duplicate_test_ids: DuplicatePolicy::Warn,
            display_root: None,
            title: "Traceability Audit".to_string(),
            subtitle: "Audit-focused view of requirement coverage and test linkage.".to_string(),
            output: None,
            orphans_output: None,
        }
    }
}

/// Values given on the command line. Empty lists and `None` leave the
/// configured value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Replaces `requirement_dirs`.
    pub requirement_dirs: Vec<PathBuf>,
    /// Replaces `test_item_dirs`.
    pub test_item_dirs: Vec<PathBuf>,
    /// Replaces `test_scan_dirs`.
    pub test_scan_dirs: Vec<PathBuf>,
    /// Replaces `dialects`.
    pub dialects: Vec<Dialect>,
    /// Replaces `marker_prefix`.
    pub marker_prefix: Option<String>,
    /// Turns on `uid_from_file_stem` when set.
    pub uid_from_file_stem: bool,
    /// Replaces `display_root`.
    pub display_root: Option<String>,
    /// Replaces `title`.
    pub title: Option<String>,
    /// Replaces `subtitle`.
    pub subtitle: Option<String>,
    /// Replaces `output`.
    pub output: Option<PathBuf>,
    /// Replaces `orphans_output`.
    pub orphans_output: Option<PathBuf>,
}

impl AuditConfig {
    /// Resolves and loads the config for `root`.
    ///
    /// `explicit` (from `--config`) wins over `from_env` (from
    /// [`CONFIG_ENV`]); both must exist. Otherwise `<root>/goldthread.yaml`
    /// is used when present, and built-in defaults when not.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Config`] if a named file is missing, unreadable,
    /// not valid YAML, contains unknown keys, or fails validation.
    pub fn load(
        ctx: &ServiceContext,
        root: &Path,
        explicit: Option<&Path>,
        from_env: Option<&Path>,
    ) -> Result<Self, AuditError> {
        let path = match explicit.or(from_env) {
            Some(path) if !ctx.fs.exists(path) => {
                return Err(AuditError::Config {
                    path: path.to_path_buf(),
                    message: "file not found".to_string(),
                });
            }
            Some(path) => Some(path.to_path_buf()),
            None => Some(root.join(DEFAULT_CONFIG_FILE)).filter(|p| ctx.fs.exists(p)),
        };

        let mut config = match &path {
            Some(path) => Self::from_file(ctx, path)?,
            None => Self::default(),
        };
        config.root = root.to_path_buf();
        config.output = config.output.map(|p| root.join(p));
        config.orphans_output = config.orphans_output.map(|p| root.join(p));
        debug!(config = ?path, root = %root.display(), "configuration resolved");
        Ok(config)
    }

    fn from_file(ctx: &ServiceContext, path: &Path) -> Result<Self, AuditError> {
        let fail = |message: String| AuditError::Config { path: path.to_path_buf(), message };
        let contents = ctx.fs.read_to_string(path).map_err(|e| fail(e.to_string()))?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(&contents).map_err(|e| fail(e.to_string()))?;
        config.validate().map_err(fail)?;
        Ok(config)
    }

    /// Applies command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Config`] if the merged config is invalid.
    pub fn apply(mut self, overrides: ConfigOverrides) -> Result<Self, AuditError> {
        let replace = |target: &mut Vec<PathBuf>, value: Vec<PathBuf>| {
            if !value.is_empty() {
                *target = value;
            }
        };
        replace(&mut self.requirement_dirs, overrides.requirement_dirs);
        replace(&mut self.test_item_dirs, overrides.test_item_dirs);
        replace(&mut self.test_scan_dirs, overrides.test_scan_dirs);
        if !overrides.dialects.is_empty() {
            self.dialects = overrides.dialects;
        }
        self.uid_from_file_stem |= overrides.uid_from_file_stem;
        if let Some(prefix) = overrides.marker_prefix {
            self.marker_prefix = prefix;
        }
        if let Some(label) = overrides.display_root {
            self.display_root = Some(label);
        }
        if let Some(title) = overrides.title {
            self.title = title;
        }
        if let Some(subtitle) = overrides.subtitle {
            self.subtitle = subtitle;
        }
        if let Some(output) = overrides.output {
            self.output = Some(output);
        }
        if let Some(output) = overrides.orphans_output {
            self.orphans_output = Some(output);
        }
        self.validate().map_err(|message| AuditError::Config {
            path: PathBuf::from("<command line>"),
            message,
        })?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), String> {
        if self.dialects.is_empty() {
            return Err("at least one dialect must be enabled".to_string());
        }
        if self.marker_prefix.is_empty()
            || !self.marker_prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(format!("invalid marker prefix `{}`", self.marker_prefix));
        }
        if self.dialects.contains(&Dialect::DocstringBlock)
            && self.docstring_labels.iter().all(|l| l.trim().is_empty())
        {
            return Err("docstring dialect enabled without a label".to_string());
        }
        Ok(())
    }

    /// Loader settings.
    #[must_use]
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            skip_dirs: self.skip_dirs.clone(),
            skip_names: self.skip_names.clone(),
            uid_from_file_stem: self.uid_from_file_stem,
        }
    }

    /// Scanner settings.
    #[must_use]
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            dialects: self.dialects.clone(),
            marker_prefix: self.marker_prefix.clone(),
            docstring_labels: self.docstring_labels.iter().map(|l| l.trim().to_string()).collect(),
            skip_dirs: self.skip_dirs.clone(),
        }
    }

    /// Root label shown in reports.
    #[must_use]
    pub fn display_root(&self) -> &str {
        self.display_root.as_deref().unwrap_or(".")
    }

    /// Where the report artifact goes.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.root.join("visual").join("traceability_audit.json"))
    }

    /// Where the orphan list goes.
    #[must_use]
    pub fn orphans_path(&self) -> PathBuf {
        self.orphans_output
            .clone()
            .unwrap_or_else(|| self.root.join("visual").join("traceability_orphans.tsv"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryFileSystem;
    use pretty_assertions::assert_eq;

    fn ctx_with(path: &str, contents: &str) -> ServiceContext {
        ServiceContext::in_memory(
            MemoryFileSystem::new().with_file(path, contents).with_file("/repo/reqs/mon/a.yml", ""),
        )
    }

    #[test]
    fn defaults_apply_without_a_config_file() {
        let ctx = ctx_with("/repo/README.md", "");
        let config = AuditConfig::load(&ctx, Path::new("/repo"), None, None).unwrap();
        assert_eq!(config.root, PathBuf::from("/repo"));
        assert_eq!(config.requirement_dirs, vec![PathBuf::from("reqs/mon")]);
        assert_eq!(config.marker_prefix, "HODOR");
        assert_eq!(config.output_path(), PathBuf::from("/repo/visual/traceability_audit.json"));
        assert!(config.skip_dirs.contains(&"node_modules".to_string()));
    }

    #[test]
    fn root_config_file_is_picked_up() {
        let ctx = ctx_with(
            "/repo/goldthread.yaml",
            "test_scan_dirs: [tests]\ndialects: [docstring-block]\nduplicate_test_ids: fail\n",
        );
        let config = AuditConfig::load(&ctx, Path::new("/repo"), None, None).unwrap();
        assert_eq!(config.test_scan_dirs, vec![PathBuf::from("tests")]);
        assert_eq!(config.dialects, vec![Dialect::DocstringBlock]);
        assert_eq!(config.duplicate_test_ids, DuplicatePolicy::Fail);
        assert_eq!(config.title, "Traceability Audit");
    }

    #[test]
    fn configured_output_paths_resolve_against_root() {
        let ctx = ctx_with(
            "/repo/goldthread.yaml",
            "output: reports/audit.json\norphans_output: /tmp/orphans.tsv\n",
        );
        let config = AuditConfig::load(&ctx, Path::new("/repo"), None, None).unwrap();
        assert_eq!(config.output_path(), PathBuf::from("/repo/reports/audit.json"));
        assert_eq!(config.orphans_path(), PathBuf::from("/tmp/orphans.tsv"));
    }

    #[test]
    fn explicit_config_beats_env_and_must_exist() {
        let ctx = ctx_with("/cfg/explicit.yaml", "marker_prefix: TRACE\n");
        let config = AuditConfig::load(
            &ctx,
            Path::new("/repo"),
            Some(Path::new("/cfg/explicit.yaml")),
            Some(Path::new("/cfg/missing.yaml")),
        )
        .unwrap();
        assert_eq!(config.marker_prefix, "TRACE");

        let missing = Path::new("/cfg/missing.yaml");
        let err = AuditConfig::load(&ctx, Path::new("/repo"), None, Some(missing)).unwrap_err();
        assert!(matches!(err, AuditError::Config { .. }));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let ctx = ctx_with("/repo/goldthread.yaml", "requirement_dir: [reqs]\n");
        let err = AuditConfig::load(&ctx, Path::new("/repo"), None, None).unwrap_err();
        assert!(err.to_string().contains("requirement_dir"), "{err}");
    }

    #[test]
    fn empty_config_file_means_defaults() {
        let ctx = ctx_with("/repo/goldthread.yaml", "\n");
        let config = AuditConfig::load(&ctx, Path::new("/repo"), None, None).unwrap();
        assert_eq!(config.dialects, Dialect::ALL.to_vec());
    }

    #[test]
    fn overrides_replace_configured_values() {
        let base =
            AuditConfig { test_scan_dirs: vec![PathBuf::from("tests")], ..AuditConfig::default() };
        let config = base
            .apply(ConfigOverrides {
                requirement_dirs: vec![PathBuf::from("reqs/sys")],
                marker_prefix: Some("TRACE".into()),
                uid_from_file_stem: true,
                ..ConfigOverrides::default()
            })
            .unwrap();
        assert_eq!(config.requirement_dirs, vec![PathBuf::from("reqs/sys")]);
        assert_eq!(config.test_scan_dirs, vec![PathBuf::from("tests")]);
        assert_eq!(config.scan_options().marker_prefix, "TRACE");
        assert!(config.load_options().uid_from_file_stem);
    }

    #[test]
    fn invalid_prefix_is_rejected() {
        let err = AuditConfig::default()
            .apply(ConfigOverrides {
                marker_prefix: Some("HO DOR".into()),
                ..ConfigOverrides::default()
            })
            .unwrap_err();
        assert!(err.to_string().contains("marker prefix"));
    }
}

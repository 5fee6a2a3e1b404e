//! Configuration file loading for shipkit.
//!
//! Discovers and loads `shipkit.toml` from the repository root.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use serde::Deserialize;
use shipkit_tasks::TaskOptions;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "shipkit.toml";

/// Top-level configuration from shipkit.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShipkitConfig {
    pub artifacts: ArtifactsConfig,
    pub cov: CovConfig,
    pub docs: DocsConfig,
    pub publish: PublishConfig,
}

/// Artifacts section of the config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// Artifacts directory, relative to the repo root unless absolute.
    pub dir: Utf8PathBuf,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: Utf8PathBuf::from("artifacts"),
        }
    }
}

/// `[cov]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CovConfig {
    /// Full replacement command line for the coverage step.
    pub command: Option<Vec<String>>,
}

/// `[docs]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    /// Full replacement command line for the docs build step.
    pub command: Option<Vec<String>>,

    /// Whether to open the built docs afterwards.
    pub open: bool,

    /// Path of the index to open, relative to the repo root.
    pub index: Option<Utf8PathBuf>,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            command: None,
            open: true,
            index: None,
        }
    }
}

/// `[publish]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Full replacement command line for the package step.
    pub package_command: Option<Vec<String>>,

    /// Full replacement command line for the upload step.
    pub publish_command: Option<Vec<String>>,

    /// Allow publishing from a dirty working tree.
    pub allow_dirty: bool,
}

/// Discover the shipkit.toml config file.
///
/// Searches for `shipkit.toml` in the repository root directory.
/// Returns `None` if no config file is found.
pub fn discover_config(repo_root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = repo_root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a shipkit.toml config file.
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<ShipkitConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<ShipkitConfig> {
    let config: ShipkitConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from repo root, or return default if not found.
pub fn load_or_default(repo_root: &Utf8Path) -> anyhow::Result<ShipkitConfig> {
    match discover_config(repo_root) {
        Some(path) => load_config(&path),
        None => Ok(ShipkitConfig::default()),
    }
}

/// Merged configuration combining config file and CLI arguments.
#[derive(Debug, Clone)]
pub struct MergedConfig {
    /// Artifacts directory (config file; CLI `--artifacts-dir` overrides later).
    pub artifacts_dir: Utf8PathBuf,

    /// Catalog-level task options.
    pub options: TaskOptions,

    /// Whether publishing may run from a dirty working tree.
    pub allow_dirty: bool,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: ShipkitConfig,
}

impl ConfigMerger {
    /// Create a new merger from a loaded config.
    pub fn new(config: ShipkitConfig) -> Self {
        Self { config }
    }

    /// Merge with task command CLI arguments.
    ///
    /// Boolean CLI flags override config file settings when explicitly set:
    /// `--no-open` wins over `docs.open`, `--allow-dirty` enables publishing
    /// from a dirty tree even when the config forbids it.
    pub fn merge_task_args(self, cli_no_open: bool, cli_allow_dirty: bool) -> MergedConfig {
        let options = TaskOptions {
            cov_command: self.config.cov.command,
            docs_command: self.config.docs.command,
            docs_index: self.config.docs.index,
            open_docs: self.config.docs.open && !cli_no_open,
            package_command: self.config.publish.package_command,
            publish_command: self.config.publish.publish_command,
        };

        MergedConfig {
            artifacts_dir: self.config.artifacts.dir,
            options,
            allow_dirty: cli_allow_dirty || self.config.publish.allow_dirty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_example_config() {
        let contents = r#"
[artifacts]
dir = "build-reports"

[cov]
command = ["cargo", "llvm-cov", "--html"]

[docs]
open = false

[publish]
allow_dirty = true
"#;

        let config = parse_config(contents).unwrap();
        assert_eq!(config.artifacts.dir, "build-reports");
        assert_eq!(
            config.cov.command.as_deref(),
            Some(&["cargo".to_string(), "llvm-cov".to_string(), "--html".to_string()][..])
        );
        assert!(!config.docs.open);
        assert!(config.publish.allow_dirty);
    }

    #[test]
    fn test_parse_minimal_config() {
        let contents = r#"
[docs]
index = "site/index.html"
"#;

        let config = parse_config(contents).unwrap();
        assert_eq!(config.docs.index.as_deref().map(|p| p.as_str()), Some("site/index.html"));
        // Defaults
        assert!(config.docs.open);
        assert!(config.cov.command.is_none());
        assert!(!config.publish.allow_dirty);
        assert_eq!(config.artifacts.dir, "artifacts");
    }

    #[test]
    fn test_parse_empty_config() {
        let contents = "";
        let config = parse_config(contents).unwrap();
        assert!(config.cov.command.is_none());
        assert!(config.docs.open);
        assert_eq!(config.artifacts.dir, "artifacts");
    }

    #[test]
    fn test_parse_invalid_toml_fails() {
        let err = parse_config("[docs\nopen = maybe").unwrap_err();
        assert!(err.to_string().contains("invalid TOML"));
    }

    #[test]
    fn test_merge_no_open_flag_overrides_config() {
        let config = parse_config("[docs]\nopen = true\n").unwrap();
        let merged = ConfigMerger::new(config).merge_task_args(true, false);
        assert!(!merged.options.open_docs);
    }

    #[test]
    fn test_merge_config_open_false_kept_without_flag() {
        let config = parse_config("[docs]\nopen = false\n").unwrap();
        let merged = ConfigMerger::new(config).merge_task_args(false, false);
        assert!(!merged.options.open_docs);
    }

    #[test]
    fn test_merge_allow_dirty_cli_overrides() {
        let config = ShipkitConfig::default();
        let merged = ConfigMerger::new(config).merge_task_args(false, true);
        assert!(merged.allow_dirty);
    }

    #[test]
    fn test_merge_allow_dirty_config_used_when_cli_false() {
        let config = parse_config("[publish]\nallow_dirty = true\n").unwrap();
        let merged = ConfigMerger::new(config).merge_task_args(false, false);
        assert!(merged.allow_dirty);
    }

    #[test]
    fn test_merge_carries_command_overrides() {
        let config = parse_config(
            r#"
[publish]
package_command = ["cargo", "package", "--no-verify"]
publish_command = ["cargo", "publish", "--registry", "internal"]
"#,
        )
        .unwrap();
        let merged = ConfigMerger::new(config).merge_task_args(false, false);
        assert_eq!(
            merged.options.package_command.as_deref().unwrap()[2],
            "--no-verify"
        );
        assert_eq!(
            merged.options.publish_command.as_deref().unwrap()[3],
            "internal"
        );
    }

    #[test]
    fn test_discover_config_some_and_none() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        assert!(discover_config(&root).is_none());

        std::fs::write(root.join(CONFIG_FILE_NAME), "").expect("write config");
        assert!(discover_config(&root).is_some());
    }

    #[test]
    fn test_load_or_default_returns_default_when_missing() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        let cfg = load_or_default(&root).expect("load default");
        assert!(cfg.cov.command.is_none());
        assert!(cfg.docs.open);
    }

    #[test]
    fn test_load_config_reports_path_on_bad_file() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        let path = root.join(CONFIG_FILE_NAME);
        std::fs::write(&path, "not = [valid").expect("write config");

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains(CONFIG_FILE_NAME));
    }
}

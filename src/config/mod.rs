//! Configuration management for `reportpub`.
//!
//! Configuration sources and precedence (highest wins):
//! 1. CLI overrides
//! 2. Environment variables (`RPUB_*` plus the deployment variables
//!    `REPORT_REPO_URL`, `REPORT_BRANCH`, `SLACK_WEBHOOK_URL`, `REPORT_BASE_URL`)
//! 3. Project config (`<root>/.rpub.yaml`, or `--config <path>`)
//! 4. User config (`~/.config/rpub/config.yaml`)
//! 5. Defaults

use crate::error::{OptionExt, PublishError, Result};
use crate::util::{normalize_lexically, resolve_against};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::env;
use std::fs;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

/// Project config filename looked up in the workspace root.
pub const PROJECT_CONFIG_FILENAME: &str = ".rpub.yaml";

/// Prefix for generic environment overrides.
const ENV_PREFIX: &str = "RPUB_";

/// Well-known deployment variables and the keys they set.
const DEPLOYMENT_ENV_VARS: &[(&str, &str)] = &[
    ("REPORT_REPO_URL", keys::REPO_URL),
    ("REPORT_BRANCH", keys::BRANCH),
    ("SLACK_WEBHOOK_URL", keys::WEBHOOK_URL),
    ("REPORT_BASE_URL", keys::REPORT_BASE_URL),
];

/// Recognized configuration keys.
pub mod keys {
    pub const REPO_URL: &str = "repo-url";
    pub const BRANCH: &str = "branch";
    pub const ARTIFACTS_DIR: &str = "artifacts-dir";
    pub const RUN_PREFIX: &str = "run-prefix";
    pub const ARTIFACTS_MARKER: &str = "artifacts-marker";
    pub const SUMMARY_FILE: &str = "summary-file";
    pub const TIMESTAMP_FILE: &str = "timestamp-file";
    pub const SCRATCH_DIR: &str = "scratch-dir";
    pub const METADATA_FILE: &str = "metadata-file";
    pub const RESULTS_FILE: &str = "results-file";
    pub const INDEX_FILE: &str = "index-file";
    pub const AUTHOR_NAME: &str = "author-name";
    pub const AUTHOR_EMAIL: &str = "author-email";
    pub const WEBHOOK_URL: &str = "webhook-url";
    pub const REPORT_BASE_URL: &str = "report-base-url";
    pub const TEST_COMMAND: &str = "test-command";

    pub const ALL: &[&str] = &[
        REPO_URL,
        BRANCH,
        ARTIFACTS_DIR,
        RUN_PREFIX,
        ARTIFACTS_MARKER,
        SUMMARY_FILE,
        TIMESTAMP_FILE,
        SCRATCH_DIR,
        METADATA_FILE,
        RESULTS_FILE,
        INDEX_FILE,
        AUTHOR_NAME,
        AUTHOR_EMAIL,
        WEBHOOK_URL,
        REPORT_BASE_URL,
        TEST_COMMAND,
    ];
}

/// A single configuration layer of normalized `key -> value` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub values: HashMap<String, String>,
}

impl ConfigLayer {
    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    /// Insert a value under its normalized key.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(normalize_key(key), value.into());
    }

    /// Look up a value; blank values read as unset.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(&normalize_key(key))
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// Build a layer from a YAML file path. Missing files return empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let value: serde_yaml::Value = serde_yaml::from_str(&contents).map_err(|e| {
            PublishError::Config(format!("Failed to parse {}: {e}", path.display()))
        })?;
        Ok(layer_from_yaml_value(&value))
    }

    /// Build a layer from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_vars(env::vars())
    }

    /// Build a layer from an explicit set of environment variables.
    ///
    /// Deployment variables are applied first so that an explicit
    /// `RPUB_<KEY>` wins over them.
    #[must_use]
    pub fn from_env_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let vars: Vec<(String, String)> = vars
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.into()))
            .collect();
        let mut layer = Self::default();

        for (var, key) in DEPLOYMENT_ENV_VARS {
            if let Some((_, value)) = vars.iter().find(|(name, _)| name == var) {
                layer.set(key, value.clone());
            }
        }

        for (name, value) in &vars {
            if let Some(stripped) = name.strip_prefix(ENV_PREFIX) {
                layer.set(stripped, value.clone());
            }
        }

        layer
    }
}

/// CLI overrides for config loading (optional).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// Workspace root; defaults to the current directory.
    pub root: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub repo_url: Option<String>,
    pub branch: Option<String>,
    pub artifacts_dir: Option<PathBuf>,
    pub webhook_url: Option<String>,
    pub no_color: bool,
}

impl CliOverrides {
    /// The workspace root all relative settings resolve against.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the current directory cannot be determined.
    pub fn resolve_root(&self) -> Result<PathBuf> {
        match &self.root {
            Some(root) if root.is_absolute() => Ok(root.clone()),
            Some(root) => Ok(env::current_dir()?.join(root)),
            None => Ok(env::current_dir()?),
        }
    }

    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();

        if let Some(url) = &self.repo_url {
            layer.set(keys::REPO_URL, url.clone());
        }
        if let Some(branch) = &self.branch {
            layer.set(keys::BRANCH, branch.clone());
        }
        if let Some(dir) = &self.artifacts_dir {
            layer.set(keys::ARTIFACTS_DIR, dir.to_string_lossy().to_string());
        }
        if let Some(url) = &self.webhook_url {
            layer.set(keys::WEBHOOK_URL, url.clone());
        }

        layer
    }
}

/// Default config layer (lowest precedence).
#[must_use]
pub fn default_config_layer() -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    for (key, value) in [
        (keys::BRANCH, "gh-pages"),
        (keys::ARTIFACTS_DIR, "playwright-report"),
        (keys::RUN_PREFIX, "report-"),
        (keys::ARTIFACTS_MARKER, "-artifacts"),
        (keys::SUMMARY_FILE, "run_results.json"),
        (keys::TIMESTAMP_FILE, "timestamp.txt"),
        (keys::SCRATCH_DIR, "temp-publish-dir"),
        (keys::METADATA_FILE, "report_index_data.json"),
        (keys::RESULTS_FILE, "results.json"),
        (keys::INDEX_FILE, "index.html"),
        (keys::AUTHOR_NAME, "report-publisher"),
        (keys::AUTHOR_EMAIL, "report-publisher@users.noreply.local"),
        (keys::TEST_COMMAND, "npx playwright test"),
    ] {
        layer.set(key, value);
    }
    layer
}

/// Load user config (`~/.config/rpub/config.yaml`) relative to `home`.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config(home: Option<&Path>) -> Result<ConfigLayer> {
    let Some(home) = home else {
        return Ok(ConfigLayer::default());
    };
    ConfigLayer::from_yaml(&home.join(".config").join("rpub").join("config.yaml"))
}

/// Load project config from an explicit path or `<root>/.rpub.yaml`.
///
/// # Errors
///
/// Returns an error if an explicit path does not exist, or if the file cannot
/// be read or parsed.
pub fn load_project_config(root: &Path, explicit: Option<&Path>) -> Result<ConfigLayer> {
    match explicit {
        Some(path) => {
            let path = resolve_against(root, path);
            if !path.is_file() {
                return Err(PublishError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            ConfigLayer::from_yaml(&path)
        }
        None => ConfigLayer::from_yaml(&root.join(PROJECT_CONFIG_FILENAME)),
    }
}

/// Load configuration with the full precedence order from the real environment.
///
/// # Errors
///
/// Returns an error if any config file cannot be read or parsed.
pub fn load_config(root: &Path, cli: &CliOverrides) -> Result<ConfigLayer> {
    let home = env::var_os("HOME").map(PathBuf::from);
    load_config_with(root, home.as_deref(), ConfigLayer::from_env(), cli)
}

/// Load configuration from explicit sources (used directly by tests).
///
/// # Errors
///
/// Returns an error if any config file cannot be read or parsed.
pub fn load_config_with(
    root: &Path,
    home: Option<&Path>,
    env_layer: ConfigLayer,
    cli: &CliOverrides,
) -> Result<ConfigLayer> {
    let defaults = default_config_layer();
    let user = load_user_config(home)?;
    let project = load_project_config(root, cli.config.as_deref())?;
    let cli_layer = cli.as_layer();

    let merged = ConfigLayer::merge_layers(&[defaults, user, project, env_layer, cli_layer]);
    for key in merged.values.keys() {
        if !keys::ALL.contains(&key.as_str()) {
            tracing::warn!(key = %key, "Ignoring unknown configuration key");
        }
    }
    Ok(merged)
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    /// Workspace root all relative paths are resolved against.
    pub root: PathBuf,
    /// Remote index repository URL (required for publishing).
    pub repo_url: Option<String>,
    /// Branch serving the index site.
    pub branch: String,
    /// Local artifacts root containing one directory per run.
    pub artifacts_dir: PathBuf,
    /// Name prefix identifying run directories.
    pub run_prefix: String,
    /// Marker excluding sidecar directories from run discovery.
    pub artifacts_marker: String,
    /// Hand-off file between extraction and publishing.
    pub summary_file: PathBuf,
    /// File holding the current run key.
    pub timestamp_file: PathBuf,
    /// Ephemeral checkout of the index branch.
    pub scratch_dir: PathBuf,
    /// Metadata document name at the index root.
    pub metadata_file: String,
    /// Per-run summary file name.
    pub results_file: String,
    /// Index page name at the index root (also the per-run report page).
    pub index_file: String,
    pub author_name: String,
    pub author_email: String,
    pub webhook_url: Option<String>,
    pub report_base_url: Option<String>,
    /// Test command argv.
    pub test_command: Vec<String>,
}

impl Settings {
    /// Resolve settings from a merged layer.
    ///
    /// # Errors
    ///
    /// Returns a config error if a required key is missing or a file name
    /// setting contains a path separator.
    pub fn from_layer(root: &Path, layer: &ConfigLayer) -> Result<Self> {
        let path_value = |key: &str| -> Result<PathBuf> {
            let value = layer.get(key).required(key)?;
            Ok(resolve_against(root, Path::new(value)))
        };
        let string_value =
            |key: &str| -> Result<String> { Ok(layer.get(key).required(key)?.to_string()) };
        let file_name = |key: &str| -> Result<String> {
            let value = string_value(key)?;
            if value.contains(['/', '\\']) {
                return Err(PublishError::Config(format!(
                    "'{key}' must be a plain file name, got '{value}'"
                )));
            }
            Ok(value)
        };

        let test_command: Vec<String> = string_value(keys::TEST_COMMAND)?
            .split_whitespace()
            .map(str::to_string)
            .collect();

        let settings = Self {
            root: root.to_path_buf(),
            repo_url: layer.get(keys::REPO_URL).map(str::to_string),
            branch: string_value(keys::BRANCH)?,
            artifacts_dir: path_value(keys::ARTIFACTS_DIR)?,
            run_prefix: string_value(keys::RUN_PREFIX)?,
            artifacts_marker: string_value(keys::ARTIFACTS_MARKER)?,
            summary_file: path_value(keys::SUMMARY_FILE)?,
            timestamp_file: path_value(keys::TIMESTAMP_FILE)?,
            scratch_dir: path_value(keys::SCRATCH_DIR)?,
            metadata_file: file_name(keys::METADATA_FILE)?,
            results_file: file_name(keys::RESULTS_FILE)?,
            index_file: file_name(keys::INDEX_FILE)?,
            author_name: string_value(keys::AUTHOR_NAME)?,
            author_email: string_value(keys::AUTHOR_EMAIL)?,
            webhook_url: layer.get(keys::WEBHOOK_URL).map(str::to_string),
            report_base_url: layer
                .get(keys::REPORT_BASE_URL)
                .map(|url| url.trim_end_matches('/').to_string()),
            test_command,
        };
        settings.check_scratch_dir()?;
        Ok(settings)
    }

    /// Ensure the scratch checkout cannot swallow local data.
    ///
    /// The scratch directory is deleted wholesale before and after every
    /// publish, so it must not be the workspace root or the artifacts root,
    /// contain either of them, or sit inside the artifacts root.
    ///
    /// # Errors
    ///
    /// Returns a config error naming the conflicting directory.
    pub fn check_scratch_dir(&self) -> Result<()> {
        let scratch = normalize_lexically(&self.scratch_dir);
        let root = normalize_lexically(&self.root);
        let artifacts = normalize_lexically(&self.artifacts_dir);
        let conflict = if root.starts_with(&scratch) {
            Some("workspace root")
        } else if artifacts.starts_with(&scratch) || scratch.starts_with(&artifacts) {
            Some("artifacts directory")
        } else {
            None
        };
        match conflict {
            Some(what) => Err(PublishError::Config(format!(
                "'{}' ({}) overlaps the {what}; it is deleted on every publish",
                keys::SCRATCH_DIR,
                self.scratch_dir.display()
            ))),
            None => Ok(()),
        }
    }

    /// Settings with all defaults, rooted at `root`.
    ///
    /// # Errors
    ///
    /// Propagates [`Settings::from_layer`] errors.
    pub fn defaults(root: &Path) -> Result<Self> {
        Self::from_layer(root, &default_config_layer())
    }

    /// The repository URL, required for publishing.
    ///
    /// # Errors
    ///
    /// Returns `MissingSetting` if no layer provides `repo-url`.
    pub fn require_repo_url(&self) -> Result<&str> {
        self.repo_url.as_deref().required(keys::REPO_URL)
    }

    /// Flat `key -> value` view for display.
    #[must_use]
    pub fn to_display_map(&self) -> BTreeMap<&'static str, String> {
        let path = |p: &Path| p.display().to_string();
        let opt = |v: &Option<String>| v.clone().unwrap_or_else(|| "(unset)".to_string());
        BTreeMap::from([
            (keys::REPO_URL, opt(&self.repo_url)),
            (keys::BRANCH, self.branch.clone()),
            (keys::ARTIFACTS_DIR, path(&self.artifacts_dir)),
            (keys::RUN_PREFIX, self.run_prefix.clone()),
            (keys::ARTIFACTS_MARKER, self.artifacts_marker.clone()),
            (keys::SUMMARY_FILE, path(&self.summary_file)),
            (keys::TIMESTAMP_FILE, path(&self.timestamp_file)),
            (keys::SCRATCH_DIR, path(&self.scratch_dir)),
            (keys::METADATA_FILE, self.metadata_file.clone()),
            (keys::RESULTS_FILE, self.results_file.clone()),
            (keys::INDEX_FILE, self.index_file.clone()),
            (keys::AUTHOR_NAME, self.author_name.clone()),
            (keys::AUTHOR_EMAIL, self.author_email.clone()),
            (keys::WEBHOOK_URL, opt(&self.webhook_url)),
            (keys::REPORT_BASE_URL, opt(&self.report_base_url)),
            (keys::TEST_COMMAND, self.test_command.join(" ")),
        ])
    }
}

/// Load and resolve settings for the root selected by `cli`.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or resolved.
pub fn load_settings(cli: &CliOverrides) -> Result<Settings> {
    let root = cli.resolve_root()?;
    let layer = load_config(&root, cli)?;
    Settings::from_layer(&root, &layer)
}

/// Whether terminal output should be colored.
#[must_use]
pub fn should_use_color(cli: &CliOverrides) -> bool {
    !cli.no_color && env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal()
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('_', "-")
}

fn layer_from_yaml_value(value: &serde_yaml::Value) -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    let mut flat = HashMap::new();
    flatten_yaml(value, "", &mut flat);

    for (key, value) in flat {
        layer.set(&key, value);
    }

    layer
}

fn flatten_yaml(value: &serde_yaml::Value, prefix: &str, out: &mut HashMap<String, String>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, value) in map {
                let Some(key_str) = key.as_str() else {
                    continue;
                };
                let next_prefix = if prefix.is_empty() {
                    key_str.to_string()
                } else {
                    format!("{prefix}.{key_str}")
                };
                flatten_yaml(value, &next_prefix, out);
            }
        }
        serde_yaml::Value::Sequence(values) => {
            let joined = values
                .iter()
                .filter_map(yaml_scalar_to_string)
                .collect::<Vec<_>>()
                .join(" ");
            out.insert(prefix.to_string(), joined);
        }
        _ => {
            if let Some(value) = yaml_scalar_to_string(value) {
                out.insert(prefix.to_string(), value);
            }
        }
    }
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Bool(v) => Some(v.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_) => None,
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn no_env() -> ConfigLayer {
        ConfigLayer::default()
    }

    #[test]
    fn defaults_resolve_against_root() {
        let settings = Settings::defaults(Path::new("/work")).unwrap();
        assert_eq!(settings.branch, "gh-pages");
        assert_eq!(settings.artifacts_dir, PathBuf::from("/work/playwright-report"));
        assert_eq!(settings.summary_file, PathBuf::from("/work/run_results.json"));
        assert_eq!(settings.scratch_dir, PathBuf::from("/work/temp-publish-dir"));
        assert_eq!(settings.metadata_file, "report_index_data.json");
        assert_eq!(settings.test_command, vec!["npx", "playwright", "test"]);
        assert!(settings.repo_url.is_none());
    }

    #[test]
    fn merge_precedence_order() {
        let temp = TempDir::new().expect("tempdir");
        let home = temp.path().join("home");
        let root = temp.path().join("project");
        fs::create_dir_all(home.join(".config").join("rpub")).unwrap();
        fs::create_dir_all(&root).unwrap();
        fs::write(
            home.join(".config").join("rpub").join("config.yaml"),
            "branch: user-branch\nrun-prefix: run-\n",
        )
        .unwrap();
        fs::write(
            root.join(PROJECT_CONFIG_FILENAME),
            "branch: project-branch\nrepo_url: git@example.com:org/reports.git\n",
        )
        .unwrap();

        let env_layer = ConfigLayer::from_env_vars([("RPUB_BRANCH", "env-branch")]);
        let cli = CliOverrides::default();
        let merged = load_config_with(&root, Some(&home), env_layer.clone(), &cli).unwrap();
        assert_eq!(merged.get(keys::BRANCH), Some("env-branch"));
        assert_eq!(merged.get(keys::RUN_PREFIX), Some("run-"));
        assert_eq!(
            merged.get(keys::REPO_URL),
            Some("git@example.com:org/reports.git")
        );

        let cli = CliOverrides {
            branch: Some("cli-branch".to_string()),
            ..Default::default()
        };
        let merged = load_config_with(&root, Some(&home), env_layer, &cli).unwrap();
        assert_eq!(merged.get(keys::BRANCH), Some("cli-branch"));
    }

    #[test]
    fn deployment_env_vars_map_to_keys() {
        let layer = ConfigLayer::from_env_vars([
            ("REPORT_REPO_URL", "https://example.com/reports.git"),
            ("SLACK_WEBHOOK_URL", "https://hooks.example.com/x"),
            ("REPORT_BASE_URL", "https://org.example.io/reports/"),
            ("UNRELATED", "ignored"),
        ]);
        assert_eq!(
            layer.get(keys::REPO_URL),
            Some("https://example.com/reports.git")
        );
        assert_eq!(
            layer.get(keys::WEBHOOK_URL),
            Some("https://hooks.example.com/x")
        );
        assert!(layer.get("unrelated").is_none());

        let settings = Settings::from_layer(
            Path::new("/work"),
            &ConfigLayer::merge_layers(&[default_config_layer(), layer]),
        )
        .unwrap();
        assert_eq!(
            settings.report_base_url.as_deref(),
            Some("https://org.example.io/reports")
        );
    }

    #[test]
    fn prefixed_env_wins_over_deployment_var() {
        let layer = ConfigLayer::from_env_vars([
            ("RPUB_REPO_URL", "explicit"),
            ("REPORT_REPO_URL", "deployment"),
        ]);
        assert_eq!(layer.get(keys::REPO_URL), Some("explicit"));
    }

    #[test]
    fn blank_values_read_as_unset() {
        let mut layer = default_config_layer();
        layer.set(keys::REPO_URL, "   ");
        let settings = Settings::from_layer(Path::new("/work"), &layer).unwrap();
        assert!(settings.repo_url.is_none());
        assert!(matches!(
            settings.require_repo_url(),
            Err(PublishError::MissingSetting { .. })
        ));
    }

    #[test]
    fn scratch_dir_may_not_overlap_local_data() {
        for value in [".", "playwright-report", "playwright-report/tmp", "..", "/", "./playwright-report/."] {
            let mut layer = default_config_layer();
            layer.set(keys::SCRATCH_DIR, value);
            assert!(
                matches!(
                    Settings::from_layer(Path::new("/work"), &layer),
                    Err(PublishError::Config(_))
                ),
                "scratch-dir '{value}' should be rejected"
            );
        }

        for value in ["temp-publish-dir", "/tmp/rpub-scratch", "build/publish"] {
            let mut layer = default_config_layer();
            layer.set(keys::SCRATCH_DIR, value);
            assert!(
                Settings::from_layer(Path::new("/work"), &layer).is_ok(),
                "scratch-dir '{value}' should be accepted"
            );
        }
    }

    #[test]
    fn scratch_dir_check_catches_direct_assignment() {
        let mut settings = Settings::defaults(Path::new("/work")).unwrap();
        assert!(settings.check_scratch_dir().is_ok());
        settings.scratch_dir = settings.artifacts_dir.clone();
        assert!(matches!(
            settings.check_scratch_dir(),
            Err(PublishError::Config(_))
        ));
    }

    #[test]
    fn file_name_settings_reject_paths() {
        let mut layer = default_config_layer();
        layer.set(keys::METADATA_FILE, "../escape.json");
        assert!(matches!(
            Settings::from_layer(Path::new("/work"), &layer),
            Err(PublishError::Config(_))
        ));
    }

    #[test]
    fn explicit_config_path_must_exist() {
        let temp = TempDir::new().expect("tempdir");
        let cli = CliOverrides {
            config: Some(PathBuf::from("missing.yaml")),
            ..Default::default()
        };
        let err = load_config_with(temp.path(), None, no_env(), &cli).unwrap_err();
        assert!(matches!(err, PublishError::Config(_)));
    }

    #[test]
    fn nested_yaml_flattens_and_sequences_join() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("cfg.yaml");
        fs::write(
            &path,
            "test-command: [npx, playwright, test, --project=chromium]\nextra:\n  nested: 1\n",
        )
        .unwrap();
        let layer = ConfigLayer::from_yaml(&path).unwrap();
        assert_eq!(
            layer.get(keys::TEST_COMMAND),
            Some("npx playwright test --project=chromium")
        );
        assert_eq!(layer.get("extra.nested"), Some("1"));
    }

    #[test]
    fn invalid_yaml_is_config_error() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("cfg.yaml");
        fs::write(&path, "branch: [unterminated\n").unwrap();
        assert!(matches!(
            ConfigLayer::from_yaml(&path),
            Err(PublishError::Config(_))
        ));
    }
}

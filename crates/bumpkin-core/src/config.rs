//! Configuration loading, discovery and persistence.
//!
//! Configuration is discovered by walking up from the working directory and
//! merged with user config and defaults via figment. Supported formats:
//! TOML (`.toml`), YAML (`.yaml`, `.yml`) and JSON (`.json`).
//!
//! Locations, highest precedence first:
//! - an explicit file passed on the command line
//! - `.bumpkin.<ext>` or `bumpkin.<ext>` in the working directory or a parent
//! - `config.<ext>` in the user config directory (e.g. `~/.config/bumpkin/`)
//!
//! After a successful bump the discovered file is rewritten in place by
//! [`update_config_file`] so `current_version` tracks the project.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Format, Json, Serialized, Toml, Yaml};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::files::FileChange;
use crate::scm::ScmInfo;
use crate::version::{VersionResult, VersionSpec};

/// Default parse pattern: plain three-component semver.
pub const DEFAULT_PARSE: &str = r"(?P<major>\d+)\.(?P<minor>\d+)\.(?P<patch>\d+)";

/// Default serialize template.
pub const DEFAULT_SERIALIZE: &str = "{major}.{minor}.{patch}";

/// The configuration for bumpkin.
///
/// Deserialized from discovered config files; every field has a default so
/// a minimal file only needs `current_version` and the `[[file]]` entries.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Log level for the CLI (e.g. "debug", "info", "warn", "error").
    pub log_level: LogLevel,
    /// The version currently recorded for the project.
    pub current_version: Option<String>,
    /// Regex with named capture groups that parses the version string.
    pub parse: String,
    /// Template that renders a version back to a string.
    pub serialize: String,
    /// Component ordering, highest precedence first.
    pub parts: Vec<String>,
    /// Files to rewrite on bump (`[[file]]` tables).
    pub file: Vec<FileChange>,
    /// Commit the rewritten files.
    pub commit: bool,
    /// Tag the commit.
    pub tag: bool,
    /// Sign the tag.
    pub sign_tags: bool,
    /// Permit bumping with uncommitted changes in the working tree.
    pub allow_dirty: bool,
    /// Commit message template.
    pub message: String,
    /// Tag name template.
    pub tag_name: String,
    /// Tag message template.
    pub tag_message: String,
    /// Extra arguments appended to the commit command, shell-quoted.
    pub commit_args: Option<String>,
    /// Detected SCM capability. Never read from config files.
    #[serde(skip)]
    pub scm_info: ScmInfo,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            current_version: None,
            parse: DEFAULT_PARSE.to_string(),
            serialize: DEFAULT_SERIALIZE.to_string(),
            parts: vec!["major".into(), "minor".into(), "patch".into()],
            file: Vec::new(),
            commit: false,
            tag: false,
            sign_tags: false,
            allow_dirty: false,
            message: "Bump version: {current_version} → {new_version}".to_string(),
            tag_name: "v{new_version}".to_string(),
            tag_message: "Bump version: {current_version} → {new_version}".to_string(),
            commit_args: None,
            scm_info: ScmInfo::default(),
        }
    }
}

impl Config {
    /// Compile the version spec described by this configuration.
    pub fn version_spec(&self) -> VersionResult<VersionSpec> {
        VersionSpec::new(&self.parse, &self.serialize, &self.parts)
    }
}

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Verbose output for debugging.
    Debug,
    /// Standard operational information (default).
    #[default]
    Info,
    /// Warnings about potential issues.
    Warn,
    /// Errors that indicate failures.
    Error,
}

impl LogLevel {
    /// The log level as a lowercase string slice.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Supported configuration file extensions, in order of preference.
const CONFIG_EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

/// Application name for config file names and the user config directory.
const APP_NAME: &str = "bumpkin";

/// Builder for loading configuration from multiple sources.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    search_root: Option<Utf8PathBuf>,
    use_user_config: bool,
    boundary_marker: Option<String>,
    explicit_files: Vec<Utf8PathBuf>,
}

impl ConfigLoader {
    /// Create a loader with default settings.
    ///
    /// User config is included and the walk-up stops at the first directory
    /// containing `.git`.
    pub fn new() -> Self {
        Self {
            search_root: None,
            use_user_config: true,
            boundary_marker: Some(".git".to_string()),
            explicit_files: Vec::new(),
        }
    }

    /// Walk up from `path` looking for a project config file.
    pub fn with_project_search<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.search_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Include or exclude user config from the platform config directory.
    pub const fn with_user_config(mut self, include: bool) -> Self {
        self.use_user_config = include;
        self
    }

    /// Search all the way to the filesystem root instead of stopping at a
    /// repository boundary.
    pub fn without_boundary_marker(mut self) -> Self {
        self.boundary_marker = None;
        self
    }

    /// Add an explicit config file, loaded after (and overriding) any
    /// discovered files. May be called more than once; later files win.
    pub fn with_file<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.explicit_files.push(path.as_ref().to_path_buf());
        self
    }

    /// Load configuration, merging all sources over the defaults.
    #[instrument(skip(self), fields(search_root = ?self.search_root))]
    pub fn load(self) -> ConfigResult<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if self.use_user_config
            && let Some(path) = user_config_file()
        {
            debug!(%path, "merging user config");
            figment = merge_file(figment, &path);
        }

        if let Some(ref root) = self.search_root
            && let Some(path) = self.discover(root)
        {
            debug!(%path, "merging project config");
            figment = merge_file(figment, &path);
        }

        for path in &self.explicit_files {
            debug!(%path, "merging explicit config");
            figment = merge_file(figment, path);
        }

        let config: Config = figment
            .extract()
            .map_err(|e| ConfigError::Deserialize(Box::new(e)))?;
        debug!(log_level = config.log_level.as_str(), "configuration loaded");
        Ok(config)
    }

    /// Walk up from `start`, returning the first config file found.
    fn discover(&self, start: &Utf8Path) -> Option<Utf8PathBuf> {
        let mut dir = start;
        loop {
            for ext in CONFIG_EXTENSIONS {
                let dotted = dir.join(format!(".{APP_NAME}.{ext}"));
                if dotted.is_file() {
                    return Some(dotted);
                }
                let plain = dir.join(format!("{APP_NAME}.{ext}"));
                if plain.is_file() {
                    return Some(plain);
                }
            }
            // The repository root is the last directory searched.
            if let Some(ref marker) = self.boundary_marker
                && dir.join(marker).exists()
            {
                return None;
            }
            dir = dir.parent()?;
        }
    }
}

/// Find the project config file without loading it.
///
/// This is the file [`update_config_file`] rewrites after a bump.
pub fn find_project_config<P: AsRef<Utf8Path>>(start: P) -> Option<Utf8PathBuf> {
    ConfigLoader::new()
        .with_project_search(start.as_ref())
        .discover(start.as_ref())
}

/// The user config file, if one exists.
fn user_config_file() -> Option<Utf8PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", APP_NAME)?;
    for ext in CONFIG_EXTENSIONS {
        let path = dirs.config_dir().join(format!("config.{ext}"));
        if path.is_file() {
            return Utf8PathBuf::from_path_buf(path).ok();
        }
    }
    None
}

/// Merge a config file into the figment, picking the provider by extension.
fn merge_file(figment: Figment, path: &Utf8Path) -> Figment {
    match path.extension() {
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path.as_str())),
        Some("json") => figment.merge(Json::file_exact(path.as_str())),
        _ => figment.merge(Toml::file_exact(path.as_str())),
    }
}

/// Rewrite `current_version` in the configuration file.
///
/// No-op when `config_file` is `None`. The value is replaced in place with
/// a targeted pattern (key, `=` or `:` separator, optional quoting) so the
/// rest of the file keeps its formatting and comments. When the key or the
/// expected value is absent the file is left alone with a warning; the
/// original tool tolerated configs whose version lives elsewhere.
#[instrument(skip_all, fields(config_file = ?config_file, dry_run))]
pub fn update_config_file(
    config_file: Option<&Utf8Path>,
    current_version: &str,
    new_version: &str,
    dry_run: bool,
) -> ConfigResult<()> {
    let Some(path) = config_file else {
        debug!("no configuration file to update");
        return Ok(());
    };

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let pattern = format!(
        r#"(current_version\s*[:=]\s*["']?){}(["']?)"#,
        regex::escape(current_version)
    );
    let re = Regex::new(&pattern).map_err(Box::new)?;

    if !re.is_match(&contents) {
        warn!(%path, "current_version not found in config file, nothing to update");
        return Ok(());
    }

    if dry_run {
        info!(%path, "dry run: config file left untouched");
        return Ok(());
    }

    let updated = re.replace_all(&contents, |caps: &regex::Captures<'_>| {
        format!("{}{}{}", &caps[1], new_version, &caps[2])
    });
    fs::write(path, updated.as_bytes()).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(%path, %new_version, "configuration file updated");
    Ok(())
}

//! Launcher configuration: built-in defaults, environment fallbacks and the
//! optional `play.json` file.

use crate::flags::{FlagKind, FlagRegistry, FlagSchema, FlagValue};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the optional configuration file.
pub const CONFIG_FILE_NAME: &str = "play.json";

pub const ROOT_DIR_ENV: &str = "PLAY_ROOT_DIR";
pub const TSCONFIG_ENV: &str = "PLAY_TSCONFIG";
pub const AUTO_INSTALL_ENV: &str = "PLAY_AUTO_INSTALL";
pub const RUNNER_ENV: &str = "PLAY_RUNNER";

/// Runner executable used when `PLAY_RUNNER` is not set.
pub const DEFAULT_RUNNER: &str = "tsx";

/// Everything the launcher needs to know before looking at the arguments.
#[derive(Debug, Clone)]
pub struct PlayConfig {
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    /// Builtin flags merged with caller flags.
    pub flags: FlagRegistry,
    pub root_dir: Option<PathBuf>,
    pub tsconfig: Option<PathBuf>,
    pub auto_install: bool,
    pub runner: String,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            name: "play".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: Some("Run TypeScript playground files with tsx".to_string()),
            flags: FlagRegistry::builtin(),
            root_dir: None,
            tsconfig: None,
            auto_install: false,
            runner: DEFAULT_RUNNER.to_string(),
        }
    }
}

impl PlayConfig {
    /// Defaults overlaid with the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup` (an environment accessor).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let defaults = Self::default();
        Self {
            root_dir: non_empty(ROOT_DIR_ENV).map(PathBuf::from),
            tsconfig: non_empty(TSCONFIG_ENV).map(PathBuf::from),
            auto_install: lookup(AUTO_INSTALL_ENV).is_some_and(|v| v == "true"),
            runner: non_empty(RUNNER_ENV).unwrap_or(defaults.runner.clone()),
            ..defaults
        }
    }

    /// Merge caller flags over the current registry.
    #[must_use]
    pub fn with_flags(mut self, flags: &FlagRegistry) -> Self {
        self.flags = self.flags.merged_with(flags);
        self
    }

    /// Apply a parsed `play.json`. Relative paths resolve against `base_dir`.
    #[must_use]
    pub fn with_file(mut self, file: ConfigFile, base_dir: &Path) -> Self {
        if let Some(name) = file.name {
            self.name = name;
        }
        if let Some(version) = file.version {
            self.version = version;
        }
        if file.description.is_some() {
            self.description = file.description;
        }
        if let Some(root_dir) = file.root_dir {
            self.root_dir = Some(base_dir.join(root_dir));
        }
        if let Some(tsconfig) = file.tsconfig {
            self.tsconfig = Some(base_dir.join(tsconfig));
        }
        if let Some(auto_install) = file.auto_install {
            self.auto_install = auto_install;
        }

        let mut registry = FlagRegistry::new();
        for (name, flag) in file.flags {
            registry.insert(name, flag.into_schema());
        }
        self.with_flags(&registry)
    }

    /// Warn about configured paths that do not exist. Never fatal.
    pub fn validate(&self) {
        if let Some(root_dir) = &self.root_dir
            && !root_dir.exists()
        {
            tracing::warn!("Root directory not found: {}", root_dir.display());
        }
        if let Some(tsconfig) = &self.tsconfig
            && !tsconfig.exists()
        {
            tracing::warn!("Tsconfig not found: {}", tsconfig.display());
        }
    }
}

/// Shape of `play.json`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigFile {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub root_dir: Option<PathBuf>,
    pub tsconfig: Option<PathBuf>,
    pub auto_install: Option<bool>,
    #[serde(default)]
    pub flags: BTreeMap<String, FileFlag>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFlagType {
    String,
    Number,
    Boolean,
}

/// A flag declared in `play.json`.
#[derive(Debug, Deserialize)]
pub struct FileFlag {
    #[serde(rename = "type")]
    pub kind: FileFlagType,
    pub alias: Option<char>,
    pub default: Option<serde_json::Value>,
    pub description: Option<String>,
    pub parameter: Option<String>,
}

impl FileFlag {
    fn into_schema(self) -> FlagSchema {
        let kind = match self.kind {
            FileFlagType::String => FlagKind::String,
            FileFlagType::Number => FlagKind::Number,
            FileFlagType::Boolean => FlagKind::Boolean,
        };
        FlagSchema {
            kind,
            alias: self.alias,
            default: self.default.map(json_to_flag_value),
            description: self.description,
            parameter: self.parameter,
        }
    }
}

fn json_to_flag_value(value: serde_json::Value) -> FlagValue {
    match value {
        serde_json::Value::Bool(b) => FlagValue::Bool(b),
        serde_json::Value::String(s) => FlagValue::Str(s),
        serde_json::Value::Number(n) => match n.as_f64() {
            Some(n) => FlagValue::Number(n),
            None => FlagValue::Json(serde_json::Value::Number(n)),
        },
        other => FlagValue::Json(other),
    }
}

/// Parse `play.json` contents.
///
/// # Errors
///
/// Returns `Err` if the contents are not valid JSON or contain unknown keys.
pub fn parse_config_file(content: &str) -> Result<ConfigFile, serde_json::Error> {
    serde_json::from_str(content)
}

/// Get the user's home directory in a cross-platform way.
pub fn get_home_dir() -> Option<PathBuf> {
    if let Some(home) = std::env::var_os("HOME") {
        return Some(PathBuf::from(home));
    }

    if let Some(userprofile) = std::env::var_os("USERPROFILE") {
        return Some(PathBuf::from(userprofile));
    }

    None
}

/// Search for `play.json` in `start` or upwards, stopping at the home directory or root.
pub fn find_config_path(start: &Path, home_dir: Option<&Path>) -> Option<PathBuf> {
    let mut current_dir = start.to_path_buf();

    loop {
        let candidate = current_dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }

        if home_dir.is_some_and(|home| current_dir == home) {
            return None;
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => return None,
        }
    }
}

/// Build the configuration for the current process: defaults, then the
/// environment, then `play.json` if one is found.
#[must_use]
pub fn load_config() -> PlayConfig {
    let config = PlayConfig::from_env();

    let Ok(cwd) = std::env::current_dir() else {
        return config;
    };
    let Some(path) = find_config_path(&cwd, get_home_dir().as_deref()) else {
        return config;
    };

    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!("Cannot read {}: {e}", path.display());
            return config;
        }
    };

    match parse_config_file(&content) {
        Ok(file) => {
            tracing::debug!("loaded configuration from {}", path.display());
            let base_dir = path.parent().unwrap_or(&cwd).to_path_buf();
            config.with_file(file, &base_dir)
        }
        Err(e) => {
            tracing::warn!("Ignoring invalid {}: {e}", path.display());
            config
        }
    }
}

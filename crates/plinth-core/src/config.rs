use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use plinth_util::errors::PlinthError;

/// Global user configuration loaded from `~/.plinth/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub resolve: ResolveConfig,

    /// Directory that embedded jars are unpacked into.
    #[serde(default, rename = "unpack-dir")]
    pub unpack_dir: Option<String>,
}

/// What to do with requirements marked optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionalDependencies {
    /// Resolve them like required ones; an unresolvable one fails resolution.
    #[default]
    Strict,
    /// Resolve them when possible and drop them silently otherwise.
    Lenient,
    /// Skip them without querying the registry.
    Exclude,
}

impl OptionalDependencies {
    /// Map the boolean "include optional dependencies" switch onto a policy.
    pub fn from_include(include: bool) -> Self {
        if include {
            Self::Strict
        } else {
            Self::Exclude
        }
    }
}

/// Resolution settings from `[resolve]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveConfig {
    #[serde(default)]
    pub optional: OptionalDependencies,

    #[serde(
        default = "default_true",
        rename = "include-workspace-bundles"
    )]
    pub include_workspace_bundles: bool,

    #[serde(
        default = "default_true",
        rename = "include-specified-bundles"
    )]
    pub include_specified_bundles: bool,

    #[serde(default = "default_true", rename = "resolve-bundle-classpath")]
    pub resolve_bundle_classpath: bool,

    #[serde(default)]
    pub deduplicate: bool,

    /// Symbolic-name glob patterns barred from the closure.
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            optional: OptionalDependencies::default(),
            include_workspace_bundles: true,
            include_specified_bundles: true,
            resolve_bundle_classpath: true,
            deduplicate: false,
            exclude: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

impl GlobalConfig {
    /// Load the global configuration, or return defaults if the file doesn't exist.
    pub fn load() -> miette::Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load the configuration from an explicit path, or return defaults if it doesn't exist.
    pub fn load_from(path: &Path) -> miette::Result<Self> {
        if !path.is_file() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| PlinthError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        toml::from_str(&content).map_err(|e| {
            PlinthError::Config {
                message: format!("Failed to parse {}: {e}", path.display()),
            }
            .into()
        })
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }
}

/// Returns the path to the plinth data directory (`~/.plinth/`).
pub fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".plinth")
}

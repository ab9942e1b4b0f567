//! The `Plinth.toml` platform description.
//!
//! Lists the modules available for resolution and, optionally, a `[resolve]`
//! table that overrides the global resolution settings:
//!
//! ```toml
//! [platform]
//! prefer-workspace = true
//!
//! [[module]]
//! name = "org.example.app"
//! version = "1.0.0"
//! origin = "workspace"
//! location = "projects/app"
//! classpath = ["bin"]
//!
//! [[module.requires]]
//! name = "org.example.util"
//! version = "[1.0,2.0)"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use plinth_util::errors::PlinthError;

use crate::config::ResolveConfig;
use crate::module::{ModuleOrigin, ModuleRequirement, ResolvedModule};
use crate::version::BundleVersion;

/// Default file name of a platform description.
pub const PLATFORM_FILE: &str = "Plinth.toml";

/// The parsed representation of a `Plinth.toml` file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformFile {
    #[serde(default)]
    pub platform: PlatformSection,

    #[serde(default, rename = "module")]
    pub modules: Vec<ModuleEntry>,

    #[serde(default)]
    pub resolve: Option<ResolveConfig>,
}

/// Settings from `[platform]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformSection {
    /// Prefer workspace modules over external ones with the same name.
    #[serde(default = "default_prefer_workspace", rename = "prefer-workspace")]
    pub prefer_workspace: bool,

    /// Directory that embedded jars are unpacked into, relative to the file.
    #[serde(default, rename = "unpack-dir")]
    pub unpack_dir: Option<String>,
}

impl Default for PlatformSection {
    fn default() -> Self {
        Self {
            prefer_workspace: default_prefer_workspace(),
            unpack_dir: None,
        }
    }
}

fn default_prefer_workspace() -> bool {
    true
}

/// One `[[module]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleEntry {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub origin: ModuleOrigin,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub classpath: Vec<String>,
    #[serde(default)]
    pub host: Option<RequirementEntry>,
    #[serde(default)]
    pub requires: Vec<RequirementEntry>,
}

/// A requirement as written in the platform file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementEntry {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub optional: bool,
}

impl RequirementEntry {
    fn to_requirement(&self) -> ModuleRequirement {
        if self.optional {
            ModuleRequirement::optional(&self.name, self.version.as_deref())
        } else {
            ModuleRequirement::required(&self.name, self.version.as_deref())
        }
    }
}

impl PlatformFile {
    /// Load and parse a platform description from the given path.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PlinthError::Platform {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::parse_toml(&content)
    }

    /// Parse a platform description from a string.
    pub fn parse_toml(content: &str) -> miette::Result<Self> {
        toml::from_str(content).map_err(|e| {
            PlinthError::Platform {
                message: format!("Failed to parse {PLATFORM_FILE}: {e}"),
            }
            .into()
        })
    }

    /// Convert the entries into module descriptions.
    ///
    /// Relative locations are resolved against `base_dir`. Module versions
    /// must parse; requirement constraints are kept raw until resolution.
    pub fn modules(&self, base_dir: &Path) -> miette::Result<Vec<ResolvedModule>> {
        self.modules
            .iter()
            .map(|entry| {
                let version = BundleVersion::parse(&entry.version)?;
                let mut module = ResolvedModule::new(&entry.name, version)
                    .with_origin(entry.origin)
                    .with_classpath(entry.classpath.iter().cloned());
                if let Some(ref location) = entry.location {
                    module = module.at(base_dir.join(location));
                }
                if let Some(ref host) = entry.host {
                    module = module.fragment_of(host.to_requirement());
                }
                for req in &entry.requires {
                    module = module.requiring(req.to_requirement());
                }
                Ok(module)
            })
            .collect()
    }
}

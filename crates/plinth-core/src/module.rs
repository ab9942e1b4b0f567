//! Module requirements and resolved module descriptions.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::version::{BareVersion, BundleVersion, VersionConstraint};

/// Identity of a resolved module: symbolic name plus concrete version.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleId {
    pub name: String,
    pub version: BundleVersion,
}

impl ModuleId {
    pub fn new(name: &str, version: BundleVersion) -> Self {
        Self {
            name: name.to_string(),
            version,
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.name, self.version)
    }
}

/// Where a module comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleOrigin {
    /// A project in the local workspace.
    Workspace,
    /// A bundle from an installation or repository outside the workspace.
    #[default]
    External,
}

/// A requirement on another module: symbolic name, version constraint, optionality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRequirement {
    pub name: String,
    /// Unparsed constraint. Parsed lazily so a malformed string surfaces as
    /// an error from the operation that needs it.
    pub version: Option<String>,
    pub optional: bool,
    pub bare: BareVersion,
}

impl ModuleRequirement {
    /// A mandatory requirement as declared by a module (bare versions are minimums).
    pub fn required(name: &str, version: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            version: version.map(str::to_string),
            optional: false,
            bare: BareVersion::Minimum,
        }
    }

    /// An optional requirement as declared by a module.
    pub fn optional(name: &str, version: Option<&str>) -> Self {
        Self {
            optional: true,
            ..Self::required(name, version)
        }
    }

    /// A bundle named directly by the caller (bare versions are exact).
    pub fn seed(name: &str, version: Option<&str>) -> Self {
        Self {
            bare: BareVersion::Exact,
            ..Self::required(name, version)
        }
    }

    /// Parse a seed written as `name` or `name@version`.
    pub fn parse_seed(spec: &str) -> Self {
        match spec.split_once('@') {
            Some((name, version)) => Self::seed(name.trim(), Some(version.trim())),
            None => Self::seed(spec.trim(), None),
        }
    }

    pub fn constraint(&self) -> miette::Result<VersionConstraint> {
        VersionConstraint::parse(self.version.as_deref(), self.bare)
    }

    /// Human-readable constraint, falling back to the raw string when it does not parse.
    pub fn constraint_label(&self) -> String {
        match self.constraint() {
            Ok(c) => c.to_string(),
            Err(_) => self.version.clone().unwrap_or_default(),
        }
    }
}

impl fmt::Display for ModuleRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(ref v) = self.version {
            write!(f, " {v}")?;
        }
        if self.optional {
            f.write_str(" (optional)")?;
        }
        Ok(())
    }
}

/// A concrete module description returned by a registry.
///
/// Equality and hashing use [`ModuleId`] only.
#[derive(Debug, Clone)]
pub struct ResolvedModule {
    pub id: ModuleId,
    pub origin: ModuleOrigin,
    /// Outgoing requirements in declaration order.
    pub requires: Vec<ModuleRequirement>,
    /// Set when this module is a fragment attached to a host.
    pub host: Option<ModuleRequirement>,
    /// Backing artifact: a jar file or a directory.
    pub location: Option<PathBuf>,
    /// Declared bundle classpath entries; empty means `.` (the module root).
    pub classpath: Vec<String>,
}

impl ResolvedModule {
    pub fn new(name: &str, version: BundleVersion) -> Self {
        Self {
            id: ModuleId::new(name, version),
            origin: ModuleOrigin::External,
            requires: Vec::new(),
            host: None,
            location: None,
            classpath: Vec::new(),
        }
    }

    pub fn with_origin(mut self, origin: ModuleOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn requiring(mut self, requirement: ModuleRequirement) -> Self {
        self.requires.push(requirement);
        self
    }

    pub fn fragment_of(mut self, host: ModuleRequirement) -> Self {
        self.host = Some(host);
        self
    }

    pub fn at(mut self, location: impl AsRef<Path>) -> Self {
        self.location = Some(location.as_ref().to_path_buf());
        self
    }

    pub fn with_classpath<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classpath = entries.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.id.name
    }

    pub fn version(&self) -> &BundleVersion {
        &self.id.version
    }

    pub fn is_workspace(&self) -> bool {
        self.origin == ModuleOrigin::Workspace
    }
}

impl PartialEq for ResolvedModule {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ResolvedModule {}

impl Hash for ResolvedModule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for ResolvedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

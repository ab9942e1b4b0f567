//! Modules barred from a closure.

use std::collections::HashSet;

use globset::{Glob, GlobSet, GlobSetBuilder};

use plinth_core::module::{ModuleId, ResolvedModule};
use plinth_util::errors::PlinthError;

/// Modules that must never enter a closure.
///
/// A module is excluded when its identity was added explicitly, its symbolic
/// name matches one of the glob patterns, or it comes from the workspace and
/// workspace modules are excluded.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    modules: HashSet<ModuleId>,
    patterns: Vec<String>,
    matcher: Option<GlobSet>,
    workspace: bool,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclude one module by identity.
    pub fn with_module(mut self, id: ModuleId) -> Self {
        self.modules.insert(id);
        self
    }

    /// Exclude every module whose symbolic name matches one of `patterns`.
    pub fn with_patterns<S: AsRef<str>>(mut self, patterns: &[S]) -> miette::Result<Self> {
        if patterns.is_empty() {
            return Ok(self);
        }
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = Glob::new(pattern).map_err(|e| PlinthError::Config {
                message: format!("Invalid exclude pattern '{pattern}': {e}"),
            })?;
            builder.add(glob);
            self.patterns.push(pattern.to_string());
        }
        let matcher = builder.build().map_err(|e| PlinthError::Config {
            message: format!("Failed to build exclude patterns: {e}"),
        })?;
        self.matcher = Some(matcher);
        Ok(self)
    }

    /// Exclude (or stop excluding) modules that originate from the workspace.
    pub fn exclude_workspace(mut self, exclude: bool) -> Self {
        self.workspace = exclude;
        self
    }

    pub fn contains(&self, module: &ResolvedModule) -> bool {
        if self.modules.contains(&module.id) {
            return true;
        }
        if self.workspace && module.is_workspace() {
            return true;
        }
        self.matches_name(module.name())
    }

    /// Whether `name` matches one of the exclude patterns.
    ///
    /// Holds for every version, so a requirement can be dropped before the
    /// registry is asked for it.
    pub fn matches_name(&self, name: &str) -> bool {
        self.matcher.as_ref().is_some_and(|m| m.is_match(name))
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty() && self.matcher.is_none() && !self.workspace
    }
}

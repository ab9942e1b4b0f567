//! Module registry: maps a symbolic name and version constraint to a module.

use std::collections::BTreeMap;

use plinth_core::module::ResolvedModule;
use plinth_core::version::VersionConstraint;
use plinth_util::errors::PlinthError;

/// Source of module descriptions consulted during closure resolution.
///
/// Implementations may perform I/O. `Ok(None)` means "no such module"; an
/// `Err` is a failure of the registry itself and aborts resolution.
pub trait ModuleRegistry {
    fn resolve(
        &self,
        name: &str,
        constraint: &VersionConstraint,
    ) -> miette::Result<Option<ResolvedModule>>;
}

/// A registry holding a fixed set of modules in memory.
///
/// Among the modules matching a constraint the highest version wins. With
/// `prefer_workspace` set, any matching workspace module wins over every
/// external one.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    /// Modules per symbolic name, sorted by ascending version.
    modules: BTreeMap<String, Vec<ResolvedModule>>,
    prefer_workspace: bool,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefer_workspace(mut self, prefer: bool) -> Self {
        self.prefer_workspace = prefer;
        self
    }

    /// Build a registry from a list of modules, rejecting duplicates.
    pub fn from_modules<I>(modules: I) -> miette::Result<Self>
    where
        I: IntoIterator<Item = ResolvedModule>,
    {
        let mut registry = Self::new();
        for module in modules {
            registry.register(module)?;
        }
        Ok(registry)
    }

    /// Add a module. Two modules with the same name and version are an error.
    pub fn register(&mut self, module: ResolvedModule) -> miette::Result<()> {
        let versions = self.modules.entry(module.name().to_string()).or_default();
        match versions.binary_search_by(|m| m.version().cmp(module.version())) {
            Ok(_) => Err(PlinthError::Platform {
                message: format!("Module {} is registered twice", module.id),
            }
            .into()),
            Err(pos) => {
                versions.insert(pos, module);
                Ok(())
            }
        }
    }

    /// All registered modules, by name then ascending version.
    pub fn modules(&self) -> impl Iterator<Item = &ResolvedModule> {
        self.modules.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.modules.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl ModuleRegistry for InMemoryRegistry {
    fn resolve(
        &self,
        name: &str,
        constraint: &VersionConstraint,
    ) -> miette::Result<Option<ResolvedModule>> {
        let Some(versions) = self.modules.get(name) else {
            return Ok(None);
        };
        let mut matching = versions.iter().filter(|m| constraint.matches(m.version()));

        let chosen = if self.prefer_workspace {
            let candidates: Vec<&ResolvedModule> = matching.collect();
            candidates
                .iter()
                .rev()
                .find(|m| m.is_workspace())
                .or_else(|| candidates.last())
                .copied()
        } else {
            matching.next_back()
        };

        if let Some(module) = chosen {
            tracing::trace!("{name} ({constraint}) -> {}", module.id);
        }
        Ok(chosen.cloned())
    }
}

//! Transitive closure of module requirements.
//!
//! Starting from a set of seed requirements, every reachable module is
//! resolved through a [`ModuleRegistry`] and collected into a [`ClosureSet`].
//! Modules may require each other in cycles; each module is expanded at most
//! once, so the walk always terminates. Ordering is a separate concern: see
//! [`ClosureSet::build_order`].

use std::collections::HashMap;

use plinth_core::config::OptionalDependencies;
use plinth_core::module::{ModuleId, ModuleRequirement, ResolvedModule};
use plinth_util::errors::PlinthError;

use crate::exclusion::ExclusionSet;
use crate::graph::{DependencyGraph, Edge};
use crate::registry::ModuleRegistry;

/// The modules required to satisfy a set of seed requirements.
///
/// Modules are kept in the order the resolver first reached them.
#[derive(Debug, Clone, Default)]
pub struct ClosureSet {
    modules: Vec<ResolvedModule>,
    index: HashMap<ModuleId, usize>,
    seeds: Vec<ModuleId>,
    /// Every `(dependent, dependency)` pair the resolver wired up.
    wiring: Vec<Edge<ModuleId>>,
}

impl ClosureSet {
    fn insert(&mut self, module: ResolvedModule) -> bool {
        if self.index.contains_key(&module.id) {
            return false;
        }
        self.index.insert(module.id.clone(), self.modules.len());
        self.modules.push(module);
        true
    }

    pub fn contains(&self, id: &ModuleId) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &ModuleId) -> Option<&ResolvedModule> {
        self.index.get(id).map(|&i| &self.modules[i])
    }

    /// Modules in the order they were first reached.
    pub fn iter(&self) -> std::slice::Iter<'_, ResolvedModule> {
        self.modules.iter()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Modules the seed requirements resolved to, in seed order.
    pub fn seeds(&self) -> &[ModuleId] {
        &self.seeds
    }

    pub fn is_seed(&self, id: &ModuleId) -> bool {
        self.seeds.contains(id)
    }

    /// Requirement edges between members of the closure, in discovery order.
    pub fn wiring(&self) -> &[Edge<ModuleId>] {
        &self.wiring
    }

    /// A fresh dependency graph over the closure's modules.
    ///
    /// Fragments depend on their hosts; requirement edges point from the
    /// requiring module to the required one.
    pub fn dependency_graph(&self) -> miette::Result<DependencyGraph<ModuleId>> {
        let mut graph = DependencyGraph::new();
        for module in &self.modules {
            graph.add_vertex(module.id.clone());
        }
        for edge in &self.wiring {
            graph.add_edge(&edge.dependent, &edge.dependency)?;
        }
        Ok(graph)
    }

    /// The closure's modules ordered dependencies first.
    ///
    /// Fails with a cyclic dependency error if modules require each other.
    pub fn build_order(&self) -> miette::Result<Vec<&ResolvedModule>> {
        let order = self.dependency_graph()?.calculate_order()?;
        Ok(order.iter().filter_map(|id| self.get(id)).collect())
    }
}

impl<'a> IntoIterator for &'a ClosureSet {
    type Item = &'a ResolvedModule;
    type IntoIter = std::slice::Iter<'a, ResolvedModule>;

    fn into_iter(self) -> Self::IntoIter {
        self.modules.iter()
    }
}

/// Computes closures against a registry.
pub struct ClosureResolver<'r, R: ?Sized> {
    registry: &'r R,
    optional: OptionalDependencies,
    exclusions: ExclusionSet,
}

impl<'r, R> ClosureResolver<'r, R>
where
    R: ModuleRegistry + ?Sized,
{
    pub fn new(registry: &'r R) -> Self {
        Self {
            registry,
            optional: OptionalDependencies::default(),
            exclusions: ExclusionSet::default(),
        }
    }

    pub fn optional_dependencies(mut self, policy: OptionalDependencies) -> Self {
        self.optional = policy;
        self
    }

    pub fn exclusions(mut self, exclusions: ExclusionSet) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Resolve every seed and everything reachable from it.
    ///
    /// Seeds must resolve. Excluded modules are neither added nor expanded.
    pub fn resolve(&self, seeds: &[ModuleRequirement]) -> miette::Result<ClosureSet> {
        if seeds.is_empty() {
            return Err(PlinthError::Precondition {
                message: "at least one module must be requested".to_string(),
            }
            .into());
        }

        let mut closure = ClosureSet::default();
        let mut roots = Vec::with_capacity(seeds.len());
        for seed in seeds {
            let module = self.lookup(seed)?.ok_or_else(|| not_found(seed))?;
            if !closure.seeds.contains(&module.id) {
                closure.seeds.push(module.id.clone());
            }
            roots.push(module);
        }

        // Work stack of (module, module that required it).
        let mut stack: Vec<(ResolvedModule, Option<ModuleId>)> =
            roots.into_iter().rev().map(|m| (m, None)).collect();

        while let Some((module, required_by)) = stack.pop() {
            if self.exclusions.contains(&module) {
                tracing::debug!("Skipping excluded module {}", module.id);
                continue;
            }
            if let Some(dependent) = required_by {
                closure.wiring.push(Edge {
                    dependent,
                    dependency: module.id.clone(),
                });
            }
            if closure.contains(&module.id) {
                continue;
            }

            tracing::debug!("Expanding {}", module.id);
            let dependencies = self.dependencies_of(&module)?;
            let id = module.id.clone();
            closure.insert(module);
            stack.extend(
                dependencies
                    .into_iter()
                    .rev()
                    .map(|dep| (dep, Some(id.clone()))),
            );
        }

        tracing::info!(
            "Resolved {} module(s) from {} seed(s)",
            closure.len(),
            seeds.len()
        );
        Ok(closure)
    }

    /// Resolve the host (for fragments) and the requirements of `module`.
    fn dependencies_of(&self, module: &ResolvedModule) -> miette::Result<Vec<ResolvedModule>> {
        let mut out = Vec::with_capacity(module.requires.len() + 1);
        for requirement in module.host.iter().chain(module.requires.iter()) {
            if requirement.optional && self.optional == OptionalDependencies::Exclude {
                tracing::trace!("{}: not following optional {requirement}", module.id);
                continue;
            }
            if self.exclusions.matches_name(&requirement.name) {
                tracing::debug!("{}: {requirement} is excluded", module.id);
                continue;
            }
            match self.lookup(requirement)? {
                Some(dep) => out.push(dep),
                None if requirement.optional && self.optional == OptionalDependencies::Lenient => {
                    tracing::warn!(
                        "Optional requirement {requirement} of {} cannot be resolved, skipping",
                        module.id
                    );
                }
                None => return Err(not_found(requirement).into()),
            }
        }
        Ok(out)
    }

    /// Parse the constraint, then ask the registry.
    fn lookup(&self, requirement: &ModuleRequirement) -> miette::Result<Option<ResolvedModule>> {
        let constraint = requirement.constraint()?;
        self.registry.resolve(&requirement.name, &constraint)
    }
}

fn not_found(requirement: &ModuleRequirement) -> PlinthError {
    PlinthError::ModuleNotFound {
        name: requirement.name.clone(),
        constraint: requirement.constraint_label(),
    }
}

/// Resolve the closure of `seeds`, skipping `exclusions`.
///
/// `include_optional = true` treats optional requirements like required ones;
/// `false` ignores them.
pub fn resolve_closure<R>(
    registry: &R,
    seeds: &[ModuleRequirement],
    exclusions: &ExclusionSet,
    include_optional: bool,
) -> miette::Result<ClosureSet>
where
    R: ModuleRegistry + ?Sized,
{
    ClosureResolver::new(registry)
        .optional_dependencies(OptionalDependencies::from_include(include_optional))
        .exclusions(exclusions.clone())
        .resolve(seeds)
}

//! Operation: order bundles so that every bundle follows its dependencies.

use plinth_core::config::ResolveConfig;
use plinth_core::module::{ModuleRequirement, ResolvedModule};
use plinth_resolver::{ClosureResolver, ClosureSet, InMemoryRegistry};
use plinth_util::errors::PlinthResult;

use crate::exclusions_for;

/// Resolve `seeds` (or every registered module when `seeds` is empty).
fn order_closure(
    registry: &InMemoryRegistry,
    seeds: &[ModuleRequirement],
    config: &ResolveConfig,
) -> PlinthResult<ClosureSet> {
    if seeds.is_empty() && registry.is_empty() {
        return Ok(ClosureSet::default());
    }
    let seeds: Vec<ModuleRequirement> = if seeds.is_empty() {
        registry
            .modules()
            .map(|m| ModuleRequirement::seed(m.name(), Some(&m.version().to_string())))
            .collect()
    } else {
        seeds.to_vec()
    };

    ClosureResolver::new(registry)
        .optional_dependencies(config.optional)
        .exclusions(exclusions_for(config)?)
        .resolve(&seeds)
}

/// Bundles in build order: dependencies first.
pub fn build_order(
    registry: &InMemoryRegistry,
    seeds: &[ModuleRequirement],
    config: &ResolveConfig,
) -> PlinthResult<Vec<ResolvedModule>> {
    let closure = order_closure(registry, seeds, config)?;
    let order = closure.build_order()?;
    Ok(order.into_iter().cloned().collect())
}

/// Bundles grouped into levels; every bundle in a level depends only on
/// bundles in earlier levels.
pub fn build_levels(
    registry: &InMemoryRegistry,
    seeds: &[ModuleRequirement],
    config: &ResolveConfig,
) -> PlinthResult<Vec<Vec<ResolvedModule>>> {
    let closure = order_closure(registry, seeds, config)?;
    let levels = closure.dependency_graph()?.calculate_levels()?;
    Ok(levels
        .iter()
        .map(|level| {
            level
                .iter()
                .filter_map(|id| closure.get(id).cloned())
                .collect()
        })
        .collect())
}

pub mod ops_classpath;
pub mod ops_order;
pub mod ops_platform;

use plinth_core::config::ResolveConfig;
use plinth_resolver::ExclusionSet;
use plinth_util::errors::PlinthResult;

/// The exclusions implied by a resolution config.
pub fn exclusions_for(config: &ResolveConfig) -> PlinthResult<ExclusionSet> {
    Ok(ExclusionSet::new()
        .with_patterns(&config.exclude)?
        .exclude_workspace(!config.include_workspace_bundles))
}

//! Operation: compute the classpath required by a set of bundles.

use std::path::PathBuf;

use serde::Serialize;

use plinth_classpath::{
    materialize, relativize_all, LayoutResolver, MaterializeMode, MaterializeOptions,
};
use plinth_core::config::ResolveConfig;
use plinth_core::module::ModuleRequirement;
use plinth_resolver::{ClosureResolver, ModuleRegistry};
use plinth_util::errors::{PlinthError, PlinthResult};

use crate::exclusions_for;

/// A bundle named by the caller, optionally pinned to a version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleSpec {
    pub name: String,
    pub version: Option<String>,
}

impl BundleSpec {
    pub fn new(name: &str, version: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            version: version.map(str::to_string),
        }
    }

    /// Parse `name` or `name@version`.
    pub fn parse(spec: &str) -> Self {
        let req = ModuleRequirement::parse_seed(spec);
        Self {
            name: req.name,
            version: req.version,
        }
    }

    fn to_seed(&self) -> ModuleRequirement {
        ModuleRequirement::seed(&self.name, self.version.as_deref())
    }
}

/// Options for `plinth classpath`.
///
/// Bundles are named either through `symbolic_name` (plus an optional
/// `version`) or through `bundles`, never both.
#[derive(Debug, Clone, Default)]
pub struct RequiredBundlesRequest {
    pub symbolic_name: Option<String>,
    pub version: Option<String>,
    pub bundles: Vec<BundleSpec>,
    pub config: ResolveConfig,
    /// Render classpath entries relative to this directory.
    pub relative_to: Option<PathBuf>,
}

impl RequiredBundlesRequest {
    /// Check the request and turn it into seed requirements.
    pub fn validate(&self) -> PlinthResult<Vec<ModuleRequirement>> {
        let precondition = |message: &str| -> miette::Report {
            PlinthError::Precondition {
                message: message.to_string(),
            }
            .into()
        };

        if self.symbolic_name.is_some() && !self.bundles.is_empty() {
            return Err(precondition(
                "a symbolic name and bundle elements cannot be combined",
            ));
        }
        if self.version.is_some() && self.symbolic_name.is_none() {
            return Err(precondition("a version requires a symbolic name"));
        }

        let specs = match &self.symbolic_name {
            Some(name) => vec![BundleSpec::new(name, self.version.as_deref())],
            None => self.bundles.clone(),
        };
        if specs.is_empty() {
            return Err(precondition("at least one bundle must be named"));
        }

        let mut seeds = Vec::with_capacity(specs.len());
        for spec in &specs {
            if spec.name.trim().is_empty() {
                return Err(precondition("bundle names cannot be empty"));
            }
            let seed = spec.to_seed();
            seed.constraint()?;
            seeds.push(seed);
        }
        Ok(seeds)
    }
}

/// Result of `plinth classpath`.
#[derive(Debug, Clone, Serialize)]
pub struct RequiredBundles {
    /// Bundle identities (`name_version`) in closure order.
    pub bundles: Vec<String>,
    pub classpath: Vec<PathBuf>,
}

/// Resolve the bundles named by `request` and everything they need, then
/// materialize their classpath.
pub fn get_required_bundles<R, L>(
    request: &RequiredBundlesRequest,
    registry: &R,
    layout: &L,
) -> PlinthResult<RequiredBundles>
where
    R: ModuleRegistry + ?Sized,
    L: LayoutResolver + ?Sized,
{
    let seeds = request.validate()?;
    let config = &request.config;

    let closure = ClosureResolver::new(registry)
        .optional_dependencies(config.optional)
        .exclusions(exclusions_for(config)?)
        .resolve(&seeds)?;

    let modules: Vec<_> = closure
        .iter()
        .filter(|m| config.include_specified_bundles || !closure.is_seed(&m.id))
        .collect();
    tracing::info!("{} bundle(s) required", modules.len());

    let options = MaterializeOptions {
        mode: MaterializeMode::from_resolve_classpath(config.resolve_bundle_classpath),
        deduplicate: config.deduplicate,
    };
    let mut classpath = materialize(modules.iter().copied(), layout, options)?;
    if let Some(base) = &request.relative_to {
        classpath = relativize_all(&classpath, base);
    }

    Ok(RequiredBundles {
        bundles: modules.iter().map(|m| m.id.to_string()).collect(),
        classpath,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RequiredBundlesRequest {
        RequiredBundlesRequest::default()
    }

    #[test]
    fn parses_bundle_specs() {
        assert_eq!(BundleSpec::parse("a@1.0"), BundleSpec::new("a", Some("1.0")));
        assert_eq!(BundleSpec::parse("a"), BundleSpec::new("a", None));
    }

    #[test]
    fn rejects_name_combined_with_bundles() {
        let req = RequiredBundlesRequest {
            symbolic_name: Some("a".into()),
            bundles: vec![BundleSpec::new("b", None)],
            ..request()
        };
        let err = req.validate().unwrap_err();
        assert!(err.to_string().contains("cannot be combined"), "got: {err}");
    }

    #[test]
    fn rejects_version_without_name() {
        let req = RequiredBundlesRequest {
            version: Some("1.0".into()),
            bundles: vec![BundleSpec::new("b", None)],
            ..request()
        };
        let err = req.validate().unwrap_err();
        assert!(err.to_string().contains("requires a symbolic name"), "got: {err}");
    }

    #[test]
    fn rejects_empty_request() {
        let err = request().validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid request: at least one bundle must be named"
        );
    }

    #[test]
    fn rejects_malformed_bundle_version() {
        let req = RequiredBundlesRequest {
            bundles: vec![BundleSpec::new("a", Some("one.two"))],
            ..request()
        };
        let err = req.validate().unwrap_err();
        assert!(err.to_string().starts_with("Invalid version 'one.two'"), "got: {err}");
    }

    #[test]
    fn symbolic_name_becomes_exact_seed() {
        let req = RequiredBundlesRequest {
            symbolic_name: Some("a".into()),
            version: Some("1.0".into()),
            ..request()
        };
        let seeds = req.validate().unwrap();
        assert_eq!(seeds, vec![ModuleRequirement::seed("a", Some("1.0"))]);
        assert_eq!(seeds[0].constraint().unwrap().to_string(), "1.0.0");
    }
}

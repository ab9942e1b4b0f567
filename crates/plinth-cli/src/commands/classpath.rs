//! Handler for `plinth classpath`.

use std::path::Path;

use miette::Result;

use plinth_classpath::to_classpath_string;
use plinth_core::config::OptionalDependencies;
use plinth_ops::ops_classpath::{get_required_bundles, BundleSpec, RequiredBundlesRequest};
use plinth_util::errors::PlinthError;
use plinth_util::progress::status;

use crate::cli::{ClasspathArgs, ClasspathFormat};

pub fn exec(args: ClasspathArgs, config: Option<&Path>) -> Result<()> {
    let platform = super::load_platform(args.platform.as_deref(), config)?;

    // Command-line flags take precedence over the effective config.
    let mut resolve = platform.resolve.clone();
    if args.no_optional {
        resolve.optional = OptionalDependencies::Exclude;
    } else if args.lenient_optional {
        resolve.optional = OptionalDependencies::Lenient;
    }
    if args.root_only {
        resolve.resolve_bundle_classpath = false;
    }
    if args.dedup {
        resolve.deduplicate = true;
    }
    if args.exclude_workspace {
        resolve.include_workspace_bundles = false;
    }
    if args.exclude_specified {
        resolve.include_specified_bundles = false;
    }
    resolve.exclude.extend(args.exclude);

    let request = RequiredBundlesRequest {
        symbolic_name: args.name,
        version: args.version,
        bundles: args.bundles.iter().map(|b| BundleSpec::parse(b)).collect(),
        config: resolve,
        relative_to: if args.relative {
            Some(super::current_dir()?)
        } else {
            None
        },
    };

    let result = get_required_bundles(&request, &platform.registry, &platform.layout())?;
    status(
        "Resolved",
        &format!(
            "{} bundle(s), {} classpath entries",
            result.bundles.len(),
            result.classpath.len()
        ),
    );

    match args.format {
        ClasspathFormat::Path => println!("{}", to_classpath_string(&result.classpath)),
        ClasspathFormat::Lines => {
            for entry in &result.classpath {
                println!("{}", entry.display());
            }
        }
        ClasspathFormat::Json => {
            let json = serde_json::to_string_pretty(&result).map_err(|e| PlinthError::Generic {
                message: format!("Failed to serialize result: {e}"),
            })?;
            println!("{json}");
        }
    }
    Ok(())
}

//! Handler for `plinth order`.

use std::path::Path;

use miette::Result;

use plinth_core::module::{ModuleRequirement, ResolvedModule};
use plinth_ops::ops_order;
use plinth_util::errors::PlinthError;

use crate::cli::{OrderArgs, OrderFormat};

pub fn exec(args: OrderArgs, config: Option<&Path>) -> Result<()> {
    let platform = super::load_platform(args.platform.as_deref(), config)?;
    let seeds: Vec<ModuleRequirement> = args
        .bundles
        .iter()
        .map(|b| ModuleRequirement::parse_seed(b))
        .collect();

    let levels: Vec<Vec<ResolvedModule>> = if args.levels {
        ops_order::build_levels(&platform.registry, &seeds, &platform.resolve)?
    } else {
        ops_order::build_order(&platform.registry, &seeds, &platform.resolve)?
            .into_iter()
            .map(|m| vec![m])
            .collect()
    };

    match args.format {
        OrderFormat::Lines => {
            for (i, level) in levels.iter().enumerate() {
                let ids: Vec<String> = level.iter().map(|m| m.id.to_string()).collect();
                if args.levels {
                    println!("{i}: {}", ids.join(" "));
                } else {
                    println!("{}", ids.join(" "));
                }
            }
        }
        OrderFormat::Json => {
            let ids: Vec<Vec<String>> = levels
                .iter()
                .map(|level| level.iter().map(|m| m.id.to_string()).collect())
                .collect();
            let value = if args.levels {
                serde_json::json!({ "levels": ids })
            } else {
                serde_json::json!({ "order": ids.concat() })
            };
            let json = serde_json::to_string_pretty(&value).map_err(|e| PlinthError::Generic {
                message: format!("Failed to serialize result: {e}"),
            })?;
            println!("{json}");
        }
    }
    Ok(())
}

//! Materializing a set of modules into an ordered list of classpath entries.

use std::collections::HashSet;
use std::path::PathBuf;

use plinth_core::module::ResolvedModule;

use crate::layout::LayoutResolver;

/// What each module contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaterializeMode {
    /// The module's own classpath entries (possibly several per module).
    #[default]
    ClasspathEntries,
    /// Exactly one entry per module: its root location.
    RootOnly,
}

impl MaterializeMode {
    /// `true` maps to [`MaterializeMode::ClasspathEntries`].
    pub fn from_resolve_classpath(resolve: bool) -> Self {
        if resolve {
            Self::ClasspathEntries
        } else {
            Self::RootOnly
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MaterializeOptions {
    pub mode: MaterializeMode,
    /// Drop repeated paths, keeping the first occurrence.
    pub deduplicate: bool,
}

/// Ask `layout` for every module's contribution, in iteration order.
///
/// Any layout failure aborts the whole materialization.
pub fn materialize<'a, I, L>(
    modules: I,
    layout: &L,
    options: MaterializeOptions,
) -> miette::Result<Vec<PathBuf>>
where
    I: IntoIterator<Item = &'a ResolvedModule>,
    L: LayoutResolver + ?Sized,
{
    let mut paths = Vec::new();
    let mut seen = HashSet::new();

    for module in modules {
        let contributed = match options.mode {
            MaterializeMode::RootOnly => vec![layout.root_location(module)?],
            MaterializeMode::ClasspathEntries => layout.classpath_entries(module)?,
        };
        tracing::debug!("{} contributes {} entries", module.id, contributed.len());

        for path in contributed {
            if options.deduplicate && !seen.insert(path.clone()) {
                continue;
            }
            paths.push(path);
        }
    }
    Ok(paths)
}

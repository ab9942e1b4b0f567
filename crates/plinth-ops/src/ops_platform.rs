//! Operation: load a platform description into a registry and a layout.

use std::path::{Path, PathBuf};

use plinth_classpath::FileSystemLayout;
use plinth_core::config::{GlobalConfig, ResolveConfig};
use plinth_core::platform::{PlatformFile, PLATFORM_FILE};
use plinth_resolver::InMemoryRegistry;
use plinth_util::errors::{PlinthError, PlinthResult};
use plinth_util::fs::find_ancestor_with;

/// Default unpack directory, relative to the platform root.
const DEFAULT_UNPACK_DIR: &str = ".plinth/unpacked";

/// A loaded platform: the modules on offer and where their files live.
#[derive(Debug, Clone)]
pub struct Platform {
    /// Directory containing the platform file.
    pub root: PathBuf,
    pub registry: InMemoryRegistry,
    pub unpack_dir: PathBuf,
    /// Effective resolution settings (platform `[resolve]` or the global ones).
    pub resolve: ResolveConfig,
}

impl Platform {
    pub fn layout(&self) -> FileSystemLayout {
        FileSystemLayout::new(&self.root, &self.unpack_dir)
    }
}

/// Locate the platform file: `explicit` if given, else the nearest
/// `Plinth.toml` at or above `cwd`.
pub fn find_platform(explicit: Option<&Path>, cwd: &Path) -> PlinthResult<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    find_ancestor_with(cwd, PLATFORM_FILE)
        .map(|dir| dir.join(PLATFORM_FILE))
        .ok_or_else(|| {
            PlinthError::Platform {
                message: format!(
                    "Could not find {PLATFORM_FILE} in {} or any parent directory",
                    cwd.display()
                ),
            }
            .into()
        })
}

/// Read the platform file at `path`.
///
/// A `[resolve]` table in the platform file replaces the global one.
pub fn load_platform(path: &Path, global: &GlobalConfig) -> PlinthResult<Platform> {
    let file = PlatformFile::from_path(path)?;
    let root = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let registry = InMemoryRegistry::from_modules(file.modules(&root)?)?
        .with_prefer_workspace(file.platform.prefer_workspace);
    tracing::debug!("Loaded {} module(s) from {}", registry.len(), path.display());

    let unpack_dir = file
        .platform
        .unpack_dir
        .as_deref()
        .or(global.unpack_dir.as_deref())
        .map(|dir| root.join(dir))
        .unwrap_or_else(|| root.join(DEFAULT_UNPACK_DIR));

    let resolve = file.resolve.unwrap_or_else(|| global.resolve.clone());

    Ok(Platform {
        root,
        registry,
        unpack_dir,
        resolve,
    })
}

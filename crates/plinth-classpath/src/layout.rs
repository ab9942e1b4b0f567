//! Locating a module's backing artifact and its internal classpath.

use std::fs;
use std::path::{Component, Path, PathBuf};

use plinth_core::module::ResolvedModule;
use plinth_util::errors::PlinthError;
use plinth_util::fs::{ensure_dir, is_archive};

/// Maps resolved modules onto the filesystem.
pub trait LayoutResolver {
    /// The module's backing artifact: a jar file or a directory.
    fn root_location(&self, module: &ResolvedModule) -> miette::Result<PathBuf>;

    /// The module's own classpath entries, in declared order.
    fn classpath_entries(&self, module: &ResolvedModule) -> miette::Result<Vec<PathBuf>>;
}

/// Layout of modules whose `location` points at a jar or directory on disk.
///
/// Relative locations are resolved against `base_dir`. Jar entries named on a
/// jar bundle's classpath are unpacked under
/// `<unpack_dir>/<name>_<version>/`, replacing whatever an earlier run left
/// there.
#[derive(Debug, Clone)]
pub struct FileSystemLayout {
    base_dir: PathBuf,
    unpack_dir: PathBuf,
}

impl FileSystemLayout {
    pub fn new(base_dir: impl Into<PathBuf>, unpack_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            unpack_dir: unpack_dir.into(),
        }
    }

    fn layout_error(module: &ResolvedModule, message: String) -> PlinthError {
        PlinthError::LayoutResolution {
            module: module.id.to_string(),
            message,
        }
    }

    /// Extract `entry` (a file or a directory prefix) from `jar`.
    ///
    /// Returns `None` when the jar has no such entry.
    fn unpack(
        &self,
        module: &ResolvedModule,
        jar: &Path,
        entry: &str,
    ) -> miette::Result<Option<PathBuf>> {
        let target_root = self.unpack_dir.join(module.id.to_string());
        let target = target_root.join(entry);
        if target.is_dir() {
            fs::remove_dir_all(&target).map_err(PlinthError::Io)?;
        } else if target.exists() {
            fs::remove_file(&target).map_err(PlinthError::Io)?;
        }

        let file = fs::File::open(jar).map_err(PlinthError::Io)?;
        let mut archive = zip::ZipArchive::new(file).map_err(|e| {
            Self::layout_error(module, format!("Failed to open {}: {e}", jar.display()))
        })?;

        let prefix = format!("{entry}/");
        let mut found = false;
        for i in 0..archive.len() {
            let mut zipped = archive.by_index(i).map_err(|e| {
                Self::layout_error(module, format!("Zip entry error in {}: {e}", jar.display()))
            })?;
            let name = zipped.name().to_string();
            if name != entry && !name.starts_with(&prefix) {
                continue;
            }
            found = true;

            let out_path = target_root.join(zipped.mangled_name());
            if zipped.is_dir() {
                ensure_dir(&out_path).map_err(PlinthError::Io)?;
            } else {
                if let Some(parent) = out_path.parent() {
                    ensure_dir(parent).map_err(PlinthError::Io)?;
                }
                let mut out = fs::File::create(&out_path).map_err(PlinthError::Io)?;
                std::io::copy(&mut zipped, &mut out).map_err(PlinthError::Io)?;
            }
        }

        if found {
            tracing::debug!("Unpacked {entry} from {}", jar.display());
        }
        Ok(found.then_some(target))
    }
}

impl LayoutResolver for FileSystemLayout {
    fn root_location(&self, module: &ResolvedModule) -> miette::Result<PathBuf> {
        let Some(location) = module.location.as_ref() else {
            return Err(Self::layout_error(module, "no location declared".to_string()).into());
        };
        let path = if location.is_absolute() {
            location.clone()
        } else {
            self.base_dir.join(location)
        };
        if !path.exists() {
            return Err(
                Self::layout_error(module, format!("{} does not exist", path.display())).into(),
            );
        }
        Ok(path)
    }

    fn classpath_entries(&self, module: &ResolvedModule) -> miette::Result<Vec<PathBuf>> {
        let root = self.root_location(module)?;
        let declared: Vec<&str> = if module.classpath.is_empty() {
            vec!["."]
        } else {
            module.classpath.iter().map(String::as_str).collect()
        };

        let mut entries = Vec::with_capacity(declared.len());
        for raw in declared {
            let entry = raw.trim().trim_matches('/');
            if entry.is_empty() || entry == "." {
                entries.push(root.clone());
                continue;
            }
            if Path::new(entry)
                .components()
                .any(|c| matches!(c, Component::ParentDir))
            {
                tracing::warn!(
                    "{}: classpath entry '{entry}' leaves the bundle, skipping",
                    module.id
                );
                continue;
            }

            let resolved = if root.is_dir() {
                Some(root.join(entry)).filter(|p| p.exists())
            } else if is_archive(&root) {
                self.unpack(module, &root, entry)?
            } else {
                None
            };

            match resolved {
                Some(path) => entries.push(path),
                None => tracing::warn!("{}: classpath entry '{entry}' not found, skipping", module.id),
            }
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plinth_core::version::BundleVersion;
    use tempfile::TempDir;

    fn module(name: &str) -> ResolvedModule {
        ResolvedModule::new(name, BundleVersion::new(1, 0, 0))
    }

    #[test]
    fn missing_location_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let layout = FileSystemLayout::new(tmp.path(), tmp.path().join("unpacked"));

        let err = layout.root_location(&module("a")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot resolve layout of a_1.0.0: no location declared"
        );

        let err = layout.root_location(&module("a").at("gone.jar")).unwrap_err();
        assert!(err.to_string().contains("does not exist"), "got: {err}");
    }

    #[test]
    fn relative_location_resolves_against_base_dir() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("a")).unwrap();
        let layout = FileSystemLayout::new(tmp.path(), tmp.path().join("unpacked"));
        let root = layout.root_location(&module("a").at("a")).unwrap();
        assert_eq!(root, tmp.path().join("a"));
    }

    #[test]
    fn directory_bundle_resolves_declared_entries_and_skips_missing() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("a");
        fs::create_dir_all(dir.join("bin")).unwrap();
        fs::write(dir.join("lib.jar"), b"").unwrap();

        let layout = FileSystemLayout::new(tmp.path(), tmp.path().join("unpacked"));
        let m = module("a")
            .at(&dir)
            .with_classpath(["bin/", "lib.jar", "missing.jar", "."]);
        let entries = layout.classpath_entries(&m).unwrap();
        assert_eq!(entries, vec![dir.join("bin"), dir.join("lib.jar"), dir.clone()]);
    }

    #[test]
    fn entries_leaving_the_bundle_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("plugins/a");
        fs::create_dir_all(dir.join("bin")).unwrap();
        fs::write(tmp.path().join("secret.txt"), b"").unwrap();

        let layout = FileSystemLayout::new(tmp.path(), tmp.path().join("unpacked"));
        let m = module("a")
            .at(&dir)
            .with_classpath(["../../secret.txt", "bin/../bin", "bin"]);
        assert_eq!(layout.classpath_entries(&m).unwrap(), vec![dir.join("bin")]);
    }

    #[test]
    fn empty_classpath_means_module_root() {
        let tmp = TempDir::new().unwrap();
        let jar = tmp.path().join("a.jar");
        fs::write(&jar, b"").unwrap();
        let layout = FileSystemLayout::new(tmp.path(), tmp.path().join("unpacked"));
        assert_eq!(layout.classpath_entries(&module("a").at(&jar)).unwrap(), vec![jar]);
    }
}

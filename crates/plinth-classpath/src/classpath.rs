//! Joining classpath entries into a single `-classpath` argument.

use std::path::{Path, PathBuf};

use plinth_util::fs::relativize;

/// Join paths into a classpath string suitable for `-classpath`.
pub fn to_classpath_string(entries: &[PathBuf]) -> String {
    entries
        .iter()
        .map(|p| p.to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join(classpath_separator())
}

pub fn classpath_separator() -> &'static str {
    if cfg!(windows) {
        ";"
    } else {
        ":"
    }
}

/// Render every entry relative to `base`.
pub fn relativize_all(entries: &[PathBuf], base: &Path) -> Vec<PathBuf> {
    entries.iter().map(|p| relativize(p, base)).collect()
}

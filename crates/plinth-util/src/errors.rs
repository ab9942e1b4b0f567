use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all plinth operations.
#[derive(Debug, Error, Diagnostic)]
pub enum PlinthError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The dependency graph contains a cycle and cannot be ordered.
    #[error("Cyclic dependency detected: {}", .vertices.join(" -> "))]
    #[diagnostic(help("Break the cycle by removing one of the listed dependencies"))]
    CyclicDependency { vertices: Vec<String> },

    /// An edge referenced a vertex that was never added to the graph.
    #[error("Unknown vertex '{vertex}': add it to the graph before adding edges")]
    UnknownVertex { vertex: String },

    /// A required module could not be found in the registry.
    #[error("Module not found: {name} ({constraint})")]
    #[diagnostic(help("Check that the module is part of the platform and the version matches"))]
    ModuleNotFound { name: String, constraint: String },

    /// A version or version range string could not be parsed.
    #[error("Invalid version '{version}': {reason}")]
    #[diagnostic(help("Versions look like 1.2.3.qualifier, ranges like [1.0,2.0)"))]
    AmbiguousVersion { version: String, reason: String },

    /// The backing artifact of a resolved module could not be located.
    #[error("Cannot resolve layout of {module}: {message}")]
    LayoutResolution { module: String, message: String },

    /// A request was rejected before any resolution took place.
    #[error("Invalid request: {message}")]
    Precondition { message: String },

    /// The platform description could not be read or parsed.
    #[error("Platform error: {message}")]
    #[diagnostic(help("Check your Plinth.toml for syntax errors"))]
    Platform { message: String },

    /// Configuration could not be loaded.
    #[error("Config error: {message}")]
    Config { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias for `miette::Result<T>`.
pub type PlinthResult<T> = miette::Result<T>;

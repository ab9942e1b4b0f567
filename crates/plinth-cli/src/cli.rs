//! CLI argument definitions for Plinth.
//!
//! Uses `clap` derive macros to define the command surface. Each command
//! corresponds to a handler in the [`super::commands`] module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "plinth",
    version,
    about = "Resolve bundle classpaths and build order",
    long_about = "Plinth computes the transitive closure of bundle requirements described \
                  in a Plinth.toml platform file, materializes it into a classpath, and \
                  orders bundles so that every bundle follows its dependencies."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Global config file (defaults to ~/.plinth/config.toml)
    #[arg(long, global = true, env = "PLINTH_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the classpath required by one or more bundles
    Classpath(ClasspathArgs),

    /// Print bundles in build order, dependencies first
    Order(OrderArgs),
}

#[derive(Args, Debug)]
pub struct ClasspathArgs {
    /// Platform description (defaults to the nearest Plinth.toml)
    #[arg(short, long)]
    pub platform: Option<PathBuf>,

    /// Bundle to resolve, as NAME or NAME@VERSION (repeatable)
    #[arg(short, long = "bundle", value_name = "NAME[@VERSION]")]
    pub bundles: Vec<String>,

    /// Symbolic name of a single bundle to resolve
    #[arg(long, conflicts_with = "bundles")]
    pub name: Option<String>,

    /// Version of the bundle given with --name
    #[arg(long, requires = "name")]
    pub version: Option<String>,

    /// Do not follow optional requirements
    #[arg(long, conflicts_with = "lenient_optional")]
    pub no_optional: bool,

    /// Follow optional requirements, skipping those that cannot be resolved
    #[arg(long)]
    pub lenient_optional: bool,

    /// One entry per bundle (its root) instead of its bundle classpath
    #[arg(long)]
    pub root_only: bool,

    /// Drop duplicate classpath entries
    #[arg(long)]
    pub dedup: bool,

    /// Exclude bundles whose symbolic name matches this glob (repeatable)
    #[arg(long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Leave workspace bundles out of the closure
    #[arg(long)]
    pub exclude_workspace: bool,

    /// Leave the requested bundles themselves out of the result
    #[arg(long)]
    pub exclude_specified: bool,

    /// Print paths relative to the current directory
    #[arg(long)]
    pub relative: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = ClasspathFormat::Path)]
    pub format: ClasspathFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ClasspathFormat {
    /// A single separator-joined classpath string
    Path,
    /// One entry per line
    Lines,
    /// JSON object with bundles and classpath
    Json,
}

#[derive(Args, Debug)]
pub struct OrderArgs {
    /// Platform description (defaults to the nearest Plinth.toml)
    #[arg(short, long)]
    pub platform: Option<PathBuf>,

    /// Bundle to order together with its requirements (default: all bundles)
    #[arg(short, long = "bundle", value_name = "NAME[@VERSION]")]
    pub bundles: Vec<String>,

    /// Group bundles into levels that can be built in parallel
    #[arg(long)]
    pub levels: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OrderFormat::Lines)]
    pub format: OrderFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OrderFormat {
    Lines,
    Json,
}

/// Parse command-line arguments into a [`Cli`] struct.
pub fn parse() -> Cli {
    Cli::parse()
}

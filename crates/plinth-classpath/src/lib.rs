//! Turns a resolved set of modules into concrete classpath entries.
//!
//! The [`LayoutResolver`] seam locates a module's backing artifact and its
//! internal classpath; [`materialize`] walks modules in the caller's order and
//! collects their contributions.

pub mod classpath;
pub mod layout;
pub mod materialize;

pub use classpath::{classpath_separator, relativize_all, to_classpath_string};
pub use layout::{FileSystemLayout, LayoutResolver};
pub use materialize::{materialize, MaterializeMode, MaterializeOptions};

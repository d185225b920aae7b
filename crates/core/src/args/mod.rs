//! Command-line argument handling.
//!
//! Two independent views are derived from the same raw vector:
//! [`ClassifiedArguments`] sorts every token into a bucket, and
//! [`InitialOptions`] extracts the engine switches needed before plugins load.

pub mod initial;
pub mod partition;

pub use initial::{DEFAULT_FRONTEND, InitialOptions};
pub use partition::{ClassifiedArguments, OptionTarget};

/// Marks the end of option parsing
pub const ESCAPE_TOKEN: &str = "--";

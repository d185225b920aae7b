//! Process-level plumbing for the `manifold` binary

pub mod logging;

//! Errors surfaced by the frame/transform mechanism.

use thiserror::Error;

/// Errors that can occur while using the parameter mechanism.
///
/// All of these indicate programmer errors (misuse of the mechanism or a
/// mismatched params mapping), not transient conditions. Nothing here is
/// retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A frame-dependent operation ran outside of any `init`/`apply` call.
    #[error("`{op}` called outside of an `init` or `apply` trace")]
    NoActiveFrame { op: &'static str },

    /// A parameter path was requested during `apply` but is absent from the
    /// supplied params. Usually means the mapping was produced by a
    /// differently structured `init`.
    #[error("parameter `{path}` not found in the supplied params")]
    MissingParam { path: String },

    /// A stored parameter's shape disagrees with the shape requested at the
    /// call site.
    #[error("parameter `{path}` has shape {stored:?}, but {requested:?} was requested")]
    ShapeMismatch {
        path: String,
        requested: Vec<usize>,
        stored: Vec<usize>,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

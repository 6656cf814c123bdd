//! Error types for the middleware core.
//!
//! The taxonomy is deliberately small: workflow-level conditions the caller
//! can react to (`NoResult`, `MalformedResult`, `UnsupportedOperation`) and
//! opaque collaborator failures (`Transport`, `Editor`) that propagate
//! unchanged through the chain.

/// Errors produced by chain execution, wire operations and the test workflow.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// An evaluation that was expected to yield a value yielded nothing.
    #[error("evaluation produced no result")]
    NoResult,

    /// A protocol value did not match the expected shape.
    #[error("malformed result: {0}")]
    MalformedResult(String),

    /// The server does not advertise a required operation.
    ///
    /// Non-fatal by convention: workflows abort gracefully and report
    /// "not run" instead of propagating this to the user.
    #[error("server does not support operation: {0}")]
    UnsupportedOperation(String),

    /// The transport collaborator failed during a round trip.
    #[error("transport error: {0}")]
    Transport(String),

    /// The editor collaborator failed.
    #[error("editor error: {0}")]
    Editor(String),
}

pub type Result<T> = std::result::Result<T, Error>;

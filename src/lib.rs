//! replchain - interceptor-chain middleware for eval-server clients
//!
//! This library sits between operation callers and the wire transport of a
//! remote evaluation server (map-based request/response streams terminated
//! by a "done" marker). It provides:
//!
//! - a typed message model aggregating response streams ([`DoneResponse`]);
//! - a per-category registry of named middleware units ([`Registry`]);
//! - a two-phase enter/leave chain executor with a terminal handler that
//!   performs the protocol round trip;
//! - built-in interceptors (response path normalization, verbose output
//!   echoing) that double as the extension reference;
//! - a test discovery and execution workflow built entirely on top of the
//!   chain ([`testing`]).
//!
//! Editor and transport concerns stay behind the [`collab`] traits; the
//! crate never renders UI or opens connections itself.

pub mod builtin;
pub mod chain;
pub mod collab;
pub mod error;
pub mod interceptor;
pub mod message;
pub mod messages;
pub mod ops;
pub mod registry;
pub mod report;
pub mod session;
pub mod strutil;
pub mod testing;


pub use collab::{Editor, SourceFile, Transport};
pub use error::{Error, Result};
pub use interceptor::{ChainContext, Interceptor, TerminalHandler};
pub use message::{DoneResponse, Operation, Params, ResponseMessage};
pub use registry::Registry;
pub use report::{TestFailure, TestReport, TestSummary};
pub use session::{SendOperation, Session};

//! Interceptor contract and chain context.
//!
//! An interceptor is a named, categorized middleware unit with two optional
//! phases: `enter` runs before dispatch in registration order, `leave` runs
//! after dispatch in reverse registration order. Both phases default to a
//! no-op pass-through, so an implementation overrides only the phase it
//! cares about. The executor checks behavior presence through these
//! defaults, never through type identity.

use crate::error::Result;
use crate::message::{DoneResponse, Params};
use crate::session::Session;
use async_trait::async_trait;
use std::sync::Arc;

/// State threaded through one chain execution.
///
/// Created fresh per execution, handed from phase to phase by value, and
/// discarded when the chain completes. The session reference gives
/// interceptors access to the editor and transport collaborators.
pub struct ChainContext {
    /// The session that owns this execution.
    pub session: Arc<Session>,

    /// Operation category the chain was resolved for.
    pub category: String,

    /// Request parameters; interceptors may rewrite them in the enter phase.
    pub params: Params,

    /// Aggregated response, attached by the terminal handler and available
    /// to the leave phase.
    pub response: Option<DoneResponse>,
}

impl ChainContext {
    pub fn new(session: Arc<Session>, category: &str, params: Params) -> Self {
        Self {
            session,
            category: category.to_string(),
            params,
            response: None,
        }
    }

    /// The attached response; a terminal handler that completed without
    /// attaching one is reported as a transport failure.
    pub fn into_response(self) -> Result<DoneResponse> {
        self.response
            .ok_or_else(|| crate::error::Error::Transport("chain produced no response".into()))
    }
}

impl std::fmt::Debug for ChainContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainContext")
            .field("category", &self.category)
            .field("params", &self.params)
            .field("response", &self.response)
            .finish_non_exhaustive()
    }
}

/// A middleware unit. `name` identifies it for removal within its category;
/// no two interceptors in one category may share a name.
#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Identity within the category, used for removal and deduplication.
    fn name(&self) -> &str;

    /// Category tag this interceptor registers under.
    fn category(&self) -> &str;

    /// Pre-dispatch phase. Default: pass-through.
    async fn enter(&self, ctx: ChainContext) -> Result<ChainContext> {
        Ok(ctx)
    }

    /// Post-dispatch phase. Default: pass-through.
    async fn leave(&self, ctx: ChainContext) -> Result<ChainContext> {
        Ok(ctx)
    }
}

/// The chain element that performs the actual protocol round trip.
///
/// Exactly one terminal handler runs per execution, always last in the
/// enter phase; it never participates in the leave phase.
#[async_trait]
pub trait TerminalHandler: Send + Sync {
    async fn dispatch(&self, ctx: ChainContext) -> Result<ChainContext>;
}

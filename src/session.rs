//! Session: the runtime object owning the interceptor registry and the
//! transport/editor collaborators.
//!
//! Everything the core does goes through a session. It is created once per
//! connection by the surrounding integration, registers the built-in
//! interceptors, and exposes [`Session::execute`] (the chain executor entry
//! point) plus [`Session::send`] (execute with the standard wire terminal
//! handler).

use crate::builtin;
use crate::chain;
use crate::collab::{Editor, Transport};
use crate::error::Result;
use crate::interceptor::{ChainContext, TerminalHandler};
use crate::message::{DoneResponse, Operation, Params};
use crate::registry::Registry;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

pub struct Session {
    transport: Arc<dyn Transport>,
    editor: Arc<dyn Editor>,
    registry: Registry,
}

impl Session {
    /// Create a session and register the built-in interceptors.
    pub fn new(transport: Arc<dyn Transport>, editor: Arc<dyn Editor>) -> Arc<Self> {
        let session = Arc::new(Self {
            transport,
            editor,
            registry: Registry::new(),
        });
        for interceptor in builtin::all() {
            session.registry.add(interceptor);
        }
        session
    }

    /// Create a session without the built-ins. Callers register their own
    /// interceptor set.
    pub fn bare(transport: Arc<dyn Transport>, editor: Arc<dyn Editor>) -> Arc<Self> {
        Arc::new(Self {
            transport,
            editor,
            registry: Registry::new(),
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn editor(&self) -> &Arc<dyn Editor> {
        &self.editor
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Run `params` through the interceptor chain registered for
    /// `category`, dispatching to `terminal` between the enter and leave
    /// phases. See [`chain::execute`] for the full contract.
    pub async fn execute(
        self: &Arc<Self>,
        category: &str,
        params: Params,
        terminal: &dyn TerminalHandler,
    ) -> Result<ChainContext> {
        chain::execute(self, category, params, terminal).await
    }

    /// Send a wire operation through the chain with the standard
    /// [`SendOperation`] terminal handler. The category equals the wire op
    /// name, so per-op interceptors attach naturally.
    pub async fn send(self: &Arc<Self>, op: &str, params: Params) -> Result<DoneResponse> {
        self.execute(op, params, &SendOperation).await?.into_response()
    }
}

/// Standard terminal handler: builds the [`Operation`] from the context
/// parameters, performs the transport round trip, and attaches the
/// aggregated response (with the request `context` sub-map copied onto it)
/// to the context.
pub struct SendOperation;

#[async_trait]
impl TerminalHandler for SendOperation {
    async fn dispatch(&self, mut ctx: ChainContext) -> Result<ChainContext> {
        let operation = Operation::new(&ctx.category, ctx.params.clone());
        tracing::debug!(op = %operation.op, id = %operation.id, "dispatching operation");
        let response = ctx.session.transport().send(operation).await?;

        let request_context = ctx
            .params
            .get("context")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        ctx.response = Some(response.with_context(request_context));
        Ok(ctx)
    }
}

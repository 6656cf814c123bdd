//! Chain executor: enter phase, terminal dispatch, reverse leave phase.
//!
//! ```text
//! execute(category, params, terminal)
//!   chain = registry.snapshot(category)          resolved once, never re-read
//!   ctx   = ChainContext(params)
//!   for i in chain:            ctx = i.enter(ctx)?     registration order
//!   ctx = terminal.dispatch(ctx)?                      exactly once
//!   for i in chain.reversed(): ctx = i.leave(ctx)?     reverse order
//!   return ctx
//! ```
//!
//! Failure is fail-fast, first error wins: an error in any phase aborts the
//! remaining steps and propagates to the caller unchanged. The terminal
//! handler never participates in the leave phase.

use crate::error::Result;
use crate::interceptor::{ChainContext, TerminalHandler};
use crate::message::Params;
use crate::session::Session;
use std::sync::Arc;

/// Run one operation through the interceptor chain for `category`.
///
/// With zero registered interceptors this is exactly a call to the terminal
/// handler. Registry mutation after the snapshot is taken has no effect on
/// this execution.
pub async fn execute(
    session: &Arc<Session>,
    category: &str,
    params: Params,
    terminal: &dyn TerminalHandler,
) -> Result<ChainContext> {
    let chain = session.registry().snapshot(category);
    tracing::debug!(category, interceptors = chain.len(), "executing chain");

    let mut ctx = ChainContext::new(Arc::clone(session), category, params);

    for interceptor in &chain {
        ctx = interceptor.enter(ctx).await?;
    }

    ctx = terminal.dispatch(ctx).await?;

    for interceptor in chain.iter().rev() {
        ctx = interceptor.leave(ctx).await?;
    }

    Ok(ctx)
}

//! Wire operations.
//!
//! Thin wrappers that shape parameters for the operations the workflows
//! need and send them through the chain executor. The chain category equals
//! the wire op name, so interceptors registered for an op apply to every
//! call here. Parameter shapes are fixed by protocol compatibility and must
//! not be changed.

use crate::collab::SourceFile;
use crate::error::{Error, Result};
use crate::message::{DoneResponse, Params};
use crate::session::Session;
use serde_json::{json, Value};
use std::sync::Arc;

/// An eval context that suppresses verbose output echoing.
pub fn quiet_context() -> Params {
    let mut context = Params::new();
    context.insert("verbose".to_string(), json!("false"));
    context
}

/// Evaluate a code string, optionally with a request context.
pub async fn eval_code(
    session: &Arc<Session>,
    code: &str,
    context: Option<Params>,
) -> Result<DoneResponse> {
    let mut params = Params::new();
    params.insert("code".to_string(), json!(code));
    if let Some(context) = context {
        params.insert("context".to_string(), Value::Object(context));
    }
    session.send("eval", params).await
}

/// Reload the file backing the current buffer.
pub async fn load_current_file(session: &Arc<Session>) -> Result<DoneResponse> {
    let SourceFile { path, name, content } = session.editor().current_file().await?;
    let mut params = Params::new();
    params.insert("file".to_string(), json!(content));
    params.insert("file-name".to_string(), json!(name));
    params.insert("file-path".to_string(), json!(path));
    session.send("load-file", params).await
}

/// Require a namespace so its vars and metadata are loaded server-side.
pub async fn require_ns(session: &Arc<Session>, ns: &str) -> Result<DoneResponse> {
    eval_code(session, &format!("(require '{ns})"), Some(quiet_context())).await
}

/// True if the server's `describe` response advertises `op`.
pub async fn is_supported_operation(session: &Arc<Session>, op: &str) -> Result<bool> {
    let resp = session.send("describe", Params::new()).await?;
    Ok(resp
        .get_first("ops")
        .and_then(Value::as_object)
        .is_some_and(|ops| ops.contains_key(op)))
}

/// Like [`is_supported_operation`], but an unsupported op is an error.
pub async fn ensure_supported(session: &Arc<Session>, op: &str) -> Result<()> {
    if is_supported_operation(session, op).await? {
        Ok(())
    } else {
        Err(Error::UnsupportedOperation(op.to_string()))
    }
}

/// Fetch the var → metadata map for a namespace.
pub async fn ns_vars_with_meta(session: &Arc<Session>, ns: &str) -> Result<DoneResponse> {
    let mut params = Params::new();
    params.insert("ns".to_string(), json!(ns));
    session.send("ns-vars-with-meta", params).await
}

/// Run a test var query. `query` carries `ns-query: {exactly: [ns]}` and
/// optionally `exactly: [qualified var names]`.
pub async fn test_var_query(session: &Arc<Session>, query: Params) -> Result<DoneResponse> {
    session.send("test-var-query", query).await
}

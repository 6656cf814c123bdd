//! Verbose output echoing.
//!
//! On leave, forwards the first recorded `out`, `err` and `pprint-out`
//! response values to the editor's output buffer, one buffer line per text
//! line. Echoing is controlled by the request's `context.verbose` flag: the
//! string `"false"` disables it, absence or any other value enables it.
//! Non-string field values are skipped silently.

use crate::error::Result;
use crate::interceptor::{ChainContext, Interceptor};
use crate::strutil;
use async_trait::async_trait;
use serde_json::Value;

const ECHOED_FIELDS: [&str; 3] = ["out", "err", "pprint-out"];

pub struct OutputEchoInterceptor;

#[async_trait]
impl Interceptor for OutputEchoInterceptor {
    fn name(&self) -> &str {
        "output-echo"
    }

    fn category(&self) -> &str {
        "read"
    }

    async fn leave(&self, ctx: ChainContext) -> Result<ChainContext> {
        let Some(response) = ctx.response.as_ref() else {
            return Ok(ctx);
        };

        let verbose = response.context().get("verbose").and_then(Value::as_str) != Some("false");
        if verbose {
            for field in ECHOED_FIELDS {
                if let Some(Value::String(text)) = response.get_first(field) {
                    let lines = strutil::split_lines(text);
                    ctx.session.editor().append_lines(lines).await?;
                }
            }
        }

        Ok(ctx)
    }
}

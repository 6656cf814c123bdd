//! Response path normalization.
//!
//! Servers report source locations with raw, sometimes relative paths. This
//! interceptor rewrites every string value under the `path` response field
//! to lexically-normalized form on the way back to the caller. Non-string
//! values pass through untouched; normalization is idempotent.

use crate::error::Result;
use crate::interceptor::{ChainContext, Interceptor};
use crate::strutil;
use async_trait::async_trait;
use serde_json::Value;

pub struct NormalizePathInterceptor;

#[async_trait]
impl Interceptor for NormalizePathInterceptor {
    fn name(&self) -> &str {
        "normalize-path"
    }

    fn category(&self) -> &str {
        "ns-path"
    }

    async fn leave(&self, mut ctx: ChainContext) -> Result<ChainContext> {
        if let Some(response) = ctx.response.take() {
            ctx.response = Some(response.map_field("path", |value| match value {
                Value::String(path) => Value::String(strutil::normalize_path(&path)),
                other => other,
            }));
        }
        Ok(ctx)
    }
}

//! Built-in interceptors.
//!
//! These ship with every session and double as the reference pattern for
//! writing third-party interceptors: implement [`crate::Interceptor`],
//! override only the phase you need, and register through the session's
//! registry.

pub mod normalize_path;
pub mod output_echo;

use crate::interceptor::Interceptor;
use std::sync::Arc;

/// The interceptor set registered by `Session::new`.
pub fn all() -> Vec<Arc<dyn Interceptor>> {
    vec![
        Arc::new(normalize_path::NormalizePathInterceptor),
        Arc::new(output_echo::OutputEchoInterceptor),
    ]
}

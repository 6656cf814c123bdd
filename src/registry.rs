//! Interceptor registry: per-category ordered lists of middleware units.
//!
//! The registry is process-lifetime shared state owned by the session. It
//! only ever hands out snapshots: a chain execution resolves its interceptor
//! list once at start, so concurrent add/remove cannot affect an in-flight
//! chain. The lock is never held across an await point.

use crate::interceptor::Interceptor;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct Registry {
    inner: Mutex<HashMap<String, Vec<Arc<dyn Interceptor>>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an interceptor to its category's list, creating the category
    /// if this is its first entry. Insertion order is preserved; the
    /// registry never reorders entries on its own.
    pub fn add(&self, interceptor: Arc<dyn Interceptor>) {
        let mut inner = self.inner.lock().expect("registry lock poisoned");
        inner
            .entry(interceptor.category().to_string())
            .or_default()
            .push(interceptor);
    }

    /// Remove every entry in `category` whose name equals `name`. Removing
    /// from an unknown category is a no-op.
    pub fn remove(&self, category: &str, name: &str) {
        let mut inner = self.inner.lock().expect("registry lock poisoned");
        if let Some(interceptors) = inner.get_mut(category) {
            interceptors.retain(|i| i.name() != name);
        }
    }

    /// The current ordered list for `category`, cloned. Chain executions
    /// capture this once at start and never re-read.
    pub fn snapshot(&self, category: &str) -> Vec<Arc<dyn Interceptor>> {
        let inner = self.inner.lock().expect("registry lock poisoned");
        inner.get(category).cloned().unwrap_or_default()
    }
}

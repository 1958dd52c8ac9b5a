//! Render transaction - all-or-nothing view instantiation
//!
//! Views created during a pass are tracked here. If any field fails,
//! `rollback` destroys everything created so far in reverse order and
//! the previously committed set stays untouched. On success `commit`
//! hands the batch back as a name-keyed map.

use formwork_foundation::RenderedInstance;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use formwork_foundation::ViewHost;

/// Accumulates instances created by one render pass
pub struct RenderTransaction {
    host: Arc<dyn ViewHost>,
    created: Vec<RenderedInstance>,
}

impl RenderTransaction {
    pub fn new(host: Arc<dyn ViewHost>) -> Self {
        Self {
            host,
            created: Vec::new(),
        }
    }

    /// Track a successfully created instance
    pub fn track(&mut self, instance: RenderedInstance) {
        self.created.push(instance);
    }

    pub fn len(&self) -> usize {
        self.created.len()
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
    }

    /// Destroy everything created so far, newest first
    pub fn rollback(mut self) {
        debug!(count = self.created.len(), "render: rolling back partial batch");
        while let Some(instance) = self.created.pop() {
            self.host.destroy(&instance.view);
        }
    }

    /// Finish the pass and return the batch keyed by field name
    pub fn commit(self) -> HashMap<String, RenderedInstance> {
        self.created
            .into_iter()
            .map(|instance| (instance.name.clone(), instance))
            .collect()
    }
}

//! Application state for the web layer.

use std::sync::Arc;

use crate::dispatch::Dispatcher;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Dispatcher shared with every request
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

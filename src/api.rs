//! HTTP API: the `POST /api/chat` contract
//!
//! The router is the single hosting boundary. The local listener in `main`
//! mounts it; any other host must mount the same router to keep the
//! contract identical.

mod handlers;
pub mod wire;

pub use handlers::{create_router, internal_error_response};

use crate::proxy::ProxyAdapter;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub proxy: Arc<ProxyAdapter>,
}

impl AppState {
    pub fn new(proxy: Arc<ProxyAdapter>) -> Self {
        Self { proxy }
    }
}

//! Shared application state.

use std::sync::Arc;

use crate::pipeline::VoicePipeline;

/// Cloned into every request; the pipeline itself is immutable.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<VoicePipeline>,
}

impl AppState {
    pub fn new(pipeline: VoicePipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

//! Shared router state wiring the services together.

use crate::services::{
    ingest::IngestService, layout::ArtifactLayout, processor::DocumentProcessor,
    session::SessionStore,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub layout: ArtifactLayout,
    pub pipeline: IngestService,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(layout: ArtifactLayout, processor: Arc<dyn DocumentProcessor>) -> Self {
        Self {
            pipeline: IngestService::new(layout.clone(), processor),
            layout,
            sessions: SessionStore::new(),
        }
    }
}

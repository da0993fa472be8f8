//! Core services: validation, storage layout, ingestion, the external
//! processor seam, session bindings, and artifact serving.

pub mod artifacts;
pub mod ingest;
pub mod layout;
pub mod processor;
pub mod session;
pub mod validation;

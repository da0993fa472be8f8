//! Document upload-and-view server.
//!
//! A user uploads a document, an external processor renders it into a
//! browsable HTML tree, and the server serves that rendering back inside
//! the same browser session — validating the untrusted file, invoking the
//! processor exactly once, and confining every served path to the storage
//! root.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

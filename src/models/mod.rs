//! Core data models for the document viewer service.

pub mod artifact;

//! Shared domain types for the worksheet generation service.
//!
//! This crate is free of I/O: it defines the job and worksheet data model,
//! the artifact types exchanged with image providers, the error taxonomy,
//! and the content-generator trait seam. The executing components live in
//! `sheetforge-engine` and `sheetforge-providers`.

pub mod artifact;
pub mod content;
pub mod error;
pub mod job;
pub mod job_events;
pub mod types;
pub mod worksheet;

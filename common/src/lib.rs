//! Types shared between the course generator server and its HTTP clients.
//!
//! Everything here is plain serde data: persisted resources and their audit
//! log, course structures produced by the generation pipeline, request and
//! response payloads, and the status of background jobs.

pub mod jobs;
pub mod model;
pub mod requests;

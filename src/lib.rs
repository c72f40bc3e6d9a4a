//! Tags network flow log records against a port/protocol lookup table and
//! writes a two-section summary report.
//!
//! The pipeline is strictly sequential: load the lookup table, scan the flow
//! log once while aggregating per-tag and per-combination counts, then render
//! the report. Each stage is its own module and can be driven directly as a
//! library; the binary in `main.rs` is a thin wrapper around
//! [`app::Application`].

pub mod app;
pub mod cli;
pub mod flow;
pub mod internal_events;
pub mod lookup;
pub mod processor;
pub mod report;
pub mod trace;

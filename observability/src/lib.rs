//! # Molforge Observability
//!
//! The run's progress log, kept apart from `tracing` output:
//! - [`ProgressSink`] with a local file and a remote HTTP implementation
//! - plain-text rendering of step reports and run summaries

pub mod error;
pub mod report;
pub mod sink;

pub use error::{SinkError, SinkResult};
pub use report::{format_duration, render_report, render_summary};
pub use sink::{LocalProgressSink, ProgressSink, RemoteProgressSink, sink_from_config};

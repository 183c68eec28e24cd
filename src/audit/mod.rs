//! Structured audit logging.
//!
//! This module emits structured audit events through the `tracing`
//! crate on the `scanlens::audit` target. Any subscriber (JSON file,
//! OpenTelemetry, ...) can capture them.

mod events;

pub use events::{
    emit_scan_finished, emit_scan_report, emit_scan_submitted, AuditEvent, ScanAuditEvent,
};

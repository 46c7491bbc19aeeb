//! Per-field outcome aggregation for schema sync runs.
//!
//! The engine fails fast per field; the orchestrating caller records each
//! outcome here and decides whether to keep processing remaining fields.

use serde::{Deserialize, Serialize};

use crate::error::SyncError;

/// A field that could not be processed, with the error message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldFailure {
    pub handle: String,
    pub message: String,
}

/// Aggregated outcome of processing a schema document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncReport {
    /// Fields processed successfully.
    pub processed: usize,
    /// Fields rejected, in document order.
    pub failures: Vec<FieldFailure>,
    /// False as soon as any field failed.
    pub success: bool,
}

impl SyncReport {
    pub fn new() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    pub fn record_success(&mut self) {
        self.processed += 1;
    }

    pub fn record_failure(&mut self, handle: &str, error: &SyncError) {
        self.failures.push(FieldFailure {
            handle: handle.to_string(),
            message: error.to_string(),
        });
        self.success = false;
    }

    /// Generates a formatted summary for display.
    pub fn format_summary(&self, operation: &str) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{operation}: {} field(s) processed, {} failed\n",
            self.processed,
            self.failures.len()
        ));
        for failure in &self.failures {
            out.push_str(&format!("  - {}: {}\n", failure.handle, failure.message));
        }
        out
    }
}

//! Per-orchestration diagnostic log.
//!
//! Aggregators report per-slot results here instead of through their
//! return value. Every entry is also emitted as a tracing event.

use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Info,
    Failure,
}

/// One log line produced during aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Slot the entry is about, if any.
    pub slot: Option<usize>,
    pub level: DiagnosticLevel,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticLog {
    entries: Vec<Diagnostic>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, slot: Option<usize>, message: impl Into<String>) {
        let message = message.into();
        info!(slot, "{}", message);
        self.entries.push(Diagnostic {
            slot,
            level: DiagnosticLevel::Info,
            message,
        });
    }

    pub fn failure(&mut self, slot: Option<usize>, message: impl Into<String>) {
        let message = message.into();
        warn!(slot, "{}", message);
        self.entries.push(Diagnostic {
            slot,
            level: DiagnosticLevel::Failure,
            message,
        });
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn failures(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Failure)
    }

    /// Messages only, in order.
    pub fn messages(&self) -> Vec<&str> {
        self.entries.iter().map(|d| d.message.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

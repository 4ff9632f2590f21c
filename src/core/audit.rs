//! # Audit Trail
//!
//! Human-readable record of stock movements, owned by the caller and passed
//! into every mutating store call. Nothing here is persisted; the CLI prints
//! it on request and tests assert against it.

use std::fmt;

use chrono::{DateTime, Local};

/// One timestamped line in the audit trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub at: DateTime<Local>,
    pub message: String,
}

impl fmt::Display for AuditEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.at.format("%Y-%m-%d %H:%M:%S%.3f"), self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `message` stamped with the current local time.
    pub fn record(&mut self, message: impl Into<String>) {
        self.entries.push(AuditEntry {
            at: Local::now(),
            message: message.into(),
        });
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rendered lines, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.to_string()).collect()
    }
}

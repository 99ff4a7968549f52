//! Destinations for produced document bytes.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::RwLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Failed to write '{destination}': {source}")]
    Write {
        destination: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Sink rejected '{destination}': {message}")]
    Rejected { destination: String, message: String },
}

impl SinkError {
    pub fn destination(&self) -> &str {
        match self {
            SinkError::Write { destination, .. } | SinkError::Rejected { destination, .. } => destination,
        }
    }
}

/// Writes all of `bytes` to `destination`, or reports why it could not.
pub trait ReportSink: Send + Sync + Debug {
    fn write(&self, bytes: &[u8], destination: &str) -> Result<(), SinkError>;

    /// Returns a human-readable name for this sink (for logging).
    fn name(&self) -> &'static str;
}

/// A sink that keeps written documents in memory, keyed by destination.
#[derive(Debug, Default)]
pub struct InMemorySink {
    documents: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, destination: &str) -> Option<Vec<u8>> {
        self.documents.read().ok()?.get(destination).cloned()
    }

    /// Destinations written so far, in order.
    pub fn destinations(&self) -> Vec<String> {
        self.documents
            .read()
            .map(|d| d.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl ReportSink for InMemorySink {
    fn write(&self, bytes: &[u8], destination: &str) -> Result<(), SinkError> {
        let mut documents = self.documents.write().map_err(|_| SinkError::Rejected {
            destination: destination.to_string(),
            message: "sink lock poisoned".to_string(),
        })?;
        documents.insert(destination.to_string(), bytes.to_vec());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "InMemorySink"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_sink_roundtrip() {
        let sink = InMemorySink::new();
        sink.write(b"%PDF-1.5", "out/report.pdf").unwrap();
        sink.write(b"<report/>", "out/report.xml").unwrap();

        assert_eq!(sink.get("out/report.pdf").as_deref(), Some(&b"%PDF-1.5"[..]));
        assert_eq!(sink.destinations(), vec!["out/report.pdf", "out/report.xml"]);
        assert!(sink.get("other").is_none());
    }

    #[test]
    fn test_sink_error_keeps_destination() {
        let err = SinkError::Write {
            destination: "/ro/report.pdf".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.destination(), "/ro/report.pdf");
        assert!(err.to_string().contains("denied"));
    }
}

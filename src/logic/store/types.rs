//! Flow record types

use serde::{Deserialize, Serialize};

use crate::logic::threat::ThreatLabel;

/// Opaque, stable row identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub i64);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One captured connection summary. Never mutated after capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    pub id: RecordId,
    pub timestamp: String,
    pub src_ip: String,
    pub dst_ip: String,
    pub src_port: u16,
    pub dst_port: u16,
    pub protocol: String,
}

impl FlowRecord {
    /// Short natural-language rendering fed to the semantic scorer
    pub fn summary(&self) -> String {
        format!(
            "{} | {} -> {} | Port: {} | Protocol: {}",
            self.timestamp, self.src_ip, self.dst_ip, self.dst_port, self.protocol
        )
    }
}

/// Capture-side record, before the store assigns an id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFlow {
    pub timestamp: String,
    pub src_ip: String,
    pub dst_ip: String,
    pub src_port: u16,
    pub dst_port: u16,
    pub protocol: String,
}

/// (id, label) pair read back from the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabeledRecord {
    pub id: RecordId,
    pub label: ThreatLabel,
}

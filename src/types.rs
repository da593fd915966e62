//! Core data types for the illustrator-bridge crate.
//!
//! This module defines the types shared across the crate:
//! - `BridgeError`: Error taxonomy for connection and document operations
//! - `ConnectionInfo`: Metadata about an established connection
//! - `scene_file_filter`: File-dialog filter string for the host's scene formats

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while locating, connecting to, or driving
/// Illustrator.
///
/// Every variant carries a human-readable message; the `DocumentSession`
/// converts these into user-facing popups at the operation boundary, so
/// none of them escape to the host as a panic.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// No active document (or no live connection) to operate on
    #[error("No active document: {0}")]
    NotConnected(String),

    /// Output extension has no row in the export table
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    /// The automation call or script execution failed
    #[error("Transport error: {0}")]
    TransportFailure(String),

    /// Every discoverable automation endpoint was tried and rejected
    #[error("Could not connect to Illustrator: {0}")]
    DiscoveryExhausted(String),
}

/// Metadata describing the transport an established session runs on.
///
/// Serialized as-is by the CLI for `--connect` output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionInfo {
    /// Endpoint the session is bound to: a COM ProgID on Windows
    /// (e.g. "Illustrator.Application.28") or an application name on
    /// macOS (e.g. "Adobe Illustrator 2024")
    pub endpoint: String,

    /// Version fragment of a versioned ProgID (e.g. ".28"), if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispatch_suffix: Option<String>,

    /// Transport kind: "com" or "applescript"
    pub transport: String,
}

impl ConnectionInfo {
    pub fn new(endpoint: &str, dispatch_suffix: Option<String>, transport: &str) -> Self {
        ConnectionInfo {
            endpoint: endpoint.to_string(),
            dispatch_suffix,
            transport: transport.to_string(),
        }
    }
}

/// Build a file-dialog filter string from the host's scene formats.
///
/// `[".ai", ".ait"]` becomes `"Illustrator Files (*.ai *.ait )"`.
pub fn scene_file_filter(formats: &[String]) -> String {
    let mut filter = String::from("Illustrator Files (");
    for fmt in formats {
        filter.push('*');
        filter.push_str(fmt);
        filter.push(' ');
    }
    filter.push(')');
    filter
}

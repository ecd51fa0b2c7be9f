//! Pipeline manifest parsing and validation
//!
//! The pipeline graph is described textually as a JSON manifest: an
//! ordered list of nodes (first one a source, last one a sink) and the
//! connections chaining them. Parsing and validation failures are
//! construction errors; the controller never enters the running state
//! on a bad manifest.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Pipeline manifest structure (v1)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Schema version
    pub version: String,

    /// Pipeline metadata
    #[serde(default)]
    pub metadata: ManifestMetadata,

    /// Ordered list of nodes, source first
    pub nodes: Vec<NodeManifest>,

    /// Connections between nodes; when present they must form the
    /// declared source-to-sink chain
    #[serde(default)]
    pub connections: Vec<Connection>,
}

/// Pipeline metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Pipeline name
    #[serde(default)]
    pub name: String,

    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Node manifest entry
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NodeManifest {
    /// Unique node ID within the pipeline (the resolution name)
    pub id: String,

    /// Node type (e.g. "TestSource", "Identity")
    pub node_type: String,

    /// Node-specific parameters
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Connection between nodes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    /// Source node ID
    pub from: String,

    /// Target node ID
    pub to: String,
}

/// Parse a JSON manifest string into a [`Manifest`].
pub fn parse(json: &str) -> Result<Manifest> {
    serde_json::from_str(json).map_err(|e| Error::Manifest(format!("Failed to parse manifest: {}", e)))
}

/// Validate a manifest for correctness.
pub fn validate(manifest: &Manifest) -> Result<()> {
    if manifest.version != "v1" {
        return Err(Error::Manifest(format!(
            "Unsupported manifest version: {}",
            manifest.version
        )));
    }

    if manifest.nodes.is_empty() {
        return Err(Error::Manifest(
            "Manifest must contain at least one node".to_string(),
        ));
    }

    let mut seen_ids = std::collections::HashSet::new();
    for node in &manifest.nodes {
        if !seen_ids.insert(&node.id) {
            return Err(Error::Manifest(format!("Duplicate node ID: {}", node.id)));
        }
    }

    // Connections are optional (the node order already defines the
    // chain), but when present they must describe exactly that chain.
    if !manifest.connections.is_empty() {
        if manifest.connections.len() != manifest.nodes.len() - 1 {
            return Err(Error::Manifest(format!(
                "Expected {} connections for a linear chain of {} nodes, got {}",
                manifest.nodes.len() - 1,
                manifest.nodes.len(),
                manifest.connections.len()
            )));
        }
        for (conn, pair) in manifest.connections.iter().zip(manifest.nodes.windows(2)) {
            if conn.from != pair[0].id || conn.to != pair[1].id {
                return Err(Error::Manifest(format!(
                    "Connection {} -> {} does not follow the declared node order",
                    conn.from, conn.to
                )));
            }
        }
    }

    Ok(())
}

//! On-disk project document.
//!
//! A stored project is a JSON envelope around the `Project` plus the schema
//! version it was written with. Older documents are upgraded step by step on
//! read; documents from a newer build are refused.

use propreel_core::{now_millis, PropReelError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::project::Project;

/// Schema version written by this build.
pub const CURRENT_VERSION: u32 = 1;

/// Upgrade steps; entry `n` lifts a version-`n` document to version `n + 1`.
const UPGRADES: [fn(Value) -> Value; CURRENT_VERSION as usize] = [wrap_bare_project];

#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectFile {
    pub version: u32,
    /// Build that wrote the document.
    pub app_version: String,
    /// Unix millis of the write, 0 when unknown.
    #[serde(default)]
    pub saved_at: u64,
    pub project: Project,
}

impl ProjectFile {
    pub fn new(project: Project) -> Self {
        Self {
            version: CURRENT_VERSION,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            saved_at: now_millis(),
            project,
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| {
            PropReelError::Serialization(format!("Cannot encode project {}: {}", self.project.id, e))
        })
    }

    /// Decode a stored document of any supported schema version.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let mut doc: Value = serde_json::from_slice(data)
            .map_err(|e| PropReelError::Serialization(format!("Project document is not JSON: {}", e)))?;

        let found = schema_version(&doc);
        if found > CURRENT_VERSION {
            return Err(PropReelError::Serialization(format!(
                "Project document has schema {found}, this build reads up to {CURRENT_VERSION}"
            )));
        }
        for upgrade in &UPGRADES[found as usize..] {
            doc = upgrade(doc);
        }
        if found < CURRENT_VERSION {
            tracing::info!(from = found, to = CURRENT_VERSION, "Upgraded project document");
        }

        serde_json::from_value(doc)
            .map_err(|e| PropReelError::Serialization(format!("Malformed project document: {}", e)))
    }
}

/// Documents without a `version` field predate the envelope.
fn schema_version(doc: &Value) -> u32 {
    doc.get("version")
        .and_then(Value::as_u64)
        .map_or(0, |v| u32::try_from(v).unwrap_or(u32::MAX))
}

/// v0 stored the bare project object.
fn wrap_bare_project(doc: Value) -> Value {
    json!({
        "version": 1,
        "app_version": "0.0.0",
        "saved_at": 0,
        "project": doc,
    })
}

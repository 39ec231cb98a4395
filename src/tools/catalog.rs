//! Tool catalog — the advertised list of callable tools.
//!
//! Built once at process start from the cross product of known resource kinds
//! and the two operations; immutable for the process lifetime.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::tools::name::{self, Operation, ResourceKind};

/// Advertised metadata for one callable tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Ordered, immutable catalog of tool descriptors.
#[derive(Debug)]
pub struct Catalog {
    descriptors: Vec<ToolDescriptor>,
}

impl Catalog {
    /// Build the catalog for all known resource kinds.
    pub fn new() -> Self {
        let mut descriptors = Vec::with_capacity(ResourceKind::ALL.len() * Operation::ALL.len());
        for kind in ResourceKind::ALL {
            for op in Operation::ALL {
                descriptors.push(ToolDescriptor {
                    name: name::encode(kind, op),
                    description: describe(kind, op),
                    input_schema: input_schema(op),
                });
            }
        }
        Self { descriptors }
    }

    /// The full advertised list, in stable order.
    pub fn descriptors(&self) -> &[ToolDescriptor] {
        &self.descriptors
    }

    /// Whether a tool name is advertised.
    pub fn contains(&self, tool_name: &str) -> bool {
        self.descriptors.iter().any(|d| d.name == tool_name)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

fn describe(kind: ResourceKind, op: Operation) -> String {
    match op {
        Operation::FetchOne => format!("Fetch a single record from {} by id", kind),
        Operation::FetchPage => format!(
            "Fetch a page of {} with an optional filter, limit, and pagination cursor",
            kind
        ),
    }
}

/// JSON Schema for the operation's argument shape.
///
/// `fetch_page` deliberately sets `additionalProperties: true` — unknown
/// fields are forwarded to the backend, not rejected.
fn input_schema(op: Operation) -> Value {
    match op {
        Operation::FetchOne => json!({
            "type": "object",
            "properties": {
                "id": {
                    "type": "string",
                    "description": "Identifier of the record to fetch"
                }
            },
            "required": ["id"]
        }),
        Operation::FetchPage => json!({
            "type": "object",
            "properties": {
                "filter": {
                    "type": "object",
                    "description": "Backend filter expression, passed through opaquely"
                },
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "Maximum number of records to return"
                },
                "cursor": {
                    "type": "string",
                    "description": "Opaque cursor: the id of the last record of the previous page"
                }
            },
            "additionalProperties": true
        }),
    }
}

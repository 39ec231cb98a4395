//! Backend capability table — the read-only mapping from resource kind to
//! its fetch operations, built once at startup.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::tools::name::{Operation, ResourceKind};
use crate::tools::PageQuery;
use crate::types::{Error, Result};

/// One page of records plus an explicit continuation cursor.
///
/// `next_cursor` is the id of the last record in `items`; `None` marks the
/// end of the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub items: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// The two capabilities a backend exposes for one resource kind.
///
/// Implementations are shared across concurrently served peers, so they take
/// `&self` and hold no per-call state.
#[async_trait]
pub trait ResourceCapability: Send + Sync {
    /// Operations this capability actually supports.
    fn operations(&self) -> &[Operation];

    /// Fetch a single record by id.
    async fn fetch_one(&self, id: &str) -> Result<Value>;

    /// Fetch one page of records.
    async fn fetch_page(&self, query: PageQuery) -> Result<Page>;
}

/// Process-wide mapping from resource kind to its backend capability.
/// Constructed once at startup, read-only thereafter — safe to share without
/// locking.
#[derive(Default)]
pub struct CapabilityTable {
    entries: HashMap<ResourceKind, Arc<dyn ResourceCapability>>,
}

impl CapabilityTable {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register a capability for a resource kind.
    pub fn insert(&mut self, kind: ResourceKind, capability: Arc<dyn ResourceCapability>) {
        self.entries.insert(kind, capability);
    }

    /// Resolve a decoded resource name to its live capability.
    ///
    /// Absence is a routing error (`Error::UnknownResource`), never a silent
    /// no-op.
    pub fn resolve(&self, resource: &str) -> Result<Arc<dyn ResourceCapability>> {
        let kind = ResourceKind::parse(resource)
            .ok_or_else(|| Error::unknown_resource(resource.to_string()))?;
        self.entries
            .get(&kind)
            .cloned()
            .ok_or_else(|| Error::unknown_resource(resource.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for dyn ResourceCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ResourceCapability")
    }
}

impl fmt::Debug for CapabilityTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&str> = self.entries.keys().map(|k| k.as_str()).collect();
        kinds.sort_unstable();
        f.debug_struct("CapabilityTable").field("kinds", &kinds).finish()
    }
}

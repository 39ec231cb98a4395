//! Dispatcher — routes a validated call to the matching backend capability
//! and normalizes the result or error into the response envelope.
//!
//! Transport-agnostic: pure request-in/result-out. Both bindings share one
//! dispatcher instance.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::backend::CapabilityTable;
use crate::tools::name::{self};
use crate::tools::{args, Catalog, ToolArgs, ToolDescriptor};
use crate::types::{Error, Result};

/// One content block of a call result. Payloads are always carried as
/// serialized text; callers parse them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

impl ToolContent {
    fn text(text: String) -> Self {
        Self {
            content_type: "text".to_string(),
            text,
        }
    }
}

/// Normalized result of one tool call. Success and failure share the same
/// envelope shape; `is_error` distinguishes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallResult {
    #[serde(rename = "isError")]
    pub is_error: bool,
    pub content: Vec<ToolContent>,
}

impl CallResult {
    pub fn success(text: String) -> Self {
        Self {
            is_error: false,
            content: vec![ToolContent::text(text)],
        }
    }

    pub fn failure(err: &Error) -> Self {
        Self {
            is_error: true,
            content: vec![ToolContent::text(format!("Error: {}", err))],
        }
    }
}

/// Routes tool calls against the immutable catalog and capability table.
pub struct Dispatcher {
    catalog: Catalog,
    table: CapabilityTable,
}

impl Dispatcher {
    pub fn new(table: CapabilityTable) -> Self {
        Self {
            catalog: Catalog::new(),
            table,
        }
    }

    /// Advertised tool descriptors, for `tools/list`.
    pub fn descriptors(&self) -> &[ToolDescriptor] {
        self.catalog.descriptors()
    }

    /// Execute one tool call. Never returns an error: every failure is
    /// recovered here and folded into the failure envelope so the serving
    /// loop and unrelated in-flight calls are unaffected.
    pub async fn call(&self, tool_name: &str, arguments: &Value) -> CallResult {
        match self.call_inner(tool_name, arguments).await {
            Ok(payload) => match serde_json::to_string(&payload) {
                Ok(text) => {
                    tracing::debug!(tool = tool_name, "call succeeded");
                    CallResult::success(text)
                }
                Err(e) => CallResult::failure(&Error::Serialization(e)),
            },
            Err(e) => {
                tracing::debug!(tool = tool_name, error = %e, "call failed");
                CallResult::failure(&e)
            }
        }
    }

    /// decode name → validate args → resolve capability → invoke.
    async fn call_inner(&self, tool_name: &str, arguments: &Value) -> Result<Value> {
        let (resource, op) = name::decode(tool_name)?;
        let call_args = args::validate(op, arguments)?;
        let capability = self.table.resolve(&resource)?;

        if !capability.operations().contains(&op) {
            return Err(Error::unsupported_operation(format!(
                "{} does not support {}",
                resource, op
            )));
        }

        match call_args {
            ToolArgs::FetchOne { id } => capability.fetch_one(&id).await,
            ToolArgs::FetchPage(query) => {
                let page = capability.fetch_page(query).await?;
                Ok(serde_json::to_value(page)?)
            }
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("tools", &self.catalog.len())
            .field("table", &self.table)
            .finish()
    }
}

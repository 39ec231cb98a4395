//! Argument validation — raw argument bags become tagged request variants.
//!
//! The dispatcher never re-inspects untyped data: everything downstream of
//! this module works with `ToolArgs`.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::tools::name::Operation;
use crate::types::{Error, Result};

/// Validated query for a fetch-page call. All fields optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageQuery {
    /// Backend filter expression; opaque to the gateway.
    pub filter: Option<Map<String, Value>>,

    /// Positive page size. No upper bound is imposed here; that is a
    /// backend concern.
    pub limit: Option<u64>,

    /// Opaque continuation cursor: the id of the last record of the
    /// previous page.
    pub cursor: Option<String>,

    /// Unknown fields, preserved verbatim and forwarded to the backend.
    pub extra: Map<String, Value>,
}

/// Validated call arguments, tagged by operation.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolArgs {
    FetchOne { id: String },
    FetchPage(PageQuery),
}

/// Validate raw call arguments for an operation.
///
/// Fails with `Error::Validation` naming the offending field; no backend
/// call is made when validation fails.
pub fn validate(op: Operation, arguments: &Value) -> Result<ToolArgs> {
    let empty;
    let fields = match arguments {
        Value::Object(map) => map,
        // Absent arguments are treated as an empty bag.
        Value::Null => {
            empty = Map::new();
            &empty
        }
        other => {
            return Err(Error::validation(format!(
                "arguments must be an object, got {}",
                type_name(other)
            )))
        }
    };

    match op {
        Operation::FetchOne => {
            let id = fields
                .get("id")
                .ok_or_else(|| Error::validation("missing required field: id"))?;
            let id = id
                .as_str()
                .ok_or_else(|| {
                    Error::validation(format!("field 'id' must be a string, got {}", type_name(id)))
                })?
                .to_string();
            Ok(ToolArgs::FetchOne { id })
        }
        Operation::FetchPage => {
            let mut query = PageQuery::default();
            for (key, value) in fields {
                match key.as_str() {
                    "filter" => {
                        let map = value.as_object().ok_or_else(|| {
                            Error::validation(format!(
                                "field 'filter' must be an object, got {}",
                                type_name(value)
                            ))
                        })?;
                        query.filter = Some(map.clone());
                    }
                    "limit" => {
                        let limit = value.as_u64().filter(|n| *n > 0).ok_or_else(|| {
                            Error::validation("field 'limit' must be a positive integer")
                        })?;
                        query.limit = Some(limit);
                    }
                    "cursor" => {
                        let cursor = value.as_str().ok_or_else(|| {
                            Error::validation(format!(
                                "field 'cursor' must be a string, got {}",
                                type_name(value)
                            ))
                        })?;
                        query.cursor = Some(cursor.to_string());
                    }
                    // Forward-compatibility: unknown fields pass through.
                    _ => {
                        query.extra.insert(key.clone(), value.clone());
                    }
                }
            }
            Ok(ToolArgs::FetchPage(query))
        }
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

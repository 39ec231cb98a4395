//! Tool name codec — a deterministic, reversible mapping between a tool name
//! and a `(resource, operation)` pair.
//!
//! Convention: `name = <resource> + "_get_" + <one|page>`. The separator is a
//! closed convention; resource names must not contain it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Error, Result};

/// Separator between the resource part and the operation suffix.
pub const OP_SEPARATOR: &str = "_get_";

/// A family of backend-managed entities supporting fetch-one/fetch-page.
/// Finite, known set; not user-extensible at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Broadcasts,
    Campaigns,
    Collections,
    Forms,
    Journeys,
    Newsletters,
    Segments,
    Templates,
}

impl ResourceKind {
    /// All known resource kinds, in advertisement order.
    pub const ALL: [ResourceKind; 8] = [
        ResourceKind::Broadcasts,
        ResourceKind::Campaigns,
        ResourceKind::Collections,
        ResourceKind::Forms,
        ResourceKind::Journeys,
        ResourceKind::Newsletters,
        ResourceKind::Segments,
        ResourceKind::Templates,
    ];

    /// Wire name of the resource (also its API path segment).
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Broadcasts => "broadcasts",
            ResourceKind::Campaigns => "campaigns",
            ResourceKind::Collections => "collections",
            ResourceKind::Forms => "forms",
            ResourceKind::Journeys => "journeys",
            ResourceKind::Newsletters => "newsletters",
            ResourceKind::Segments => "segments",
            ResourceKind::Templates => "templates",
        }
    }

    /// Parse a wire name back into a kind. `None` for unknown names.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == s)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two supported operations on every resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    FetchOne,
    FetchPage,
}

impl Operation {
    pub const ALL: [Operation; 2] = [Operation::FetchOne, Operation::FetchPage];

    /// Suffix used in tool names.
    pub fn suffix(&self) -> &'static str {
        match self {
            Operation::FetchOne => "one",
            Operation::FetchPage => "page",
        }
    }

    fn from_suffix(s: &str) -> Option<Self> {
        match s {
            "one" => Some(Operation::FetchOne),
            "page" => Some(Operation::FetchPage),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Encode a `(resource, operation)` pair into a tool name.
pub fn encode(kind: ResourceKind, op: Operation) -> String {
    format!("{}{}{}", kind.as_str(), OP_SEPARATOR, op.suffix())
}

/// Decode a tool name into a `(resource, operation)` pair.
///
/// The resource part is returned as a string: whether a *live* capability
/// exists for it is the dispatcher's concern, not the codec's. Fails with
/// `Error::NameFormat` when the name does not match the convention.
pub fn decode(name: &str) -> Result<(String, Operation)> {
    let idx = name.rfind(OP_SEPARATOR).ok_or_else(|| {
        Error::name_format(format!("'{}' does not match <resource>_get_<one|page>", name))
    })?;

    let resource = &name[..idx];
    let suffix = &name[idx + OP_SEPARATOR.len()..];

    if resource.is_empty() {
        return Err(Error::name_format(format!("'{}' has an empty resource part", name)));
    }

    let op = Operation::from_suffix(suffix).ok_or_else(|| {
        Error::name_format(format!("'{}' has unknown operation suffix '{}'", name, suffix))
    })?;

    Ok((resource.to_string(), op))
}

//! # Toolgate - MCP Resource Gateway
//!
//! A gateway process exposing a fixed set of remote-callable tools to a
//! calling agent, dynamically routed to fetch-one/fetch-page operations on
//! an external resource API:
//! - Tool names follow the `<resource>_get_<one|page>` convention and are
//!   decoded back into a `(resource, operation)` pair
//! - Arguments are schema-checked before being forwarded
//! - A read-only capability table routes each call to its backend operation
//! - The same dispatcher is served over two transport bindings: a local
//!   stdio pipe (single peer) and an SSE-over-HTTP stream (multiple peers)
//!
//! ## Architecture
//!
//! ```text
//!   stdio peer ──┐                        ┌────────────────────┐
//!                ├─→ Name Codec → Args →  │     Dispatcher     │ → backend API
//!   SSE peers ───┘    Validator          │  capability table   │
//!                                         └────────────────────┘
//! ```
//!
//! The catalog and capability table are built once at startup and are
//! read-only thereafter; only the SSE session registry is mutable shared
//! state.

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

// Re-export public API
pub mod backend;
pub mod dispatch;
pub mod rpc;
pub mod tools;
pub mod transport;
pub mod types;

// Internal utilities
pub mod observability;

pub use types::{Config, Error, Result};

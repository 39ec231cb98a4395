//! Tool surface: name codec, catalog, and argument validation.

pub mod args;
pub mod catalog;
pub mod name;

pub use args::{PageQuery, ToolArgs};
pub use catalog::{Catalog, ToolDescriptor};
pub use name::{Operation, ResourceKind, OP_SEPARATOR};

//! Tool Registry (spec §4.2): typed descriptors + invoke contract, namespaced per agent.

pub mod builtin;
pub mod ctx;
pub mod descriptor;
pub mod registry;
pub mod result;

pub use ctx::ToolCtx;
pub use descriptor::{SideEffect, ToolDescriptor};
pub use registry::{ToolHandler, ToolRegistry};
pub use result::{ToolError, ToolErrorKind, ToolResult};

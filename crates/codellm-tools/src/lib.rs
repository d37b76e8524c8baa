//! Tool capability contract, configuration merge, registry, and the built-in
//! tools that answer questions about a project.

pub mod any;
pub mod config;
pub mod context;
pub mod description;
pub mod error;
pub mod file_reader;
pub mod registry;
pub mod tool;
pub mod vector_query;

pub use any::{AnyTool, ToolKind};
pub use config::{ToolEntry, ToolsConfig, default_tools, merge_config};
pub use context::ToolContext;
pub use description::{ParamKind, ToolDescription, ToolParam};
pub use error::ToolError;
pub use registry::ToolRegistry;
pub use tool::{Tool, ToolParams, ToolRunReturn};

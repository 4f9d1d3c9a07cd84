pub mod catalog;
pub mod client;
pub mod error;
pub mod executor;
pub mod transport;

pub use catalog::{load_tools, normalize_schema, normalize_tools, resolve_allow_list, to_llm_tools};
pub use client::{BridgeConfig, MCPClient, MCPTool, ToolResponse};
pub use error::{BridgeError, Result};
pub use executor::{MCPToolExecutor, ToolExecutor};
pub use transport::StdioTransport;

pub mod content;
pub mod message;
pub mod tool;

pub use content::{Content, ContentPart};
pub use message::Message;
pub use tool::{FunctionCall, FunctionDefinition, Tool, ToolCall, ToolChoice};

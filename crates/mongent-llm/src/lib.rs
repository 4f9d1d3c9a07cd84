pub mod azure_openai;
pub mod config;
pub mod openai;
pub mod traits;
pub mod types;

mod wire;

pub use traits::{ChatClient, ChatOptions, ChatRequest, ChatResponse, TokenUsage};

pub use azure_openai::AzureOpenAIClient;
pub use config::{AzureConfig, ClientFactory, OpenAIConfig, ProviderConfig, ProviderType};
pub use openai::OpenAIClient;
pub use types::{Content, Message, Tool, ToolCall, ToolChoice};

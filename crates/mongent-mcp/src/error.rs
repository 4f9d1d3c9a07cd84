use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Failed to spawn bridge process '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Bridge handshake failed: {0}")]
    Handshake(String),

    #[error("Bridge connection closed")]
    ConnectionClosed,

    #[error("Bridge transport error: {0}")]
    Transport(#[from] std::io::Error),

    #[error("Malformed bridge message: {0}")]
    Protocol(#[from] serde_json::Error),

    #[error("Bridge returned error for '{method}': {message}")]
    Rpc { method: String, message: String },

    #[error("Timed out waiting for bridge response to '{0}'")]
    Timeout(String),

    #[error("Failed to load tool '{name}': {reason}")]
    ToolLoad { name: String, reason: String },

    #[error("Tool '{name}' failed: {message}")]
    ToolCall { name: String, message: String },
}

pub type Result<T> = std::result::Result<T, BridgeError>;

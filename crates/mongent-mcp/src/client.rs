use crate::error::{BridgeError, Result};
use crate::transport::StdioTransport;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// How to spawn and talk to the bridge subprocess
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub command: String,
    pub args: Vec<String>,
    pub client_name: String,
    pub client_version: String,
    pub init_timeout: Duration,
    pub call_timeout: Duration,
}

impl BridgeConfig {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            client_name: "mongent".to_string(),
            client_version: env!("CARGO_PKG_VERSION").to_string(),
            init_timeout: Duration::from_secs(30),
            call_timeout: Duration::from_secs(60),
        }
    }
}

/// MCP client over a spawned subprocess (JSON-RPC 2.0 on stdio)
///
/// Requests are strictly sequential: the transport is held for the whole
/// round trip, and responses are matched to requests by id. Notifications
/// the server interleaves on stdout are logged and skipped.
pub struct MCPClient {
    transport: Mutex<StdioTransport>,
    next_id: AtomicU64,
    closed: AtomicBool,
    call_timeout: Duration,
}

impl MCPClient {
    /// Spawn the bridge process and complete the MCP handshake
    ///
    /// On any handshake failure the subprocess is terminated before the
    /// error is returned, so a partially connected bridge never leaks.
    pub async fn connect(config: BridgeConfig) -> Result<Self> {
        let transport = StdioTransport::spawn(&config.command, &config.args)?;

        let client = Self {
            transport: Mutex::new(transport),
            next_id: AtomicU64::new(1),
            closed: AtomicBool::new(false),
            call_timeout: config.call_timeout,
        };

        match tokio::time::timeout(config.init_timeout, client.initialize(&config)).await {
            Ok(Ok(())) => Ok(client),
            Ok(Err(e)) => {
                client.close().await;
                Err(e)
            }
            Err(_) => {
                client.close().await;
                Err(BridgeError::Timeout("initialize".to_string()))
            }
        }
    }

    async fn initialize(&self, config: &BridgeConfig) -> Result<()> {
        let params = json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {
                "name": config.client_name,
                "version": config.client_version,
            }
        });

        let result = self.request("initialize", params).await.map_err(|e| match e {
            BridgeError::Rpc { message, .. } => BridgeError::Handshake(message),
            other => other,
        })?;

        let server = result["serverInfo"]["name"].as_str().unwrap_or("unknown");
        let version = result["serverInfo"]["version"].as_str().unwrap_or("unknown");
        tracing::info!(server = %server, version = %version, "bridge connected");

        self.notify("notifications/initialized", json!({})).await
    }

    /// List the tools the bridge advertises
    pub async fn list_tools(&self) -> Result<Vec<MCPTool>> {
        let result = self.timed_request("tools/list", json!({})).await?;
        let tools = serde_json::from_value(result.get("tools").cloned().unwrap_or(Value::Null))?;
        Ok(tools)
    }

    /// Invoke one tool and flatten its result content to text
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<String> {
        tracing::debug!(tool = %name, "calling bridge tool");

        let params = json!({"name": name, "arguments": arguments});
        let result = self
            .timed_request("tools/call", params)
            .await
            .map_err(|e| match e {
                BridgeError::Rpc { message, .. } => BridgeError::ToolCall {
                    name: name.to_string(),
                    message,
                },
                other => other,
            })?;

        let responses = parse_content(result.get("content"));
        let text = ToolResponse::join_responses(&responses);

        if result.get("isError").and_then(Value::as_bool).unwrap_or(false) {
            return Err(BridgeError::ToolCall {
                name: name.to_string(),
                message: text,
            });
        }

        Ok(text)
    }

    /// Terminate the bridge subprocess; idempotent and safe to call twice
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut transport = self.transport.lock().await;
        transport.close().await;
        tracing::info!("bridge connection closed");
    }

    async fn timed_request(&self, method: &str, params: Value) -> Result<Value> {
        match tokio::time::timeout(self.call_timeout, self.request(method, params)).await {
            Ok(result) => result,
            Err(_) => Err(BridgeError::Timeout(method.to_string())),
        }
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        if self.closed.load(Ordering::Acquire) {
            return Err(BridgeError::ConnectionClosed);
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let envelope = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let mut transport = self.transport.lock().await;
        transport.send(&envelope).await?;

        loop {
            let message = transport.receive().await?;

            if message.get("id").and_then(Value::as_u64) == Some(id) {
                if let Some(error) = message.get("error") {
                    let text = error
                        .get("message")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| error.to_string());
                    return Err(BridgeError::Rpc {
                        method: method.to_string(),
                        message: text,
                    });
                }
                return Ok(message.get("result").cloned().unwrap_or(Value::Null));
            }

            if message.get("id").is_none() {
                // Server-initiated notification (logging and the like)
                tracing::debug!(method = %message["method"], "skipping bridge notification");
                continue;
            }

            // A response we stopped waiting for, or a server-to-client request
            tracing::debug!(?message, "skipping unexpected bridge message");
        }
    }

    async fn notify(&self, method: &str, params: Value) -> Result<()> {
        let envelope = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
        });
        let mut transport = self.transport.lock().await;
        transport.send(&envelope).await
    }
}

#[cfg(test)]
impl MCPClient {
    /// Client over a plain `cat` process, for tests that never issue requests
    pub(crate) fn stub() -> Self {
        let transport = StdioTransport::spawn("cat", &[]).unwrap();
        Self {
            transport: Mutex::new(transport),
            next_id: AtomicU64::new(1),
            closed: AtomicBool::new(false),
            call_timeout: Duration::from_secs(1),
        }
    }
}

/// Tool schema advertised by the bridge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MCPTool {
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "inputSchema", default)]
    pub input_schema: Value,
}

/// One content item of a tool result
#[derive(Debug, Clone)]
pub enum ToolResponse {
    Text {
        text: String,
    },
    Image {
        data: String,
        mime_type: String,
    },
    Resource {
        uri: String,
        text: Option<String>,
    },
}

impl fmt::Display for ToolResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text { text } => write!(f, "{}", text),
            Self::Image { mime_type, .. } => write!(f, "[image: {}]", mime_type),
            Self::Resource { uri, text } => match text {
                Some(text) => write!(f, "{}\n{}", uri, text),
                None => write!(f, "{}", uri),
            },
        }
    }
}

impl ToolResponse {
    /// Flatten all content items into a single string
    pub fn join_responses(responses: &[ToolResponse]) -> String {
        responses
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub(crate) fn parse_content(content: Option<&Value>) -> Vec<ToolResponse> {
    let items = match content.and_then(Value::as_array) {
        Some(items) => items,
        None => return Vec::new(),
    };

    items
        .iter()
        .filter_map(|item| match item.get("type").and_then(Value::as_str) {
            Some("text") => Some(ToolResponse::Text {
                text: item
                    .get("text")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            }),
            Some("image") => Some(ToolResponse::Image {
                data: item
                    .get("data")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                mime_type: item
                    .get("mimeType")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            }),
            Some("resource") => {
                let resource = item.get("resource").unwrap_or(item);
                Some(ToolResponse::Resource {
                    uri: resource
                        .get("uri")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    text: resource
                        .get("text")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                })
            }
            other => {
                tracing::debug!(content_type = ?other, "skipping unsupported content item");
                None
            }
        })
        .collect()
}

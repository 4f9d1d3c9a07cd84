use anyhow::{Context, Result};
use mongent_agent::DEFAULT_MAX_STEPS;
use mongent_llm::ProviderConfig;
use std::env;

/// MongoDB operations exposed to the agent, in presentation order
pub const ALLOWED_OPERATIONS: [&str; 20] = [
    "connect",
    "find",
    "aggregate",
    "count",
    "insert-one",
    "insert-many",
    "create-index",
    "update-one",
    "update-many",
    "rename-collection",
    "delete-one",
    "delete-many",
    "drop-collection",
    "drop-database",
    "list-databases",
    "list-collections",
    "collection-indexes",
    "collection-schema",
    "collection-storage-size",
    "db-stats",
];

pub const DEFAULT_CONNECTION_STRING: &str = "mongodb://localhost:27017/?directConnection=true";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const BRIDGE_COMMAND: &str = "npx";

/// Which chat-completion provider serves this run
#[derive(Debug, Clone)]
pub enum Provider {
    AzureOpenAI {
        api_key: String,
        endpoint: String,
        deployment: String,
        api_version: String,
    },
    OpenAI {
        api_key: String,
        model: String,
    },
}

/// Every knob of one program run, read from the environment once
///
/// Azure is selected whenever `AZURE_OAI_KEY` is set, standard OpenAI
/// otherwise. Nothing is re-read after startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub provider: Provider,
    pub temperature: Option<f32>,
    pub connection_string: String,
    pub max_steps: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |name: &str| {
            get(name).with_context(|| format!("{} environment variable is required", name))
        };

        let provider = if let Some(api_key) = get("AZURE_OAI_KEY") {
            Provider::AzureOpenAI {
                api_key,
                endpoint: require("AZURE_OAI_ENDPOINT")?,
                deployment: require("AZURE_OAI_DEPLOYMENT")?,
                api_version: require("AZURE_OAI_API_VERSION")?,
            }
        } else if let Some(api_key) = get("OPENAI_API_KEY") {
            Provider::OpenAI {
                api_key,
                model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            }
        } else {
            anyhow::bail!(
                "no model credentials: set AZURE_OAI_KEY (plus AZURE_OAI_ENDPOINT, \
                 AZURE_OAI_DEPLOYMENT and AZURE_OAI_API_VERSION) or OPENAI_API_KEY"
            )
        };

        Ok(Self {
            provider,
            temperature: parse_temperature(get("MODEL_TEMPERATURE"))?,
            connection_string: get("MDB_CONNECTION_STRING")
                .unwrap_or_else(|| DEFAULT_CONNECTION_STRING.to_string()),
            max_steps: parse_max_steps(get("AGENT_MAX_STEPS"))?,
        })
    }

    /// Model identifier sent on each request (deployment name on Azure)
    pub fn model_name(&self) -> &str {
        match &self.provider {
            Provider::AzureOpenAI { deployment, .. } => deployment,
            Provider::OpenAI { model, .. } => model,
        }
    }

    pub fn provider_name(&self) -> &'static str {
        match &self.provider {
            Provider::AzureOpenAI { .. } => "azure-openai",
            Provider::OpenAI { .. } => "openai",
        }
    }

    pub fn provider_config(&self) -> ProviderConfig {
        match &self.provider {
            Provider::AzureOpenAI {
                api_key,
                endpoint,
                api_version,
                ..
            } => ProviderConfig::azure_openai(api_key.clone(), endpoint.clone(), api_version.clone()),
            Provider::OpenAI { api_key, .. } => ProviderConfig::openai(api_key.clone()),
        }
    }

    /// Arguments for spawning the MongoDB bridge subprocess
    pub fn bridge_args(&self) -> Vec<String> {
        vec![
            "-y".to_string(),
            "mongodb-mcp-server".to_string(),
            "--connectionString".to_string(),
            self.connection_string.clone(),
        ]
    }
}

fn parse_temperature(raw: Option<String>) -> Result<Option<f32>> {
    match raw {
        Some(raw) => {
            let value = raw
                .trim()
                .parse::<f32>()
                .with_context(|| format!("MODEL_TEMPERATURE must be a number, got '{}'", raw))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

fn parse_max_steps(raw: Option<String>) -> Result<usize> {
    match raw {
        Some(raw) => {
            let value = raw.trim().parse::<usize>().with_context(|| {
                format!("AGENT_MAX_STEPS must be a positive integer, got '{}'", raw)
            })?;
            if value == 0 {
                anyhow::bail!("AGENT_MAX_STEPS must be at least 1");
            }
            Ok(value)
        }
        None => Ok(DEFAULT_MAX_STEPS),
    }
}

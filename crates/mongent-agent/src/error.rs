use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Agent exceeded the maximum of {0} reasoning steps")]
    MaxStepsExceeded(usize),

    #[error("Model returned neither content nor tool calls")]
    EmptyResponse,

    #[error(transparent)]
    Model(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AgentError>;

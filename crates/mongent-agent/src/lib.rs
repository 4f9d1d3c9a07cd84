pub mod agent;
pub mod answer;
pub mod error;
pub mod router;
pub mod state;

pub use agent::{Agent, AgentConfig, DEFAULT_MAX_STEPS};
pub use answer::{extract_answer, AgentOutcome};
pub use error::{AgentError, Result};
pub use router::{NextStep, ReactRouter, Router, Step};
pub use state::AgentState;

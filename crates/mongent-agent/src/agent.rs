use crate::answer::AgentOutcome;
use crate::error::{AgentError, Result};
use crate::router::{NextStep, ReactRouter, Router, Step};
use crate::state::AgentState;
use mongent_llm::{ChatClient, ChatOptions, ChatRequest, ChatResponse, Content, Message, Tool};
use mongent_mcp::ToolExecutor;
use std::sync::Arc;

pub const DEFAULT_MAX_STEPS: usize = 10;

/// Knobs for one agent instance, fixed at construction
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub model: String,
    pub temperature: Option<f32>,
    /// Upper bound on model calls per invocation
    pub max_steps: usize,
}

impl AgentConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: None,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }
}

/// Reasoning-and-acting loop over an injected model client and tool executor
///
/// The agent owns neither resource: both arrive constructed and shared, so
/// a single bridge subprocess and HTTP client serve every invocation.
pub struct Agent {
    client: Arc<dyn ChatClient>,
    executor: Arc<dyn ToolExecutor>,
    tools: Vec<Tool>,
    config: AgentConfig,
}

impl Agent {
    pub fn new(
        client: Arc<dyn ChatClient>,
        executor: Arc<dyn ToolExecutor>,
        tools: Vec<Tool>,
        config: AgentConfig,
    ) -> Self {
        Self {
            client,
            executor,
            tools,
            config,
        }
    }

    /// Answer one question, alternating model calls and tool executions
    ///
    /// Each invocation starts from a fresh transcript. The loop runs until
    /// the model answers without requesting tools, or `max_steps` model
    /// calls have been spent.
    pub async fn invoke(&self, question: &str) -> Result<AgentOutcome> {
        let mut state = AgentState::from_question(question);
        let router = ReactRouter;

        tracing::info!(
            run_id = %state.run_id,
            model = %self.config.model,
            "agent invocation started"
        );

        let mut model_calls = 0;
        let mut final_content: Option<String> = None;
        let mut current = Step::Model;

        loop {
            match current {
                Step::Model => {
                    if model_calls >= self.config.max_steps {
                        tracing::warn!(
                            run_id = %state.run_id,
                            max_steps = self.config.max_steps,
                            "agent stopped before reaching an answer"
                        );
                        return Err(AgentError::MaxStepsExceeded(self.config.max_steps));
                    }
                    model_calls += 1;

                    let response = self.call_model(&state).await?;

                    if response.has_tool_calls() {
                        let calls = response.tool_calls.unwrap_or_default();
                        state.add_message(Message::ai_with_tools(
                            response.content.map(Content::from),
                            calls,
                        ));
                    } else {
                        let text = response.content.ok_or(AgentError::EmptyResponse)?;
                        state.add_message(Message::ai(text.clone()));
                        final_content = Some(text);
                    }
                }
                Step::Tools => {
                    self.run_tools(&mut state).await;
                }
            }

            match router.next(&state, current) {
                NextStep::End => break,
                NextStep::Model => current = Step::Model,
                NextStep::Tools => current = Step::Tools,
            }
        }

        tracing::info!(run_id = %state.run_id, steps = model_calls, "agent invocation finished");

        Ok(AgentOutcome {
            content: final_content,
            messages: state.messages,
            steps: model_calls,
        })
    }

    async fn call_model(&self, state: &AgentState) -> Result<ChatResponse> {
        let mut options = ChatOptions::new().tools(self.tools.clone());
        if let Some(temperature) = self.config.temperature {
            options = options.temperature(temperature);
        }

        let request = ChatRequest::new(self.config.model.as_str(), state.messages.clone())
            .with_options(options);

        let response = self.client.chat(request).await?;

        if let Some(usage) = &response.usage {
            tracing::debug!(
                run_id = %state.run_id,
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "model call completed"
            );
        }

        Ok(response)
    }

    /// Execute every pending tool call and append the results
    ///
    /// A failed execution becomes an error-text tool message the model can
    /// react to; it never aborts the invocation and is never retried.
    async fn run_tools(&self, state: &mut AgentState) {
        for call in state.get_pending_tool_calls() {
            tracing::debug!(
                run_id = %state.run_id,
                tool = %call.function.name,
                call_id = %call.id,
                "executing tool"
            );

            let result = match self
                .executor
                .execute(&call.function.name, &call.function.arguments)
                .await
            {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!(
                        run_id = %state.run_id,
                        tool = %call.function.name,
                        error = %e,
                        "tool execution failed"
                    );
                    format!("Tool execution failed: {}", e)
                }
            };

            state.add_tool_result(call.id, result);
        }
    }
}

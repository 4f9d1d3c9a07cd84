use crate::state::AgentState;

/// Step the loop is currently executing
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    Model,
    Tools,
}

/// Where the loop goes after the current step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NextStep {
    Model,
    Tools,
    End,
}

/// Decides which step to execute next based on current state
pub trait Router: Send + Sync {
    fn next(&self, state: &AgentState, current: Step) -> NextStep;
}

/// Reasoning-and-acting pattern:
/// model -> tools (if tool calls requested) -> model -> end
pub struct ReactRouter;

impl Router for ReactRouter {
    fn next(&self, state: &AgentState, current: Step) -> NextStep {
        match current {
            Step::Model => {
                if state.has_pending_tool_calls() {
                    NextStep::Tools
                } else {
                    NextStep::End
                }
            }
            // Tool results always go back to the model
            Step::Tools => NextStep::Model,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongent_llm::types::{FunctionCall, ToolCall};
    use mongent_llm::Message;

    #[test]
    fn test_plain_answer_ends_the_loop() {
        let mut state = AgentState::from_question("How many users are registered?");
        state.add_message(Message::ai("There are 128 registered users."));

        let next = ReactRouter.next(&state, Step::Model);
        assert_eq!(next, NextStep::End);
    }

    #[test]
    fn test_tool_calls_route_to_tools_then_back_to_model() {
        let mut state = AgentState::from_question("How many users are registered?");
        state.add_message(Message::ai_with_tools(
            None,
            vec![ToolCall {
                id: "call_1".to_string(),
                tool_type: "function".to_string(),
                function: FunctionCall {
                    name: "count".to_string(),
                    arguments: r#"{"collection":"users"}"#.to_string(),
                },
            }],
        ));

        assert_eq!(ReactRouter.next(&state, Step::Model), NextStep::Tools);

        state.add_tool_result("call_1".to_string(), "128".to_string());
        assert_eq!(ReactRouter.next(&state, Step::Tools), NextStep::Model);
    }
}

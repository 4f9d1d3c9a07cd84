use mongent_llm::{Content, Message, ToolCall};

/// Transcript of one agent invocation
///
/// Every question starts a fresh transcript; nothing carries over between
/// REPL turns. The `run_id` ties log lines from one invocation together.
#[derive(Debug, Clone)]
pub struct AgentState {
    pub run_id: String,
    pub messages: Vec<Message>,
}

impl AgentState {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            messages,
        }
    }

    pub fn from_question(question: impl Into<Content>) -> Self {
        Self::new(vec![Message::human(question)])
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn has_pending_tool_calls(&self) -> bool {
        match self.last_message() {
            Some(message) => message.has_tool_calls(),
            None => false,
        }
    }

    pub fn get_pending_tool_calls(&self) -> Vec<ToolCall> {
        match self.last_message() {
            Some(Message::AI {
                tool_calls: Some(calls),
                ..
            }) => calls.clone(),
            _ => Vec::new(),
        }
    }

    pub fn add_tool_result(&mut self, tool_call_id: String, result: String) {
        self.messages.push(Message::tool_result(tool_call_id, result));
    }
}

use mongent_llm::Message;

/// Result of one completed agent invocation
#[derive(Debug, Clone)]
pub struct AgentOutcome {
    /// Final content of the last model response, if it produced any
    pub content: Option<String>,
    /// Full transcript, question included
    pub messages: Vec<Message>,
    /// Number of model calls the invocation took
    pub steps: usize,
}

/// Extract the printable answer from an outcome
///
/// Strategies are tried in order: the outcome's own final content, then
/// the most recent transcript message carrying non-empty text, then the
/// raw representation of the whole outcome so the user never gets a blank
/// line back.
pub fn extract_answer(outcome: &AgentOutcome) -> String {
    direct_content(outcome)
        .or_else(|| last_text_message(outcome))
        .unwrap_or_else(|| raw_outcome(outcome))
}

fn direct_content(outcome: &AgentOutcome) -> Option<String> {
    non_empty(outcome.content.as_deref())
}

fn last_text_message(outcome: &AgentOutcome) -> Option<String> {
    outcome
        .messages
        .iter()
        .rev()
        .find_map(|message| non_empty(message.content_text()))
}

fn raw_outcome(outcome: &AgentOutcome) -> String {
    format!("{:?}", outcome)
}

fn non_empty(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

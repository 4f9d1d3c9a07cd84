use anyhow::Result;
use mongent_agent::{extract_answer, Agent};
use std::future::Future;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

pub const BANNER: &str = "MongoDB Agent REPL. Type your questions. Press Ctrl+C to exit.";
pub const PROMPT: &str = "Ask MongoDB Agent > ";

/// Read questions line by line until stdin closes or Ctrl+C arrives
///
/// Answers go to stdout, per-question failures to stderr; a failed
/// question never ends the loop.
pub async fn run(agent: &Agent) -> Result<()> {
    run_loop(
        agent,
        BufReader::new(tokio::io::stdin()),
        tokio::signal::ctrl_c(),
    )
    .await
}

/// The loop itself, over any line source and interrupt signal
///
/// A single interrupt future is armed before the first prompt and stays
/// registered for the life of the loop. It is raced against the line read
/// and against the agent invocation, so Ctrl+C lands whether the REPL is
/// waiting for input or a question is still processing, and both exits
/// share the shutdown path that lets the caller close the bridge.
async fn run_loop<F>(agent: &Agent, reader: impl AsyncBufRead + Unpin, interrupt: F) -> Result<()>
where
    F: Future,
{
    println!("{}", BANNER);

    let mut lines = reader.lines();
    tokio::pin!(interrupt);

    loop {
        print!("{}", PROMPT);
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = &mut interrupt => {
                println!();
                tracing::info!("interrupt received, shutting down");
                break;
            }
        };

        let line = match line {
            Some(line) => line,
            None => break,
        };

        let question = match question_of(&line) {
            Some(question) => question,
            None => continue,
        };

        let result = tokio::select! {
            result = agent.invoke(question) => result,
            _ = &mut interrupt => {
                println!();
                tracing::info!("interrupt received, abandoning question");
                break;
            }
        };

        match result {
            Ok(outcome) => println!("{}", extract_answer(&outcome)),
            Err(e) => eprintln!("Error from agent: {}", e),
        }
    }

    Ok(())
}

/// The question contained in one raw input line, if any
fn question_of(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mongent_agent::AgentConfig;
    use mongent_llm::{ChatClient, ChatRequest, ChatResponse};
    use mongent_mcp::ToolExecutor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Notify;

    struct NoTools;

    #[async_trait]
    impl ToolExecutor for NoTools {
        async fn execute(&self, tool_name: &str, _arguments: &str) -> anyhow::Result<String> {
            anyhow::bail!("Tool '{}' not found", tool_name)
        }

        fn list_tools(&self) -> Vec<String> {
            Vec::new()
        }
    }

    /// Counts calls and either answers instantly or hangs forever,
    /// signalling `started` once the call is in flight
    struct StubClient {
        calls: AtomicUsize,
        started: Arc<Notify>,
        hang: bool,
    }

    impl StubClient {
        fn answering() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                started: Arc::new(Notify::new()),
                hang: false,
            })
        }

        fn hanging(started: Arc<Notify>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                started,
                hang: true,
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChatClient for StubClient {
        async fn chat(&self, _request: ChatRequest) -> anyhow::Result<ChatResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.started.notify_one();
            if self.hang {
                std::future::pending::<()>().await;
            }
            Ok(ChatResponse {
                content: Some("There are 3 databases.".to_string()),
                tool_calls: None,
                usage: None,
                finish_reason: Some("stop".to_string()),
                raw: serde_json::Value::Null,
            })
        }
    }

    /// Fails the first call, answers afterwards
    struct FlakyClient {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ChatClient for FlakyClient {
        async fn chat(&self, _request: ChatRequest) -> anyhow::Result<ChatResponse> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                anyhow::bail!("OpenAI API error (500): upstream failure");
            }
            Ok(ChatResponse {
                content: Some("There are 3 databases.".to_string()),
                tool_calls: None,
                usage: None,
                finish_reason: Some("stop".to_string()),
                raw: serde_json::Value::Null,
            })
        }
    }

    fn agent_over(client: Arc<StubClient>) -> Agent {
        Agent::new(
            client,
            Arc::new(NoTools),
            Vec::new(),
            AgentConfig::new("gpt-4o"),
        )
    }

    #[test]
    fn test_prompt_and_banner_are_stable() {
        assert_eq!(PROMPT, "Ask MongoDB Agent > ");
        assert!(BANNER.starts_with("MongoDB Agent REPL"));
    }

    #[test]
    fn test_blank_lines_carry_no_question() {
        assert_eq!(question_of(""), None);
        assert_eq!(question_of("   "), None);
        assert_eq!(question_of("\t"), None);
    }

    #[test]
    fn test_questions_are_trimmed() {
        assert_eq!(
            question_of("  How many orders are there?  "),
            Some("How many orders are there?")
        );
    }

    #[tokio::test]
    async fn test_questions_flow_until_end_of_input() {
        let client = StubClient::answering();
        let agent = agent_over(client.clone());

        let input = &b"How many databases are there?\n\nHow many users are there?\n"[..];
        let result = run_loop(&agent, BufReader::new(input), std::future::pending::<()>()).await;

        assert!(result.is_ok());
        // Two questions, one blank line skipped, then EOF ends the loop
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_question_does_not_end_the_loop() {
        let client = Arc::new(FlakyClient {
            calls: AtomicUsize::new(0),
        });
        let agent = Agent::new(
            client.clone(),
            Arc::new(NoTools),
            Vec::new(),
            AgentConfig::new("gpt-4o"),
        );

        let input = &b"first question\nsecond question\n"[..];
        let result = run_loop(&agent, BufReader::new(input), std::future::pending::<()>()).await;

        assert!(result.is_ok());
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_interrupt_while_reading_stops_the_loop() {
        let client = StubClient::answering();
        let agent = agent_over(client.clone());

        // A line source that never yields, as an idle prompt does
        let (_keep_open, input) = tokio::io::duplex(64);

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            run_loop(&agent, BufReader::new(input), async {}),
        )
        .await
        .expect("interrupt should stop an idle loop");

        assert!(result.is_ok());
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_interrupt_during_processing_stops_the_loop() {
        let started = Arc::new(Notify::new());
        let client = StubClient::hanging(started.clone());
        let agent = agent_over(client.clone());

        // The model call never returns; the interrupt fires only once the
        // question is in flight, as Ctrl+C against a hung endpoint would
        let interrupt = {
            let started = started.clone();
            async move { started.notified().await }
        };

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            run_loop(
                &agent,
                BufReader::new(&b"count all documents\n"[..]),
                interrupt,
            ),
        )
        .await
        .expect("interrupt should stop a hung question");

        assert!(result.is_ok());
        assert_eq!(client.call_count(), 1);
    }
}

//! The read-eval-print loop.
//!
//! `AwaitingInput → Dispatching → AwaitingInput`, until "exit" (or end of
//! input) moves it to `Terminated`. A failed question never ends the loop.

use anyhow::Result;
use mathagent_tool_runtime::{Agent, AgenticLoop, AgenticLoopError};
use std::io::{BufRead, Write};
use tracing::{error, info, warn};

use crate::terminal::{Input, Terminal};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplState {
    AwaitingInput,
    Dispatching(String),
    Terminated,
}

pub struct Repl<'a, R, W> {
    agent: &'a Agent,
    agentic_loop: &'a AgenticLoop,
    terminal: Terminal<R, W>,
}

impl<'a, R: BufRead, W: Write> Repl<'a, R, W> {
    pub fn new(agent: &'a Agent, agentic_loop: &'a AgenticLoop, terminal: Terminal<R, W>) -> Self {
        Self {
            agent,
            agentic_loop,
            terminal,
        }
    }

    /// Drive the state machine until the user exits.
    pub async fn run(&mut self) -> Result<()> {
        let mut state = ReplState::AwaitingInput;
        while state != ReplState::Terminated {
            state = self.step(state).await?;
        }
        Ok(())
    }

    /// Perform one transition. Only terminal I/O failures are returned as errors.
    pub async fn step(&mut self, state: ReplState) -> Result<ReplState> {
        match state {
            ReplState::AwaitingInput => match self.terminal.read_input()? {
                Input::Query(query) => Ok(ReplState::Dispatching(query)),
                Input::Blank => Ok(ReplState::AwaitingInput),
                Input::Exit => {
                    self.terminal.print_farewell()?;
                    Ok(ReplState::Terminated)
                }
            },
            ReplState::Dispatching(query) => {
                self.dispatch(query).await?;
                Ok(ReplState::AwaitingInput)
            }
            ReplState::Terminated => Ok(ReplState::Terminated),
        }
    }

    async fn dispatch(&mut self, query: String) -> Result<()> {
        match self.agentic_loop.run(self.agent, query).await {
            Ok(result) => {
                info!(
                    iterations = result.iterations,
                    tool_calls = result.steps.len(),
                    total_tokens = result.usage.map(|u| u.total()),
                    "Question answered"
                );
                for step in &result.steps {
                    self.terminal.print_tool_step(step)?;
                }
                self.terminal.print_answer(&result.final_output)?;
            }
            Err(e) => {
                match &e {
                    AgenticLoopError::LlmError(_) => error!(error = %e, "Remote call failed"),
                    AgenticLoopError::MaxIterations(_) | AgenticLoopError::EmptyResponse => {
                        warn!(error = %e, "Question not answered")
                    }
                }
                self.terminal.print_error(&e.to_string())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::PROMPT;
    use mathagent_tool_runtime::provider::mock::MockLlmProvider;
    use mathagent_tool_runtime::{LlmError, ToolAwareLlmProvider};
    use serde_json::json;
    use std::sync::Arc;

    fn setup() -> (Agent, AgenticLoop, Arc<MockLlmProvider>) {
        let provider = Arc::new(MockLlmProvider::new());
        let agentic_loop = AgenticLoop::new(provider.clone() as Arc<dyn ToolAwareLlmProvider>);
        (Agent::math_assistant().unwrap(), agentic_loop, provider)
    }

    async fn run_session(input: &str, agent: &Agent, agentic_loop: &AgenticLoop) -> String {
        let mut out = Vec::new();
        let terminal = Terminal::new(input.as_bytes(), &mut out);
        Repl::new(agent, agentic_loop, terminal).run().await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_exit_terminates_without_dispatch() {
        let (agent, agentic_loop, provider) = setup();

        let out = run_session("exit\nWhat is 1 + 1?\n", &agent, &agentic_loop).await;

        assert!(out.ends_with("Goodbye!\n"));
        assert_eq!(out.matches(PROMPT).count(), 1);
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_multiply_answer() {
        let (agent, agentic_loop, provider) = setup();
        provider.queue_tool_call("call_1", "multiply", json!({"a": 6, "b": 9}));
        provider.queue_text("6 * 9 = 54");

        let out = run_session("What is 6 * 9?\nexit\n", &agent, &agentic_loop).await;

        assert!(out.contains(r#"[tool: multiply({"a":6,"b":9}) = 54]"#));
        assert!(out.contains("6 * 9 = 54"));
        assert!(out.ends_with("Goodbye!\n"));
    }

    #[tokio::test]
    async fn test_error_reprompts() {
        let (agent, agentic_loop, provider) = setup();
        provider.queue_tool_call("call_1", "divide", json!({"a": 10, "b": 0}));
        provider.queue_error(LlmError::NetworkError("connection reset".to_string()));
        provider.queue_text("2");

        let out = run_session(
            "What is 10 divided by 0?\nWhat is 1 + 1?\nEXIT\n",
            &agent,
            &agentic_loop,
        )
        .await;

        assert_eq!(provider.requests().len(), 3);
        assert!(out.contains(
            "Error: LLM error: Network error: connection reset. Try a different question"
        ));
        // Prompted again after the failure and answered the next question
        assert_eq!(out.matches(PROMPT).count(), 3);
        assert!(out.contains("Answer: "));
        assert!(out.ends_with("Goodbye!\n"));
    }

    #[tokio::test]
    async fn test_blank_lines_and_eof() {
        let (agent, agentic_loop, provider) = setup();

        let out = run_session("\n   \n", &agent, &agentic_loop).await;

        assert_eq!(out.matches(PROMPT).count(), 3);
        assert!(out.ends_with("Goodbye!\n"));
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_step_transitions() {
        let (agent, agentic_loop, provider) = setup();
        provider.queue_text("4");
        let mut out = Vec::new();
        let terminal = Terminal::new("2 + 2\n".as_bytes(), &mut out);
        let mut repl = Repl::new(&agent, &agentic_loop, terminal);

        let state = repl.step(ReplState::AwaitingInput).await.unwrap();
        assert_eq!(state, ReplState::Dispatching("2 + 2".to_string()));
        let state = repl.step(state).await.unwrap();
        assert_eq!(state, ReplState::AwaitingInput);
        let state = repl.step(state).await.unwrap();
        assert_eq!(state, ReplState::Terminated);
        assert_eq!(
            repl.step(ReplState::Terminated).await.unwrap(),
            ReplState::Terminated
        );
    }
}

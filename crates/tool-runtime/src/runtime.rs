use crate::agent::Agent;
use crate::conversation::{AssistantContent, Conversation};
use crate::provider::{LlmError, ToolAwareLlmProvider, Usage};
use crate::tool::{ToolCall, ToolResult};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The core agentic loop that orchestrates LLM ↔ Tool execution.
///
/// Flow: User → LLM → ToolCalls → Execute → Results → LLM → ... → Final Text
pub struct AgenticLoop {
    provider: Arc<dyn ToolAwareLlmProvider>,
    max_iterations: usize,
    temperature: f32,
    max_tokens: u32,
}

/// A tool call made during a turn together with what it returned.
#[derive(Debug, Clone)]
pub struct ToolStep {
    pub call: ToolCall,
    pub result: ToolResult,
}

/// Outcome of a successfully dispatched turn.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// The model's final text answer
    pub final_output: String,
    /// Tool executions in the order they happened
    pub steps: Vec<ToolStep>,
    /// Number of provider requests made
    pub iterations: usize,
    /// Summed token usage, when the provider reports it
    pub usage: Option<Usage>,
}

impl AgenticLoop {
    pub fn new(provider: Arc<dyn ToolAwareLlmProvider>) -> Self {
        Self {
            provider,
            max_iterations: 10,
            temperature: 0.0,
            max_tokens: 4096,
        }
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = temp;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = max;
        self
    }

    /// Run a single user query through the agentic loop.
    ///
    /// Every call starts from an empty conversation seeded with the
    /// agent's instructions; nothing carries over between queries.
    pub async fn run(&self, agent: &Agent, query: String) -> Result<RunResult, AgenticLoopError> {
        let mut conversation =
            Conversation::new().with_system_prompt(agent.instructions().to_string());
        conversation.add_user_message(query);

        let tools = agent.tool_definitions();
        let mut steps = Vec::new();
        let mut usage: Option<Usage> = None;

        for iteration in 0..self.max_iterations {
            debug!(
                iteration,
                agent = agent.name(),
                provider = self.provider.provider_name(),
                "Starting agentic loop iteration"
            );

            let completion = self
                .provider
                .complete_with_tools(
                    conversation.messages().to_vec(),
                    conversation.system_prompt().map(String::from),
                    tools.clone(),
                    self.temperature,
                    self.max_tokens,
                )
                .await?;

            if let Some(reported) = completion.usage {
                *usage.get_or_insert_with(Usage::default) += reported;
            }

            let tool_calls = completion.tool_calls;
            conversation.add_assistant_response(AssistantContent {
                text: completion.text.clone(),
                tool_calls: tool_calls.clone(),
            });

            // Some OpenAI-compatible backends report "stop" alongside tool
            // calls, so only the presence of calls keeps the loop going.
            if tool_calls.is_empty() {
                info!(iteration, stop_reason = ?completion.stop_reason, "Agentic loop complete");
                let final_output = completion
                    .text
                    .filter(|t| !t.trim().is_empty())
                    .ok_or(AgenticLoopError::EmptyResponse)?;
                return Ok(RunResult {
                    final_output,
                    steps,
                    iterations: iteration + 1,
                    usage,
                });
            }

            info!(count = tool_calls.len(), "Executing tool calls");
            for call in tool_calls {
                let result = self.execute_tool_call(agent, &call).await;
                conversation.add_tool_result(result.clone());
                steps.push(ToolStep { call, result });
            }
        }

        Err(AgenticLoopError::MaxIterations(self.max_iterations))
    }

    async fn execute_tool_call(&self, agent: &Agent, call: &ToolCall) -> ToolResult {
        let Some(tool) = agent.tools().get(&call.name) else {
            warn!(tool = %call.name, "Model requested unknown tool");
            return ToolResult::error(&call.id, format!("Unknown tool: {}", call.name));
        };

        match tool.execute(call.input.clone()).await {
            Ok(mut result) => {
                debug!(tool = %call.name, content = %result.content, "Tool succeeded");
                result.tool_call_id = call.id.clone();
                result
            }
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Tool failed");
                ToolResult::error(&call.id, e)
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AgenticLoopError {
    #[error("LLM error: {0}")]
    LlmError(#[from] LlmError),
    #[error("Max iterations ({0}) exceeded")]
    MaxIterations(usize),
    #[error("Model returned an empty response")]
    EmptyResponse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::ConversationMessage;
    use crate::provider::mock::MockLlmProvider;
    use crate::provider::Completion;
    use serde_json::json;

    fn setup_test_loop() -> (AgenticLoop, Arc<MockLlmProvider>, Agent) {
        let provider = Arc::new(MockLlmProvider::new());
        let agentic_loop = AgenticLoop::new(provider.clone() as Arc<dyn ToolAwareLlmProvider>);
        (agentic_loop, provider, Agent::math_assistant().unwrap())
    }

    fn tool_results(messages: &[ConversationMessage]) -> Vec<ToolResult> {
        messages
            .iter()
            .filter_map(|m| match m {
                ConversationMessage::ToolResult(r) => Some(r.clone()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_simple_text_response() {
        let (agentic_loop, provider, agent) = setup_test_loop();
        provider.queue_text("Hello, I can do math!");

        let result = agentic_loop.run(&agent, "Hello".to_string()).await.unwrap();

        assert_eq!(result.final_output, "Hello, I can do math!");
        assert_eq!(result.iterations, 1);
        assert!(result.steps.is_empty());
        assert_eq!(provider.requests()[0].len(), 1);
    }

    #[tokio::test]
    async fn test_multiply_round_trip() {
        let (agentic_loop, provider, agent) = setup_test_loop();
        provider.queue_tool_call("call_1", "multiply", json!({"a": 6, "b": 9}));
        provider.queue_text("6 * 9 = 54");

        let result = agentic_loop
            .run(&agent, "What is 6 * 9?".to_string())
            .await
            .unwrap();

        assert!(result.final_output.contains("54"));
        assert_eq!(result.iterations, 2);
        assert_eq!(result.steps.len(), 1);
        assert_eq!(result.steps[0].call.name, "multiply");
        assert_eq!(result.steps[0].result.content, "54");
        assert_eq!(result.steps[0].result.tool_call_id, "call_1");

        // Second request carries: user, assistant (tool call), tool result
        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].len(), 3);
        assert_eq!(tool_results(&requests[1])[0].content, "54");
    }

    #[tokio::test]
    async fn test_domain_error_goes_back_to_model() {
        let (agentic_loop, provider, agent) = setup_test_loop();
        provider.queue_tool_call("call_1", "divide", json!({"a": 10, "b": 0}));
        provider.queue_text("Division by zero is undefined.");

        let result = agentic_loop
            .run(&agent, "What is 10 divided by 0?".to_string())
            .await
            .unwrap();

        let step = &result.steps[0];
        assert!(step.result.is_error);
        assert_eq!(step.result.content, "Tool error: Cannot divide by zero.");
        assert!(tool_results(&provider.requests()[1])[0].is_error);
    }

    #[tokio::test]
    async fn test_unknown_tool_and_bad_input() {
        let (agentic_loop, provider, agent) = setup_test_loop();
        provider.queue_response(Completion::tool_calls(vec![
            ToolCall {
                id: "a".to_string(),
                name: "power".to_string(),
                input: json!({"a": 2, "b": 8}),
            },
            ToolCall {
                id: "b".to_string(),
                name: "add".to_string(),
                input: json!({"a": 2}),
            },
        ]));
        provider.queue_text("I could not compute that.");

        let result = agentic_loop.run(&agent, "2 ** 8?".to_string()).await.unwrap();

        assert_eq!(result.steps.len(), 2);
        assert_eq!(result.steps[0].result.content, "Tool error: Unknown tool: power");
        assert!(result.steps[1].result.is_error);
        assert!(result.steps[1].result.content.starts_with("Tool error: Invalid input"));
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let (agentic_loop, provider, agent) = setup_test_loop();
        provider.queue_error(LlmError::AuthError("API key not valid".to_string()));

        let err = agentic_loop.run(&agent, "1 + 1".to_string()).await.unwrap_err();
        assert!(matches!(err, AgenticLoopError::LlmError(LlmError::AuthError(_))));
    }

    #[tokio::test]
    async fn test_max_iterations() {
        let (agentic_loop, provider, agent) = setup_test_loop();
        let agentic_loop = agentic_loop.with_max_iterations(2);
        for i in 0..3 {
            provider.queue_tool_call(&format!("call_{i}"), "add", json!({"a": i, "b": 1}));
        }

        let err = agentic_loop.run(&agent, "loop".to_string()).await.unwrap_err();
        assert!(matches!(err, AgenticLoopError::MaxIterations(2)));
    }

    #[tokio::test]
    async fn test_empty_response() {
        let (agentic_loop, provider, agent) = setup_test_loop();
        provider.queue_text("   ");

        let err = agentic_loop.run(&agent, "?".to_string()).await.unwrap_err();
        assert!(matches!(err, AgenticLoopError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_usage_is_summed() {
        let (agentic_loop, provider, agent) = setup_test_loop();
        let mut first = Completion::tool_calls(vec![ToolCall {
            id: "call_1".to_string(),
            name: "gcd".to_string(),
            input: json!({"a": 12, "b": 18}),
        }]);
        first.usage = Some(Usage {
            prompt_tokens: 100,
            completion_tokens: 10,
        });
        let mut second = Completion::text("The GCD is 6.");
        second.usage = Some(Usage {
            prompt_tokens: 120,
            completion_tokens: 8,
        });
        provider.queue_response(first);
        provider.queue_response(second);

        let result = agentic_loop.run(&agent, "gcd(12, 18)?".to_string()).await.unwrap();
        assert_eq!(result.usage.map(|u| u.total()), Some(238));
    }
}

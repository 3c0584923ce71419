use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::durable::{Context, FunctionFuture};
use crate::llm::{CompletionRequest, Message, SharedAiClient, ToolSchema};

pub const RESEARCH: &str = "research";
pub const AI_CLIENT: &str = "aiclient";

const MAX_ROUNDS: usize = 5;
const MAX_DEPTH: u32 = 3;

const SYSTEM_PROMPT: &str = "You are a research assistant. Answer the topic you are given with a concise, \
factual summary. When a topic is broad and the research tool is available, split it into narrower \
subtopics and call the tool once per subtopic, then combine what comes back into one summary.";

#[derive(Debug, Deserialize)]
struct ResearchArgs {
    topic: String,
    #[serde(default = "default_depth")]
    depth: u32,
}

fn default_depth() -> u32 {
    1
}

/// Researches `args.topic`, fanning out to child `research` invocations
/// while `args.depth` allows it.
pub fn research(ctx: Context, args: Value) -> FunctionFuture {
    Box::pin(async move {
        let args: ResearchArgs = serde_json::from_value(args).map_err(|err| format!("invalid args: {}", err))?;
        if args.topic.trim().is_empty() {
            return Err("topic required".to_string());
        }
        if args.depth > MAX_DEPTH {
            return Err(format!("depth must be at most {}", MAX_DEPTH));
        }
        let client = ctx
            .dependency::<SharedAiClient>(AI_CLIENT)
            .ok_or_else(|| format!("dependency not registered: {}", AI_CLIENT))?;

        info!(id = ctx.id(), func = ctx.func(), topic = %args.topic, depth = args.depth, "researching");

        let mut messages = vec![Message::system(SYSTEM_PROMPT), Message::user(&args.topic)];
        let tools = if args.depth > 0 { Some(vec![research_tool()]) } else { None };

        for _ in 0..MAX_ROUNDS {
            let response = client
                .complete(CompletionRequest {
                    messages: messages.clone(),
                    tools: tools.clone(),
                    ..Default::default()
                })
                .await
                .map_err(|err| {
                    warn!(id = ctx.id(), code = %err.code, retryable = err.retryable, "completion failed");
                    err.to_string()
                })?;

            if response.tool_calls.is_empty() {
                return Ok(json!({"topic": args.topic, "summary": response.content}));
            }

            messages.push(Message::assistant(&response.content));

            for call in response.tool_calls {
                let subtopic = call
                    .args
                    .get("topic")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();
                debug!(id = ctx.id(), %subtopic, "delegating subtopic");
                let content = match ctx
                    .run(RESEARCH, json!({"topic": subtopic, "depth": args.depth.saturating_sub(1)}))
                    .await
                {
                    Ok(value) => format!("Research on {}: {}", subtopic, render_summary(&value)),
                    Err(err) => format!("Research on {} failed: {}", subtopic, err),
                };
                messages.push(Message::user(&content));
            }
        }

        Err("max iterations reached".to_string())
    })
}

fn research_tool() -> ToolSchema {
    ToolSchema {
        name: RESEARCH.to_string(),
        description: "Research a narrower subtopic and return a summary.".to_string(),
        parameters: Some(json!({
            "type": "object",
            "properties": {
                "topic": {"type": "string", "description": "The subtopic to research"}
            },
            "required": ["topic"]
        })),
    }
}

fn render_summary(value: &Value) -> String {
    match value.get("summary").and_then(|v| v.as_str()) {
        Some(summary) => summary.to_string(),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::durable::{Durable, PromiseState, PromiseStore};
    use crate::llm::{LLMResponse, ProviderAdapter, ProviderError, ToolCall};

    /// Replies from a script and remembers what it was asked.
    struct Scripted {
        replies: Mutex<VecDeque<LLMResponse>>,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl Scripted {
        fn new(replies: Vec<LLMResponse>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ProviderAdapter for Scripted {
        async fn complete(&self, request: CompletionRequest) -> Result<LLMResponse, ProviderError> {
            self.seen.lock().unwrap().push(request);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| ProviderError::new("api_error", "script exhausted", false))
        }
    }

    fn text(content: &str) -> LLMResponse {
        LLMResponse {
            content: content.to_string(),
            tool_calls: vec![],
            raw: None,
        }
    }

    fn calls(topics: &[&str]) -> LLMResponse {
        LLMResponse {
            content: String::new(),
            tool_calls: topics
                .iter()
                .map(|topic| ToolCall {
                    name: RESEARCH.to_string(),
                    args: json!({"topic": topic}),
                })
                .collect(),
            raw: None,
        }
    }

    fn durable(client: Arc<Scripted>) -> Durable {
        let shared: SharedAiClient = client;
        Durable::builder(Arc::new(PromiseStore::new()))
            .dependency(AI_CLIENT, shared)
            .register(RESEARCH, Arc::new(research))
            .unwrap()
            .build()
    }

    #[tokio::test]
    async fn leaf_topic_is_answered_without_tools() {
        let client = Scripted::new(vec![text("tides follow the moon")]);
        let durable = durable(client.clone());

        let promise = durable
            .invoke(Some("r".into()), RESEARCH, json!({"topic": "tides", "depth": 0}))
            .await
            .unwrap();
        assert_eq!(promise.state, PromiseState::Resolved);
        assert_eq!(
            promise.value,
            Some(json!({"topic": "tides", "summary": "tides follow the moon"}))
        );
        assert!(client.seen.lock().unwrap()[0].tools.is_none());
    }

    #[tokio::test]
    async fn subtopics_run_as_child_promises() {
        let client = Scripted::new(vec![
            calls(&["moon", "sun"]),
            text("moon pulls water"),
            text("sun adds a little"),
            text("combined"),
        ]);
        let durable = durable(client.clone());

        let promise = durable
            .invoke(Some("r".into()), RESEARCH, json!({"topic": "tides"}))
            .await
            .unwrap();
        assert_eq!(promise.value.unwrap()["summary"], "combined");

        let child = durable.promise("r.1").unwrap();
        assert_eq!(child.args, json!({"topic": "moon", "depth": 0}));
        assert_eq!(child.value.unwrap()["summary"], "moon pulls water");
        assert_eq!(durable.promise("r.2").unwrap().value.unwrap()["summary"], "sun adds a little");

        let seen = client.seen.lock().unwrap();
        assert!(seen[0].tools.is_some());
        let last = seen.last().unwrap();
        assert!(last.messages.iter().any(|m| m.content == "Research on moon: moon pulls water"));
    }

    #[tokio::test]
    async fn missing_client_rejects() {
        let durable = Durable::builder(Arc::new(PromiseStore::new()))
            .register(RESEARCH, Arc::new(research))
            .unwrap()
            .build();
        let promise = durable.invoke(None, RESEARCH, json!({"topic": "tides"})).await.unwrap();
        assert_eq!(promise.state, PromiseState::Rejected);
        assert_eq!(promise.error.as_deref(), Some("dependency not registered: aiclient"));
    }

    #[tokio::test]
    async fn bad_args_and_provider_errors_reject() {
        let durable = durable(Scripted::new(vec![]));

        let promise = durable.invoke(None, RESEARCH, json!({"topic": " "})).await.unwrap();
        assert_eq!(promise.error.as_deref(), Some("topic required"));

        let promise = durable.invoke(None, RESEARCH, json!({"topic": "tides", "depth": 1000})).await.unwrap();
        assert_eq!(promise.error.as_deref(), Some("depth must be at most 3"));

        let promise = durable.invoke(None, RESEARCH, json!({"depth": 1})).await.unwrap();
        assert!(promise.error.unwrap().starts_with("invalid args"));

        let promise = durable.invoke(None, RESEARCH, json!({"topic": "tides"})).await.unwrap();
        assert_eq!(promise.error.as_deref(), Some("api_error: script exhausted"));
    }

    #[tokio::test]
    async fn endless_tool_calls_hit_the_round_limit() {
        let mut replies = Vec::new();
        for _ in 0..MAX_ROUNDS {
            replies.push(calls(&["again"]));
            replies.push(text("leaf"));
        }
        let durable = durable(Scripted::new(replies));

        let promise = durable.invoke(None, RESEARCH, json!({"topic": "loop"})).await.unwrap();
        assert_eq!(promise.error.as_deref(), Some("max iterations reached"));
    }
}

use super::*;
use crate::application::retrieval::RetrievalPipeline;
use crate::application::tooling::Toolbox;
use crate::domain::{MessageRole, SearchHit, ToolCall};
use crate::infrastructure::embedding::{EmbedError, Embedder, normalize};
use crate::infrastructure::index::JsonlIndex;
use crate::infrastructure::model::{ModelError, ModelProvider, ModelRequest, ModelResponse};
use crate::infrastructure::search::{SearchError, SearchProvider};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Mutex;

#[derive(Clone)]
struct ScriptedProvider {
    responses: Arc<Mutex<Vec<ModelResponse>>>,
    recordings: Arc<Mutex<Vec<ModelRequest>>>,
}

impl ScriptedProvider {
    fn new(responses: Vec<ModelResponse>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            recordings: Arc::new(Mutex::new(Vec::new())),
        }
    }

    async fn requests(&self) -> Vec<ModelRequest> {
        self.recordings.lock().await.clone()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        let mut recordings = self.recordings.lock().await;
        recordings.push(request);
        let mut responses = self.responses.lock().await;
        if responses.is_empty() {
            return Err(ModelError::invalid_response("scripted", "script exhausted"));
        }
        Ok(responses.remove(0))
    }
}

struct StubSearch;

#[async_trait]
impl SearchProvider for StubSearch {
    async fn search(
        &self,
        query: &str,
        _max_results: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        Ok(vec![SearchHit {
            title: format!("hit for {query}"),
            url: "https://example.com".into(),
            snippet: "snippet".into(),
        }])
    }
}

struct StubEmbedder;

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        Ok(texts.iter().map(|_| normalize(vec![1.0, 1.0])).collect())
    }
}

fn tool_call(name: &str, arguments: serde_json::Value) -> ToolCall {
    ToolCall::new(name, arguments)
}

fn text_response(content: &str) -> ModelResponse {
    ModelResponse {
        content: content.to_string(),
        tool_calls: Vec::new(),
    }
}

fn tool_response(content: &str, calls: Vec<ToolCall>) -> ModelResponse {
    ModelResponse {
        content: content.to_string(),
        tool_calls: calls,
    }
}

fn agent(provider: ScriptedProvider, config: AgentConfig) -> (Agent<ScriptedProvider>, TempDir) {
    let dir = TempDir::new().expect("tempdir");
    let index = Arc::new(JsonlIndex::open(&dir.path().join("index.jsonl")).expect("open index"));
    let pipeline = Arc::new(RetrievalPipeline::new(Arc::new(StubEmbedder), index));
    let toolbox = Toolbox::new(Arc::new(StubSearch), pipeline);
    (Agent::new(Arc::new(provider), toolbox, config), dir)
}

#[tokio::test]
async fn returns_final_answer_without_tools() {
    let provider = ScriptedProvider::new(vec![text_response("the answer")]);
    let (mut agent, _dir) = agent(provider.clone(), AgentConfig::new("llama"));

    let answer = agent.ask("hello world").await.expect("turn succeeds");
    assert_eq!(answer, "the answer");

    let records = provider.requests().await;
    assert_eq!(records.len(), 1);
    assert!(records[0].tools.is_some());
    assert!(
        records[0]
            .messages
            .iter()
            .any(|msg| msg.role == MessageRole::User && msg.content == "hello world")
    );
    assert_eq!(agent.history().last_assistant(), Some("the answer"));
}

#[tokio::test]
async fn executes_tool_calls_in_order_and_feeds_results_back() {
    let provider = ScriptedProvider::new(vec![
        tool_response(
            "",
            vec![
                tool_call("calculator", json!({"expression": "2 + 3"})),
                tool_call("frobnicate", json!({})),
            ],
        ),
        text_response("done"),
    ]);
    let (mut agent, _dir) = agent(provider.clone(), AgentConfig::new("llama"));

    let answer = agent.ask("compute").await.expect("turn succeeds");
    assert_eq!(answer, "done");

    let records = provider.requests().await;
    assert_eq!(records.len(), 2);

    // The second request sees both tool results, in issue order.
    let tool_messages: Vec<_> = records[1]
        .messages
        .iter()
        .filter(|msg| msg.role == MessageRole::Tool)
        .collect();
    assert_eq!(tool_messages.len(), 2);
    assert_eq!(tool_messages[0].name.as_deref(), Some("calculator"));
    assert!(tool_messages[0].content.contains("5"));
    assert_eq!(tool_messages[1].name.as_deref(), Some("frobnicate"));
    assert!(tool_messages[1].content.contains("error"));
}

#[tokio::test]
async fn iteration_budget_returns_best_effort_output() {
    let always_calling = |content: &str| {
        tool_response(
            content,
            vec![tool_call("calculator", json!({"expression": "1 + 1"}))],
        )
    };
    let provider = ScriptedProvider::new(vec![
        always_calling("still thinking"),
        always_calling("almost there"),
        // Never reached: the budget stops the loop first.
        text_response("unreachable"),
    ]);
    let mut config = AgentConfig::new("llama");
    config.max_iters = 2;
    let (mut agent, _dir) = agent(provider.clone(), config);

    let answer = agent.ask("loop forever").await.expect("turn succeeds");
    assert_eq!(answer, "almost there");
    assert_eq!(provider.requests().await.len(), 2);
    assert_eq!(agent.history().last_assistant(), Some("almost there"));
}

#[tokio::test]
async fn reflection_revises_the_draft() {
    let provider = ScriptedProvider::new(vec![
        text_response("draft answer"),
        text_response(r#"{"verdict":"revise","answer":"polished answer"}"#),
    ]);
    let mut config = AgentConfig::new("llama");
    config.reflection = true;
    let (mut agent, _dir) = agent(provider.clone(), config);

    let answer = agent.ask("question").await.expect("turn succeeds");
    assert_eq!(answer, "polished answer");
    assert_eq!(agent.history().last_assistant(), Some("polished answer"));

    // The critique exchange is stateless: fresh system prompt, no tools.
    let records = provider.requests().await;
    assert_eq!(records.len(), 2);
    assert!(records[1].tools.is_none());
    assert_eq!(records[1].messages.len(), 2);
    assert_eq!(records[1].messages[0].role, MessageRole::System);
    assert!(records[1].messages[1].content.contains("draft answer"));
}

#[tokio::test]
async fn reflection_keeps_the_draft_on_ok_verdict() {
    let provider = ScriptedProvider::new(vec![
        text_response("draft answer"),
        text_response(r#"{"verdict":"ok"}"#),
    ]);
    let mut config = AgentConfig::new("llama");
    config.reflection = true;
    let (mut agent, _dir) = agent(provider, config);

    let answer = agent.ask("question").await.expect("turn succeeds");
    assert_eq!(answer, "draft answer");
}

#[tokio::test]
async fn reflection_failure_keeps_the_draft() {
    // Script runs dry on the reflection call; the provider errors, the turn
    // still succeeds with the draft.
    let provider = ScriptedProvider::new(vec![text_response("draft answer")]);
    let mut config = AgentConfig::new("llama");
    config.reflection = true;
    let (mut agent, _dir) = agent(provider, config);

    let answer = agent.ask("question").await.expect("turn succeeds");
    assert_eq!(answer, "draft answer");
}

#[tokio::test]
async fn history_accumulates_across_turns() {
    let provider = ScriptedProvider::new(vec![
        text_response("first"),
        text_response("second"),
    ]);
    let (mut agent, _dir) = agent(provider.clone(), AgentConfig::new("llama"));

    agent.ask("one").await.expect("first turn");
    agent.ask("two").await.expect("second turn");

    let records = provider.requests().await;
    // The second request carries the whole prior exchange.
    assert!(
        records[1]
            .messages
            .iter()
            .any(|msg| msg.role == MessageRole::Assistant && msg.content == "first")
    );
    // system + user + assistant + user + assistant
    assert_eq!(agent.history().messages().len(), 5);
}

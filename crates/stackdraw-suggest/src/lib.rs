pub mod builder;
pub mod engine;
mod error;
pub mod parse;
pub mod prompt;
pub mod script;

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use stackdraw_core::fallback::fallback;
use stackdraw_core::{parse_graph, AiSettings, EdgeCheck, Graph, Tagged};
use tracing::{debug, error, info, warn};

use engine::{Completion, LlmClient, ModelClient};
pub use error::{Failure, PipelineError};

pub const EXPLANATION_BLOCKED: &str = "AI explanation was blocked or empty.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Generate,
    Modify,
    Explain,
    AgentPrompt,
    RepoScript,
}

/// What an operation does when the model gives it nothing usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Substitute the mock graph.
    Fallback,
    /// Report the failure (a fixed message for blocked output).
    Surface,
    /// Return a degraded artifact that announces itself as such.
    Degrade,
    /// No model involved.
    Infallible,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::Generate => "generate",
            Operation::Modify => "modify",
            Operation::Explain => "explain",
            Operation::AgentPrompt => "agent-prompt",
            Operation::RepoScript => "repo-script",
        }
    }

    pub fn failure_policy(self) -> FailurePolicy {
        match self {
            Operation::Generate | Operation::Modify => FailurePolicy::Fallback,
            Operation::Explain => FailurePolicy::Surface,
            Operation::RepoScript => FailurePolicy::Degrade,
            Operation::AgentPrompt => FailurePolicy::Infallible,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Upper bound on a single model call.
    pub model_timeout: Duration,
    /// Reject model graphs with dangling edges instead of pruning them.
    pub strict_edges: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            model_timeout: Duration::from_secs(120),
            strict_edges: false,
        }
    }
}

/// Turns descriptions into graphs and graphs into derived artifacts.
///
/// The model client is fixed at construction. `None` means the model was not
/// configured or failed to initialise; every request then takes the
/// fallback/unavailable path without retrying initialisation.
pub struct Pipeline {
    client: Option<Arc<dyn ModelClient>>,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(client: Option<Arc<dyn ModelClient>>, options: PipelineOptions) -> Self {
        Self { client, options }
    }

    /// Build the model client once from settings.
    pub fn from_settings(settings: &AiSettings, options: PipelineOptions) -> Self {
        if !stackdraw_core::ai_configured(settings) {
            warn!("AI model not configured; graphs will use the fallback and explain/script requests will be refused");
            return Self::new(None, options);
        }

        match LlmClient::from_settings(settings) {
            Ok(client) => {
                info!("AI model configured: {}", client.describe());
                Self::new(Some(Arc::new(client)), options)
            }
            Err(e) => {
                error!("failed to initialise AI model {} ({}): {}", settings.provider, settings.model, e);
                Self::new(None, options)
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Decode a caller-submitted graph. Dangling edges are kept; derived views prune them.
    pub fn graph_from_value(value: &Value) -> Result<Graph, PipelineError> {
        parse_graph(value, EdgeCheck::Keep).map_err(|e| PipelineError::InputInvalid(e.to_string()))
    }

    async fn invoke(&self, op: Operation, prompt: &str) -> Result<String, Failure> {
        let client = self.client.as_ref().ok_or(Failure::Unavailable)?;
        info!("[{}] sending prompt to {}", op.name(), client.describe());

        let completion = tokio::time::timeout(self.options.model_timeout, client.complete(prompt))
            .await
            .map_err(|_| {
                Failure::CallFailed(format!("timed out after {:?}", self.options.model_timeout))
            })?
            .map_err(|e| Failure::CallFailed(e.to_string()))?;

        match completion {
            Completion::Text(text) if text.trim().is_empty() => {
                Err(Failure::Blocked(Some("empty response".to_string())))
            }
            Completion::Text(text) => {
                debug!("[{}] raw model output:\n{}", op.name(), text);
                Ok(text)
            }
            Completion::Blocked { reason } => Err(Failure::Blocked(reason)),
        }
    }

    async fn produce_graph(&self, op: Operation, prompt: &str) -> Result<Graph, Failure> {
        let raw = self.invoke(op, prompt).await?;
        let value = parse::extract_json_object(&raw)?;
        let check = if self.options.strict_edges {
            EdgeCheck::Reject
        } else {
            EdgeCheck::Prune
        };
        Ok(parse_graph(&value, check)?)
    }

    /// Generate a fresh graph, or modify/replace `existing` when it has content.
    ///
    /// The result keeps its synthetic marker so callers can log it; strip it
    /// with [`Tagged::strip_marker`] before the graph leaves the process.
    pub async fn generate_graph(
        &self,
        description: &str,
        existing: Option<&Graph>,
    ) -> Result<Tagged, PipelineError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(PipelineError::InputInvalid("missing description".to_string()));
        }

        let (op, prompt) = match existing.filter(|g| !g.is_empty()) {
            Some(graph) => (Operation::Modify, prompt::modify_prompt(graph, description)?),
            None => (Operation::Generate, prompt::generate_prompt(description)),
        };

        match self.produce_graph(op, &prompt).await {
            Ok(graph) => {
                info!(
                    "[{}] graph ready ({} nodes, {} edges)",
                    op.name(),
                    graph.nodes.len(),
                    graph.edges.len()
                );
                Ok(Tagged::real(graph))
            }
            Err(failure) => {
                debug_assert_eq!(op.failure_policy(), FailurePolicy::Fallback);
                warn!("[{}] {}; using fallback graph", op.name(), failure);
                Ok(fallback())
            }
        }
    }

    pub async fn generate_or_modify(
        &self,
        description: &str,
        existing: Option<&Graph>,
    ) -> Result<Graph, PipelineError> {
        Ok(self.generate_graph(description, existing).await?.strip_marker())
    }

    /// Prose explanation of `graph` in light of the description that produced it.
    pub async fn explain(&self, graph: &Graph, original_prompt: &str) -> Result<String, PipelineError> {
        let original_prompt = original_prompt.trim();
        if original_prompt.is_empty() {
            return Err(PipelineError::InputInvalid("missing originalPrompt".to_string()));
        }

        let prompt = prompt::explain_prompt(&graph.pruned(), original_prompt)?;
        match self.invoke(Operation::Explain, &prompt).await {
            Ok(text) => Ok(text.trim().to_string()),
            Err(failure) => self.recover_text(Operation::Explain, failure),
        }
    }

    /// Markdown instructions for a builder agent. Deterministic; never calls the model.
    pub fn build_agent_prompt(&self, graph: &Graph, user_context: Option<&str>) -> String {
        let markdown = builder::agent_prompt(graph, user_context);
        info!(
            "[{}] built {} bytes for {} nodes",
            Operation::AgentPrompt.name(),
            markdown.len(),
            graph.nodes.len()
        );
        markdown
    }

    /// Bash script that scaffolds the project described by `graph`.
    pub async fn build_repo_script(
        &self,
        graph: &Graph,
        user_context: Option<&str>,
    ) -> Result<String, PipelineError> {
        let graph = graph.pruned();
        let layout: Vec<String> = builder::suggested_layout(&graph)
            .into_iter()
            .map(|entry| entry.path)
            .collect();
        let prompt = prompt::repo_script_prompt(&graph, user_context, &layout)?;

        match self.invoke(Operation::RepoScript, &prompt).await {
            Ok(raw) => match script::repair_script(&raw) {
                Ok(script) => Ok(script),
                Err(flagged) => {
                    warn!("[{}] model output is not a bash script; returning it flagged", Operation::RepoScript.name());
                    Ok(flagged)
                }
            },
            Err(failure) => self.recover_text(Operation::RepoScript, failure),
        }
    }

    fn recover_text(&self, op: Operation, failure: Failure) -> Result<String, PipelineError> {
        warn!("[{}] {}", op.name(), failure);
        match (op.failure_policy(), failure) {
            (_, Failure::Unavailable) => Err(PipelineError::ModelUnavailable),
            (_, Failure::CallFailed(msg)) => Err(PipelineError::ModelCallFailed(msg)),
            (FailurePolicy::Surface, Failure::Blocked(_)) => Ok(EXPLANATION_BLOCKED.to_string()),
            (FailurePolicy::Degrade, Failure::Blocked(reason)) => {
                Ok(script::blocked_script(reason.as_deref()))
            }
            (_, other) => Err(PipelineError::Internal(other.to_string())),
        }
    }
}

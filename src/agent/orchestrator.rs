//! The reason/act loop that drives a citation search for one claim.

use serde::Serialize;
use std::sync::Arc;

use super::llm::{CompletionRequest, LlmClient, LlmError, OpenAiClient};
use super::prompt::{request_prompt, system_prompt};
use super::protocol::{parse_model_turn, truncate_chars, INVALID_FORMAT_OBSERVATION};
use super::state::AgentState;
use super::tools::ToolDispatcher;
use crate::config::{AgentConfig, Config, LlmConfig};
use crate::models::{SelectedCitation, Task};
use crate::retrieval::RetrievalService;
use crate::sources::SourceError;

/// Errors that abort an agent run
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Failed to set up sources: {0}")]
    Sources(#[from] SourceError),
}

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The model called `finish`
    ModelFinished,
    /// Enough selections after enough iterations
    AutoFinished,
    /// The model returned no content
    EmptyResponse,
    IterationCap,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            StopReason::ModelFinished => "model finished",
            StopReason::AutoFinished => "auto-finished",
            StopReason::EmptyResponse => "empty model response",
            StopReason::IterationCap => "iteration cap reached",
        };
        f.write_str(text)
    }
}

/// Result of one agent run
#[derive(Debug, Clone, Serialize)]
pub struct AgentOutcome {
    /// Most-cited first
    pub citations: Vec<SelectedCitation>,
    pub iterations: u32,
    pub stop_reason: StopReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub tasks: Vec<Task>,
}

/// Finds citations for a claim by letting a model search and select papers
pub struct CitationAgent {
    llm: Arc<dyn LlmClient>,
    tools: ToolDispatcher,
    llm_config: LlmConfig,
    config: AgentConfig,
}

impl std::fmt::Debug for CitationAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CitationAgent")
            .field("model", &self.llm_config.model)
            .field("config", &self.config)
            .finish()
    }
}

impl CitationAgent {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        retrieval: Arc<RetrievalService>,
        llm_config: LlmConfig,
        config: AgentConfig,
    ) -> Self {
        Self {
            llm,
            tools: ToolDispatcher::new(retrieval, config.clone()),
            llm_config,
            config,
        }
    }

    /// Wire up the OpenAI-compatible client and the configured sources
    pub fn from_config(config: &Config) -> Result<Self, AgentError> {
        let llm = OpenAiClient::from_config(&config.llm, &config.http)?;
        let retrieval = RetrievalService::from_config(config)?;
        Ok(Self::new(
            Arc::new(llm),
            Arc::new(retrieval),
            config.llm.clone(),
            config.agent.clone(),
        ))
    }

    /// Run the loop for `claim` until the model finishes, stalls, or the
    /// iteration cap is hit.
    ///
    /// Only a failing model endpoint is an error; zero citations is a
    /// normal outcome.
    pub async fn run(&self, claim: &str) -> Result<AgentOutcome, AgentError> {
        let mut state = AgentState::new(claim, system_prompt(), request_prompt(claim));
        let mut stop_reason = StopReason::IterationCap;

        while state.iteration() < self.config.max_iterations {
            let iteration = state.begin_iteration();
            tracing::debug!("Iteration {}/{}", iteration, self.config.max_iterations);

            let request = CompletionRequest {
                model: self.llm_config.model.clone(),
                messages: state.messages().to_vec(),
                max_tokens: self.llm_config.max_tokens,
                temperature: self.llm_config.temperature,
            };
            let completion = self.llm.complete(&request).await?;

            let content = completion.content.as_deref().map(str::trim).unwrap_or_default();
            if content.is_empty() {
                tracing::warn!("Empty model response at iteration {}, stopping", iteration);
                stop_reason = StopReason::EmptyResponse;
                break;
            }

            state.push_assistant(content);
            let turn = parse_model_turn(content);
            if let Some(ref thought) = turn.thought {
                tracing::debug!("Thought: {}", truncate_chars(thought, 150));
            }

            let observation = match turn.call {
                Ok(call) => self.tools.execute(&call.name, &call.params, &mut state).await,
                Err(e) => {
                    tracing::debug!("Unparseable model turn: {}", e);
                    INVALID_FORMAT_OBSERVATION.to_string()
                }
            };
            state.push_observation(observation);

            if state.is_finished() {
                stop_reason = StopReason::ModelFinished;
                break;
            }

            if iteration >= self.config.auto_finish_iteration
                && state.selections().len() >= self.config.auto_finish_min_selections
            {
                tracing::info!(
                    "Auto-finishing at iteration {} with {} selections",
                    iteration,
                    state.selections().len()
                );
                state.finish(None);
                stop_reason = StopReason::AutoFinished;
                break;
            }
        }

        let citations = state.selections().ranked(self.config.max_citations);
        tracing::info!(
            "Agent stopped ({}) after {} iterations with {} citations",
            stop_reason,
            state.iteration(),
            citations.len()
        );

        Ok(AgentOutcome {
            citations,
            iterations: state.iteration(),
            stop_reason,
            summary: state.summary().map(str::to_string),
            tasks: state.tasks().to_vec(),
        })
    }
}

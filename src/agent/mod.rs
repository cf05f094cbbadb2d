//! The citation-finding agent.
//!
//! [`CitationAgent`] runs a bounded reason/act loop: each turn the model
//! thinks, picks one tool and receives an observation. Tools search the
//! configured sources, select papers as evidence and manage a small task
//! list. The run ends when the model calls `finish`, stalls, has collected
//! enough evidence late in the run, or hits the iteration cap.

pub mod llm;
mod orchestrator;
pub mod prompt;
pub mod protocol;
mod state;
mod tools;

pub use llm::{ChatMessage, Completion, CompletionRequest, LlmClient, LlmError, OpenAiClient, Role};
pub use orchestrator::{AgentError, AgentOutcome, CitationAgent, StopReason};
pub use protocol::{parse_model_turn, ActionRequest, ModelTurn, ParseFailure, ToolCall, ToolError};
pub use state::{AgentState, AgentStatus, Selections};
pub use tools::ToolDispatcher;

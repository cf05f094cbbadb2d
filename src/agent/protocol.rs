//! The tag protocol spoken between the agent and the model.
//!
//! Each model turn carries at most one `<thought>`, one `<action>` naming a
//! tool, and one `<params>` holding a JSON object. Parsing happens in two
//! steps: [`parse_model_turn`] extracts the tags, then
//! [`ActionRequest::from_call`] turns the tool name and arguments into a typed
//! request. Failures at either step are recoverable and reported back to the
//! model as an observation.

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Tool names in the order they are advertised to the model
pub const VALID_ACTIONS: [&str; 6] = [
    "think",
    "search_papers",
    "select_paper",
    "add_task",
    "complete_task",
    "finish",
];

/// Sent back when a turn cannot be parsed into an action
pub const INVALID_FORMAT_OBSERVATION: &str = "<observation>Invalid response format. Please respond with <thought>, <action>, and <params> tags.</observation>";

/// Why a model turn could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseFailure {
    #[error("no <action> tag")]
    MissingAction,

    #[error("no <params> tag")]
    MissingParams,

    #[error("params are not valid JSON: {0}")]
    InvalidJson(String),

    #[error("params are not a JSON object")]
    NotAnObject,
}

/// The tags extracted from one model turn
#[derive(Debug, Clone, PartialEq)]
pub struct ModelTurn {
    pub thought: Option<String>,
    pub call: Result<ToolCall, ParseFailure>,
}

/// A tool name with its raw JSON arguments
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub name: String,
    pub params: Map<String, Value>,
}

struct TagPatterns {
    thought: Regex,
    action: Regex,
    params: Regex,
}

static TAG_PATTERNS: OnceLock<Option<TagPatterns>> = OnceLock::new();

fn tag_pattern(tag: &str) -> Option<Regex> {
    Regex::new(&format!(r"(?s)<{0}>(.*?)</{0}>", tag)).ok()
}

fn patterns() -> Option<&'static TagPatterns> {
    TAG_PATTERNS
        .get_or_init(|| {
            Some(TagPatterns {
                thought: tag_pattern("thought")?,
                action: tag_pattern("action")?,
                params: tag_pattern("params")?,
            })
        })
        .as_ref()
}

fn first_capture<'a>(re: &Regex, content: &'a str) -> Option<&'a str> {
    re.captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
}

/// Extract thought, action and params from raw model output
pub fn parse_model_turn(content: &str) -> ModelTurn {
    let Some(patterns) = patterns() else {
        return ModelTurn {
            thought: None,
            call: Err(ParseFailure::MissingAction),
        };
    };

    let thought = first_capture(&patterns.thought, content)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    let call = match (
        first_capture(&patterns.action, content).filter(|a| !a.is_empty()),
        first_capture(&patterns.params, content),
    ) {
        (None, _) => Err(ParseFailure::MissingAction),
        (Some(_), None) => Err(ParseFailure::MissingParams),
        (Some(name), Some(raw)) => parse_params(raw).map(|params| ToolCall {
            name: name.to_string(),
            params,
        }),
    };

    ModelTurn { thought, call }
}

fn parse_params(raw: &str) -> Result<Map<String, Value>, ParseFailure> {
    let raw = strip_code_fence(raw);
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ParseFailure::NotAnObject),
        Err(e) => Err(ParseFailure::InvalidJson(e.to_string())),
    }
}

/// Models sometimes wrap the JSON in a Markdown fence
fn strip_code_fence(raw: &str) -> &str {
    let Some(inner) = raw.strip_prefix("```") else {
        return raw;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ThinkParams {
    #[serde(default)]
    pub thought: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchPapersParams {
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SelectPaperParams {
    pub paper_index: i64,
    pub excerpt: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AddTaskParams {
    #[serde(alias = "description")]
    pub task: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompleteTaskParams {
    pub task_id: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FinishParams {
    pub summary: String,
}

/// A validated tool invocation, one variant per tool
#[derive(Debug, Clone, PartialEq)]
pub enum ActionRequest {
    Think(ThinkParams),
    SearchPapers(SearchPapersParams),
    SelectPaper(SelectPaperParams),
    AddTask(AddTaskParams),
    CompleteTask(CompleteTaskParams),
    Finish(FinishParams),
}

/// A tool call that cannot be executed as given
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Invalid parameters for {tool}: {reason}")]
    InvalidArguments { tool: &'static str, reason: String },
}

impl ToolError {
    /// Render as the observation fed back to the model
    pub fn to_observation(&self) -> String {
        match self {
            ToolError::UnknownAction(_) => observation(&format!(
                "{}. Available actions: {}",
                escape_xml(&self.to_string()),
                VALID_ACTIONS.join(", ")
            )),
            ToolError::InvalidArguments { .. } => observation(&escape_xml(&self.to_string())),
        }
    }
}

fn typed<T: DeserializeOwned>(tool: &'static str, params: &Map<String, Value>) -> Result<T, ToolError> {
    serde_json::from_value(Value::Object(params.clone())).map_err(|e| ToolError::InvalidArguments {
        tool,
        reason: e.to_string(),
    })
}

impl ActionRequest {
    /// Validate a tool name and its arguments
    pub fn from_call(name: &str, params: &Map<String, Value>) -> Result<Self, ToolError> {
        let request = match name {
            "think" => ActionRequest::Think(typed("think", params)?),
            "search_papers" => {
                let p: SearchPapersParams = typed("search_papers", params)?;
                if p.query.trim().is_empty() {
                    return Err(ToolError::InvalidArguments {
                        tool: "search_papers",
                        reason: "query must not be empty".to_string(),
                    });
                }
                ActionRequest::SearchPapers(p)
            }
            "select_paper" => ActionRequest::SelectPaper(typed("select_paper", params)?),
            "add_task" => ActionRequest::AddTask(typed("add_task", params)?),
            "complete_task" => ActionRequest::CompleteTask(typed("complete_task", params)?),
            "finish" => ActionRequest::Finish(typed("finish", params)?),
            other => return Err(ToolError::UnknownAction(other.to_string())),
        };
        Ok(request)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ActionRequest::Think(_) => "think",
            ActionRequest::SearchPapers(_) => "search_papers",
            ActionRequest::SelectPaper(_) => "select_paper",
            ActionRequest::AddTask(_) => "add_task",
            ActionRequest::CompleteTask(_) => "complete_task",
            ActionRequest::Finish(_) => "finish",
        }
    }
}

/// Wrap text in the observation envelope
pub fn observation(text: &str) -> String {
    format!("<observation>{}</observation>", text)
}

pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Cut to `max_chars` characters, marking the cut with "..."
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

//! Tool execution for the citation agent.
//!
//! Every tool returns an observation string; nothing here fails. Bad input
//! from the model becomes an observation the model can react to.

use serde_json::{Map, Value};
use std::fmt::Write as _;
use std::sync::Arc;

use super::protocol::{
    escape_xml, observation, truncate_chars, ActionRequest, AddTaskParams, CompleteTaskParams,
    FinishParams, SearchPapersParams, SelectPaperParams, ThinkParams,
};
use super::state::AgentState;
use crate::config::AgentConfig;
use crate::models::{MergeKey, Paper, SelectedCitation};
use crate::retrieval::RetrievalService;

const AUTHORS_SHOWN: usize = 3;

/// Executes model-requested tools against the agent state
#[derive(Debug, Clone)]
pub struct ToolDispatcher {
    retrieval: Arc<RetrievalService>,
    config: AgentConfig,
}

impl ToolDispatcher {
    pub fn new(retrieval: Arc<RetrievalService>, config: AgentConfig) -> Self {
        Self { retrieval, config }
    }

    pub fn retrieval(&self) -> &RetrievalService {
        &self.retrieval
    }

    /// Validate and run one tool call, returning the observation
    pub async fn execute(
        &self,
        action: &str,
        params: &Map<String, Value>,
        state: &mut AgentState,
    ) -> String {
        match ActionRequest::from_call(action, params) {
            Ok(request) => self.dispatch(request, state).await,
            Err(e) => {
                tracing::debug!("Rejected tool call {}: {}", action, e);
                e.to_observation()
            }
        }
    }

    pub async fn dispatch(&self, request: ActionRequest, state: &mut AgentState) -> String {
        match request {
            ActionRequest::Think(p) => self.think(p),
            ActionRequest::SearchPapers(p) => self.search_papers(p, state).await,
            ActionRequest::SelectPaper(p) => self.select_paper(p, state),
            ActionRequest::AddTask(p) => add_task(p, state),
            ActionRequest::CompleteTask(p) => complete_task(p, state),
            ActionRequest::Finish(p) => finish(p, state),
        }
    }

    fn think(&self, params: ThinkParams) -> String {
        tracing::debug!("Think: {}", truncate_chars(&params.thought, 100));
        observation("Thought recorded. Continue with your next action.")
    }

    async fn search_papers(&self, params: SearchPapersParams, state: &mut AgentState) -> String {
        let query = params.query.trim();
        tracing::info!("Searching: \"{}\"", query);

        let papers = self.retrieval.retrieve(query).await;
        if papers.is_empty() {
            state.replace_search_results(Vec::new());
            return observation(&format!(
                "No papers found for \"{}\". Try different search terms.",
                escape_xml(query)
            ));
        }

        let total = papers.len();
        let shown: Vec<Paper> = papers.into_iter().take(self.config.results_shown).collect();

        let mut xml = format!("\n  <results count=\"{}\">", total);
        for (i, paper) in shown.iter().enumerate() {
            let _ = write!(
                xml,
                "\n    <paper index=\"{}\">\
                 \n      <title>{}</title>\
                 \n      <authors>{}</authors>\
                 \n      <abstract>{}</abstract>\
                 \n      <citations>{}</citations>\
                 \n      <source>{}</source>\
                 \n    </paper>",
                i,
                escape_xml(paper.title()),
                escape_xml(&author_list(&paper.authors)),
                escape_xml(&truncate_chars(&paper.r#abstract, self.config.abstract_preview_chars)),
                paper.citation_count,
                escape_xml(&paper.source),
            );
        }
        let _ = write!(
            xml,
            "\n  </results>\
             \n  <instruction>Review the abstracts above. For relevant papers, use select_paper with an excerpt explaining how it supports the claim: \"{}\"</instruction>\n",
            escape_xml(state.claim())
        );

        state.replace_search_results(shown);
        observation(&xml)
    }

    fn select_paper(&self, params: SelectPaperParams, state: &mut AgentState) -> String {
        let available = state.last_search_results().len();
        let paper = usize::try_from(params.paper_index)
            .ok()
            .and_then(|i| state.last_search_results().get(i));

        let Some(paper) = paper else {
            return if available == 0 {
                observation(&format!(
                    "Invalid paper index {}. There are no search results to select from; call search_papers first.",
                    params.paper_index
                ))
            } else {
                observation(&format!(
                    "Invalid paper index {}. Valid range: 0-{}",
                    params.paper_index,
                    available - 1
                ))
            };
        };

        let key = paper
            .merge_key()
            .unwrap_or_else(|| MergeKey::Title(paper.title_key().to_string()));
        let title = paper.title().to_string();
        let citation = SelectedCitation::from_paper(paper, params.excerpt);

        if !state.selections_mut().insert(key, citation) {
            return observation(&format!("Paper already selected: \"{}\"", escape_xml(&title)));
        }

        let total = state.selections().len();
        tracing::info!("Selected paper {}: {}", params.paper_index, truncate_chars(&title, 50));

        let nudge = if total >= self.config.auto_finish_min_selections {
            "You have enough papers - consider calling finish."
        } else {
            "Continue selecting or search for more."
        };
        observation(&format!(
            "Paper selected: \"{}\". Total selected: {}. {}",
            escape_xml(&title),
            total,
            nudge
        ))
    }
}

fn add_task(params: AddTaskParams, state: &mut AgentState) -> String {
    let task = state.add_task(params.task);
    tracing::debug!("Added task {}: {}", task.id, task.description);
    observation(&format!(
        "Task {} added: \"{}\"",
        task.id,
        escape_xml(&task.description)
    ))
}

fn complete_task(params: CompleteTaskParams, state: &mut AgentState) -> String {
    if state.complete_task(params.task_id) {
        observation(&format!("Task {} marked complete", params.task_id))
    } else {
        observation(&format!("Task {} not found", params.task_id))
    }
}

fn finish(params: FinishParams, state: &mut AgentState) -> String {
    tracing::info!("Finishing: {}", params.summary);
    state.finish(Some(params.summary));
    observation("Agent finished. Results will be returned.")
}

/// First few authors, then "et al."
fn author_list(authors: &[String]) -> String {
    let mut list = authors
        .iter()
        .take(AUTHORS_SHOWN)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if authors.len() > AUTHORS_SHOWN {
        list.push_str(" et al.");
    }
    list
}

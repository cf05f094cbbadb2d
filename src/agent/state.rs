//! Per-run agent state.
//!
//! An [`AgentState`] is created for one claim, mutated only by the
//! orchestrator and the tool dispatcher, and dropped when the run ends.

use crate::agent::llm::ChatMessage;
use crate::models::{MergeKey, Paper, SelectedCitation, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentStatus {
    Running,
    Finished,
}

/// Citations chosen so far, unique by merge key, in selection order
#[derive(Debug, Clone, Default)]
pub struct Selections {
    entries: Vec<(MergeKey, SelectedCitation)>,
}

impl Selections {
    pub fn contains(&self, key: &MergeKey) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Insert unless the key is already present; never overwrites
    pub fn insert(&mut self, key: MergeKey, citation: SelectedCitation) -> bool {
        if self.contains(&key) {
            return false;
        }
        self.entries.push((key, citation));
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectedCitation> {
        self.entries.iter().map(|(_, c)| c)
    }

    /// Most-cited first (ties keep selection order), at most `limit`
    pub fn ranked(&self, limit: usize) -> Vec<SelectedCitation> {
        let mut citations: Vec<SelectedCitation> = self.iter().cloned().collect();
        citations.sort_by(|a, b| b.citation_count.cmp(&a.citation_count));
        citations.truncate(limit);
        citations
    }
}

#[derive(Debug, Clone)]
pub struct AgentState {
    claim: String,
    messages: Vec<ChatMessage>,
    iteration: u32,
    selections: Selections,
    last_search_results: Vec<Paper>,
    tasks: Vec<Task>,
    status: AgentStatus,
    summary: Option<String>,
}

impl AgentState {
    /// Start a run with the system prompt and the wrapped claim as the
    /// first two transcript entries
    pub fn new(claim: impl Into<String>, system_prompt: String, request: String) -> Self {
        Self {
            claim: claim.into(),
            messages: vec![ChatMessage::system(system_prompt), ChatMessage::user(request)],
            iteration: 0,
            selections: Selections::default(),
            last_search_results: Vec::new(),
            tasks: Vec::new(),
            status: AgentStatus::Running,
            summary: None,
        }
    }

    pub fn claim(&self) -> &str {
        &self.claim
    }

    /// The transcript; it only ever grows
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(content));
    }

    /// Observations are fed back as user turns
    pub fn push_observation(&mut self, observation: impl Into<String>) {
        self.messages.push(ChatMessage::user(observation));
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// Advance the iteration counter, returning the new value
    pub fn begin_iteration(&mut self) -> u32 {
        self.iteration += 1;
        self.iteration
    }

    pub fn status(&self) -> AgentStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status == AgentStatus::Finished
    }

    /// Move to FINISHED; a later call never erases an earlier summary
    pub fn finish(&mut self, summary: Option<String>) {
        self.status = AgentStatus::Finished;
        if summary.is_some() {
            self.summary = summary;
        }
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn selections(&self) -> &Selections {
        &self.selections
    }

    pub fn selections_mut(&mut self) -> &mut Selections {
        &mut self.selections
    }

    pub fn last_search_results(&self) -> &[Paper] {
        &self.last_search_results
    }

    /// Replace (never extend) the results `select_paper` indexes into
    pub fn replace_search_results(&mut self, papers: Vec<Paper>) {
        self.last_search_results = papers;
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Append a task with the next sequential id
    pub fn add_task(&mut self, description: impl Into<String>) -> &Task {
        let id = self.tasks.len() as u32 + 1;
        self.tasks.push(Task {
            id,
            description: description.into(),
            completed: false,
        });
        &self.tasks[self.tasks.len() - 1]
    }

    /// Mark a task completed; `false` if no task has that id
    pub fn complete_task(&mut self, id: i64) -> bool {
        match self.tasks.iter_mut().find(|t| i64::from(t.id) == id) {
            Some(task) => {
                task.completed = true;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::llm::Role;
    use crate::models::{PaperBuilder, SourceType};

    fn state() -> AgentState {
        AgentState::new("claim", "system".to_string(), "request".to_string())
    }

    #[test]
    fn test_new_state_is_seeded() {
        let state = state();
        assert_eq!(state.iteration(), 0);
        assert_eq!(state.status(), AgentStatus::Running);
        assert_eq!(state.messages().len(), 2);
        assert_eq!(state.messages()[0].role, Role::System);
        assert_eq!(state.messages()[1].role, Role::User);
        assert!(state.selections().is_empty());
    }

    #[test]
    fn test_tasks_are_sequential() {
        let mut state = state();
        assert_eq!(state.add_task("search").id, 1);
        assert_eq!(state.add_task("select").id, 2);

        assert!(state.complete_task(2));
        assert!(!state.complete_task(7));
        assert!(!state.tasks()[0].completed);
        assert!(state.tasks()[1].completed);
    }

    #[test]
    fn test_selections_reject_duplicates() {
        let paper = PaperBuilder::new("T", "u", &SourceType::Arxiv).doi("10.1/x").build();
        let key = paper.merge_key().unwrap();
        let mut selections = Selections::default();

        assert!(selections.insert(key.clone(), SelectedCitation::from_paper(&paper, "first")));
        assert!(!selections.insert(key, SelectedCitation::from_paper(&paper, "second")));
        assert_eq!(selections.len(), 1);
        assert_eq!(selections.iter().next().unwrap().excerpt, "first");
    }

    #[test]
    fn test_ranked_selections() {
        let mut selections = Selections::default();
        for (title, cites) in [("a", 1), ("b", 30), ("c", 30), ("d", 5)] {
            let paper = PaperBuilder::new(title, "u", &SourceType::Arxiv).citations(cites).build();
            selections.insert(paper.merge_key().unwrap(), SelectedCitation::from_paper(&paper, ""));
        }

        let titles: Vec<_> = selections.ranked(3).into_iter().map(|c| c.title).collect();
        assert_eq!(titles, vec!["b", "c", "d"]);
    }

    #[test]
    fn test_finish_keeps_summary() {
        let mut state = state();
        state.finish(Some("found three".to_string()));
        state.finish(None);
        assert!(state.is_finished());
        assert_eq!(state.summary(), Some("found three"));
    }
}

//! Integration tests for the citation agent
//!
//! These tests drive the public API end to end: a scripted model, mock
//! sources, retrieval with merging, and the agent loop.

use async_trait::async_trait;
use citation_agent::agent::{
    AgentError, CitationAgent, Completion, CompletionRequest, LlmClient, LlmError, StopReason,
};
use citation_agent::config::{AgentConfig, Config, LlmConfig};
use citation_agent::models::{Paper, PaperBuilder, SourceType};
use citation_agent::sources::{MockSource, SourceRegistry};
use citation_agent::utils::{format_bibliography, CitationStyle};
use citation_agent::RetrievalService;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

const CLAIM: &str = "Neural networks outperform traditional methods on image classification by 15%";

/// Replays fixed model turns, then returns empty content
struct ScriptedModel {
    turns: Mutex<VecDeque<String>>,
    seen: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedModel {
    fn new(turns: &[&str]) -> Self {
        Self {
            turns: Mutex::new(turns.iter().map(|t| t.to_string()).collect()),
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LlmClient for ScriptedModel {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        self.seen.lock().unwrap().push(request.clone());
        Ok(match self.turns.lock().unwrap().pop_front() {
            Some(turn) => Completion::text(turn),
            None => Completion::default(),
        })
    }
}

fn shared_paper_from_arxiv() -> Paper {
    PaperBuilder::new(
        "ImageNet Classification with Deep Convolutional Neural Networks",
        "https://arxiv.org/abs/1234.5678",
        &SourceType::Arxiv,
    )
    .authors(["A. Krizhevsky", "I. Sutskever", "G. Hinton"])
    .abstract_text("Deep CNNs reduce top-5 error substantially compared to prior methods.")
    .doi("10.1145/3065386")
    .pdf_url("https://arxiv.org/pdf/1234.5678")
    .year(2012)
    .build()
}

fn shared_paper_from_semantic() -> Paper {
    PaperBuilder::new(
        "ImageNet classification with deep convolutional neural networks",
        "https://www.semanticscholar.org/paper/abc",
        &SourceType::SemanticScholar,
    )
    .authors(["A. Krizhevsky", "I. Sutskever", "G. Hinton"])
    .abstract_text("Short abstract.")
    .doi("https://doi.org/10.1145/3065386")
    .citations(120_000)
    .build()
}

fn registry() -> SourceRegistry {
    SourceRegistry::new()
        .with_source(Arc::new(MockSource::with_papers("arxiv", vec![shared_paper_from_arxiv()])))
        .with_source(Arc::new(MockSource::with_papers(
            "semantic",
            vec![shared_paper_from_semantic()],
        )))
}

fn agent(model: Arc<ScriptedModel>) -> CitationAgent {
    CitationAgent::new(
        model,
        Arc::new(RetrievalService::new(registry())),
        LlmConfig::default(),
        AgentConfig::default(),
    )
}

#[tokio::test]
async fn test_retrieval_merges_duplicate_across_sources() {
    let papers = RetrievalService::new(registry()).retrieve("image classification").await;

    assert_eq!(papers.len(), 1);
    let paper = &papers[0];
    assert_eq!(paper.citation_count, 120_000);
    assert_eq!(paper.pdf_url.as_deref(), Some("https://arxiv.org/pdf/1234.5678"));
    assert_eq!(paper.doi.as_deref(), Some("10.1145/3065386"));
    assert_eq!(paper.source, "arXiv, Semantic Scholar");
    assert_eq!(paper.year, Some(2012));
    assert!(paper.r#abstract.starts_with("Deep CNNs"));
}

#[tokio::test]
async fn test_end_to_end_citation_search() {
    let model = Arc::new(ScriptedModel::new(&[
        r#"<thought>I need benchmark evidence.</thought>
<action>search_papers</action>
<params>{"query": "deep neural networks image classification accuracy"}</params>"#,
        r#"<thought>Paper 0 is the AlexNet paper.</thought>
<action>select_paper</action>
<params>{"paper_index": 0, "excerpt": "Deep CNNs cut top-5 error far below earlier methods."}</params>"#,
        r#"<thought>Enough.</thought>
<action>finish</action>
<params>{"summary": "Found the AlexNet paper."}</params>"#,
    ]));

    let outcome = agent(model.clone()).run(CLAIM).await.unwrap();

    assert_eq!(outcome.stop_reason, StopReason::ModelFinished);
    assert_eq!(outcome.iterations, 3);
    assert_eq!(outcome.citations.len(), 1);

    let citation = &outcome.citations[0];
    assert_eq!(citation.citation_count, 120_000);
    assert_eq!(citation.url, "https://doi.org/10.1145/3065386");
    assert_eq!(citation.excerpt, "Deep CNNs cut top-5 error far below earlier methods.");
    assert_eq!(citation.year, Some(2012));

    let seen = model.seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert!(seen[0].messages[1].content.contains(CLAIM));
    let observation = &seen[1].messages[3].content;
    assert!(observation.contains("<results count=\"1\">"));
    assert!(observation.contains("<citations>120000</citations>"));

    let bibliography = format_bibliography(&outcome.citations, CitationStyle::Apa);
    assert!(bibliography.starts_with("[1] A. Krizhevsky, I. Sutskever, & G. Hinton (2012)."));
}

#[tokio::test]
async fn test_no_evidence_is_not_an_error() {
    let model = Arc::new(ScriptedModel::new(&[
        r#"<thought>search</thought><action>search_papers</action><params>{"query": "unfindable"}</params>"#,
    ]));
    let registry = SourceRegistry::new()
        .with_source(Arc::new(MockSource::failing("arxiv")))
        .with_source(Arc::new(MockSource::new("semantic")));
    let agent = CitationAgent::new(
        model.clone(),
        Arc::new(RetrievalService::new(registry)),
        LlmConfig::default(),
        AgentConfig::default(),
    );

    let outcome = agent.run("Some obscure claim").await.unwrap();

    assert!(outcome.citations.is_empty());
    assert_eq!(outcome.stop_reason, StopReason::EmptyResponse);
    let seen = model.seen.lock().unwrap();
    assert!(seen[1].messages[3].content.contains("No papers found for \"unfindable\""));
}

#[test]
fn test_missing_api_key_is_fatal() {
    let mut config = Config::default();
    config.llm.api_key = Some(String::new());
    if std::env::var("OPENAI_API_KEY").map(|k| !k.trim().is_empty()).unwrap_or(false) {
        return;
    }

    let result = CitationAgent::from_config(&config);
    assert!(matches!(result, Err(AgentError::Llm(LlmError::MissingApiKey))));
}

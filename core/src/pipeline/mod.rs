//! The retrieve→generate→score orchestrator.
//!
//! A [`RagPipeline`] owns the index and the two injected model
//! capabilities, and drives each query through a strictly sequential
//! flow: embed, retrieve, build prompt, generate, post-process, score.
//! Embedding failures are fatal; generation failures degrade into a
//! readable answer tagged [`AnswerSource::BackendFailure`] instead of
//! propagating.

pub mod humanize;

use thiserror::Error;
use tracing::{debug, error, info, instrument};

use crate::embeddings::{EmbedderError, EmbeddingModel};
use crate::generation::{GenerationError, GenerationModel};
use crate::indexer::{self, IndexerError, Table};
use crate::scoring::{self, QualityScore};
use crate::vector_store::{EmbeddingIndex, VectorStoreError};

/// Fixed prompt contract. `{context}` and `{query}` are the only
/// variable parts; the wording of the instructions is not.
const PROMPT_TEMPLATE: &str = "\
You are drafting a response to a request-for-proposal requirement on behalf of our organization. \
Answer the following question based only on the provided context. If the answer cannot be found \
in the context, say \"I don't have enough information to answer that question.\" Write in a \
confident, professional tone and keep the answer under 200 words. Do not invent capabilities, \
figures, or commitments that are not supported by the context, and do not mention the context, \
reference documents, or where the information came from.

Context:
{context}

Question: {query}

Answer:";

const DEFAULT_TOP_K: usize = 3;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to embed text: {0}")]
    Embedder(#[from] EmbedderError),
    #[error(transparent)]
    VectorStore(#[from] VectorStoreError),
    #[error(transparent)]
    Indexer(#[from] IndexerError),
}

/// Whether an answer came from the generation backend or stands in for a
/// backend failure. Callers detect degradation through this tag rather
/// than by matching on the answer text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSource {
    Generated,
    BackendFailure,
}

#[derive(Debug, Clone)]
pub struct RagResponse {
    pub query: String,
    /// Retrieved document texts joined with blank lines; empty when the
    /// store held no documents.
    pub context: String,
    pub answer: String,
    pub answer_source: AnswerSource,
    /// Present only when scoring is enabled on the pipeline.
    pub quality: Option<QualityScore>,
}

#[derive(Debug)]
pub enum BatchOutcome {
    Success(RagResponse),
    Error(String),
}

#[derive(Debug)]
pub struct BatchItem {
    pub query: String,
    pub outcome: BatchOutcome,
}

/// Result of indexing a table of historical responses.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct IndexReport {
    pub documents_added: usize,
    pub document_ids: Vec<u64>,
    pub initial_count: usize,
    pub final_count: usize,
}

pub struct RagPipeline<E: EmbeddingModel, G: GenerationModel> {
    store: EmbeddingIndex,
    embedder: E,
    generator: G,
    top_k: usize,
    scoring: bool,
}

impl<E: EmbeddingModel, G: GenerationModel> RagPipeline<E, G> {
    pub fn new(store: EmbeddingIndex, embedder: E, generator: G) -> Self {
        Self {
            store,
            embedder,
            generator,
            top_k: DEFAULT_TOP_K,
            scoring: true,
        }
    }

    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    #[must_use]
    pub fn with_scoring(mut self, enabled: bool) -> Self {
        self.scoring = enabled;
        self
    }

    pub fn store(&self) -> &EmbeddingIndex {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut EmbeddingIndex {
        &mut self.store
    }

    pub fn document_count(&self) -> usize {
        self.store.len()
    }

    pub fn dimension(&self) -> usize {
        self.store.dimension()
    }

    /// Embeds raw text chunks and adds them to the store, returning the
    /// assigned document IDs.
    #[instrument(skip(self, texts), fields(count = texts.len()))]
    pub async fn index_texts(&mut self, texts: &[String]) -> Result<Vec<u64>, PipelineError> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embedder.embed(text).await?);
        }
        Ok(self.store.add(texts, &embeddings)?)
    }

    /// Full table-ingestion workflow: detect columns, extract pairs,
    /// render documents, embed, and add to the store.
    #[instrument(skip(self, table), fields(rows = table.rows.len()))]
    pub async fn index_table(&mut self, table: &Table) -> Result<IndexReport, PipelineError> {
        let pairs = indexer::extract_pairs(table)?;
        let documents = indexer::to_documents(&pairs);
        let initial_count = self.store.len();
        let document_ids = self.index_texts(&documents).await?;
        info!(
            added = documents.len(),
            total = self.store.len(),
            "indexed table"
        );
        Ok(IndexReport {
            documents_added: documents.len(),
            document_ids,
            initial_count,
            final_count: self.store.len(),
        })
    }

    /// Answers a single query.
    ///
    /// Only embedding and retrieval failures propagate; a failing
    /// generation backend yields a degraded answer so callers always get
    /// a `RagResponse` to render once retrieval worked.
    #[instrument(skip(self), fields(top_k = self.top_k))]
    pub async fn ask(&self, query: &str) -> Result<RagResponse, PipelineError> {
        let embedding = self.embedder.embed(query).await?;
        let hits = self.store.search(&embedding, self.top_k)?;
        debug!(retrieved = hits.len(), "retrieved context chunks");
        let context = hits
            .iter()
            .map(|hit| hit.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let prompt = build_prompt(&context, query);
        let (answer, answer_source) = match self.generator.generate(&prompt).await {
            Ok(text) => (humanize::humanize(&text), AnswerSource::Generated),
            Err(GenerationError::ParseError(e)) => {
                error!(error = %e, "generation backend returned malformed response");
                (
                    format!("Error: Invalid response from {}", self.generator.name()),
                    AnswerSource::BackendFailure,
                )
            }
            Err(e) => {
                error!(error = %e, "generation backend unreachable");
                (
                    format!("Error connecting to {}: {e}", self.generator.name()),
                    AnswerSource::BackendFailure,
                )
            }
        };

        let quality = if self.scoring {
            Some(scoring::score(query, &answer))
        } else {
            None
        };

        Ok(RagResponse {
            query: query.to_string(),
            context,
            answer,
            answer_source,
            quality,
        })
    }

    /// Processes queries strictly in order. A failing item is recorded as
    /// an error and the batch continues; output is 1:1 with input.
    #[instrument(skip(self, queries), fields(count = queries.len()))]
    pub async fn ask_batch(&self, queries: &[String]) -> Vec<BatchItem> {
        let mut items = Vec::with_capacity(queries.len());
        for query in queries {
            let outcome = match self.ask(query).await {
                Ok(response) => BatchOutcome::Success(response),
                Err(e) => {
                    error!(error = %e, query = %query, "batch item failed");
                    BatchOutcome::Error(e.to_string())
                }
            };
            items.push(BatchItem {
                query: query.clone(),
                outcome,
            });
        }
        items
    }
}

fn build_prompt(context: &str, query: &str) -> String {
    PROMPT_TEMPLATE
        .replace("{context}", context)
        .replace("{query}", query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationError;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Maps known texts to fixed vectors; anything else gets the fallback.
    struct MockEmbedder {
        known: HashMap<String, Vec<f32>>,
        fallback: Vec<f32>,
    }

    impl MockEmbedder {
        fn new(known: &[(&str, Vec<f32>)], fallback: Vec<f32>) -> Self {
            Self {
                known: known
                    .iter()
                    .map(|(text, vector)| (text.to_string(), vector.clone()))
                    .collect(),
                fallback,
            }
        }
    }

    #[async_trait]
    impl EmbeddingModel for MockEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
            Ok(self
                .known
                .get(text)
                .cloned()
                .unwrap_or_else(|| self.fallback.clone()))
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl EmbeddingModel for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedderError> {
            Err(EmbedderError::RequestError("connection refused".into()))
        }
    }

    enum MockGenerator {
        Reply(String),
        Unreachable,
        ServerError,
        Malformed,
    }

    #[async_trait]
    impl GenerationModel for MockGenerator {
        fn name(&self) -> &'static str {
            "Ollama"
        }

        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            match self {
                Self::Reply(text) => Ok(text.clone()),
                Self::Unreachable => Err(GenerationError::RequestError(
                    "error sending request".into(),
                )),
                Self::ServerError => Err(GenerationError::ProviderError(
                    500,
                    "internal server error".into(),
                )),
                Self::Malformed => Err(GenerationError::ParseError(
                    "missing `response` field".into(),
                )),
            }
        }
    }

    fn seeded_pipeline(generator: MockGenerator) -> RagPipeline<MockEmbedder, MockGenerator> {
        let mut store = EmbeddingIndex::new(3);
        store
            .add(
                &[
                    "cloud migration experience".to_string(),
                    "data security approach".to_string(),
                    "support SLA".to_string(),
                ],
                &[
                    vec![1.0, 0.0, 0.0],
                    vec![0.0, 1.0, 0.0],
                    vec![0.0, 0.0, 1.0],
                ],
            )
            .unwrap();
        let embedder = MockEmbedder::new(&[], vec![0.9, 0.05, 0.05]);
        RagPipeline::new(store, embedder, generator)
    }

    #[test]
    fn prompt_embeds_context_and_query() {
        let prompt = build_prompt("some retrieved context", "What is the SLA?");
        assert!(prompt.contains("Context:\nsome retrieved context"));
        assert!(prompt.contains("Question: What is the SLA?"));
        assert!(prompt.ends_with("Answer:"));
        assert!(!prompt.contains("{context}"));
        assert!(!prompt.contains("{query}"));
    }

    #[tokio::test]
    async fn ask_retrieves_nearest_documents_in_order() {
        let pipeline = seeded_pipeline(MockGenerator::Reply("We have done this before.".into()))
            .with_top_k(1);
        let response = pipeline.ask("tell me about cloud work").await.unwrap();

        assert_eq!(response.context, "cloud migration experience");
        assert_eq!(response.answer, "We have done this before.");
        assert_eq!(response.answer_source, AnswerSource::Generated);
    }

    #[tokio::test]
    async fn context_chunks_join_with_blank_lines() {
        let pipeline = seeded_pipeline(MockGenerator::Reply("ok".into())).with_top_k(2);
        let response = pipeline.ask("cloud").await.unwrap();

        assert_eq!(
            response.context,
            "cloud migration experience\n\ndata security approach"
        );
    }

    #[tokio::test]
    async fn empty_store_gives_empty_context_not_an_error() {
        let store = EmbeddingIndex::new(3);
        let embedder = MockEmbedder::new(&[], vec![1.0, 0.0, 0.0]);
        let pipeline = RagPipeline::new(store, embedder, MockGenerator::Reply("ok".into()));
        let response = pipeline.ask("anything").await.unwrap();

        assert_eq!(response.context, "");
    }

    #[tokio::test]
    async fn generated_answers_are_humanized() {
        let pipeline = seeded_pipeline(MockGenerator::Reply(
            "Response: We offer **full** migration support.".into(),
        ));
        let response = pipeline.ask("cloud").await.unwrap();

        assert_eq!(response.answer, "We offer full migration support.");
    }

    #[tokio::test]
    async fn unreachable_backend_degrades_instead_of_failing() {
        let pipeline = seeded_pipeline(MockGenerator::Unreachable);
        let response = pipeline.ask("cloud").await.unwrap();

        assert!(response.answer.starts_with("Error connecting to Ollama:"));
        assert_eq!(response.answer_source, AnswerSource::BackendFailure);
    }

    #[tokio::test]
    async fn http_500_from_backend_degrades_with_error_prefix() {
        let pipeline = seeded_pipeline(MockGenerator::ServerError);
        let response = pipeline.ask("cloud").await.unwrap();

        assert!(response.answer.starts_with("Error connecting to Ollama:"));
        assert!(response.answer.contains("500"));
        assert_eq!(response.answer_source, AnswerSource::BackendFailure);
    }

    #[tokio::test]
    async fn malformed_backend_response_degrades_with_its_own_message() {
        let pipeline = seeded_pipeline(MockGenerator::Malformed);
        let response = pipeline.ask("cloud").await.unwrap();

        assert_eq!(response.answer, "Error: Invalid response from Ollama");
        assert_eq!(response.answer_source, AnswerSource::BackendFailure);
    }

    #[tokio::test]
    async fn embedding_failure_is_fatal() {
        let store = EmbeddingIndex::new(3);
        let pipeline =
            RagPipeline::new(store, FailingEmbedder, MockGenerator::Reply("ok".into()));
        let result = pipeline.ask("anything").await;

        assert!(matches!(result, Err(PipelineError::Embedder(_))));
    }

    #[tokio::test]
    async fn scoring_attaches_only_when_enabled() {
        let scored = seeded_pipeline(MockGenerator::Reply("We deliver.".into()));
        assert!(scored.ask("cloud").await.unwrap().quality.is_some());

        let unscored =
            seeded_pipeline(MockGenerator::Reply("We deliver.".into())).with_scoring(false);
        assert!(unscored.ask("cloud").await.unwrap().quality.is_none());
    }

    #[tokio::test]
    async fn empty_answer_scores_poor_end_to_end() {
        let pipeline = seeded_pipeline(MockGenerator::Reply(String::new()));
        let response = pipeline
            .ask("What is your experience with cloud migration?")
            .await
            .unwrap();

        let quality = response.quality.unwrap();
        assert_eq!(quality.overall, 0.0);
        assert_eq!(quality.status, crate::scoring::QualityStatus::Poor);
    }

    #[tokio::test]
    async fn batch_keeps_order_and_continues_past_failures() {
        // the embedder only fails for one specific query
        struct SelectiveEmbedder;

        #[async_trait]
        impl EmbeddingModel for SelectiveEmbedder {
            async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
                if text == "bad query" {
                    Err(EmbedderError::RequestError("boom".into()))
                } else {
                    Ok(vec![1.0, 0.0, 0.0])
                }
            }
        }

        let mut store = EmbeddingIndex::new(3);
        store
            .add(&["doc".to_string()], &[vec![1.0, 0.0, 0.0]])
            .unwrap();
        let pipeline = RagPipeline::new(
            store,
            SelectiveEmbedder,
            MockGenerator::Reply("fine".into()),
        );

        let queries = vec![
            "first".to_string(),
            "bad query".to_string(),
            "third".to_string(),
        ];
        let items = pipeline.ask_batch(&queries).await;

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].query, "first");
        assert!(matches!(items[0].outcome, BatchOutcome::Success(_)));
        assert_eq!(items[1].query, "bad query");
        assert!(matches!(items[1].outcome, BatchOutcome::Error(_)));
        assert_eq!(items[2].query, "third");
        assert!(matches!(items[2].outcome, BatchOutcome::Success(_)));
    }

    #[tokio::test]
    async fn dead_http_backend_degrades_end_to_end() {
        let mut store = EmbeddingIndex::new(3);
        store
            .add(&["doc".to_string()], &[vec![1.0, 0.0, 0.0]])
            .unwrap();
        let embedder = MockEmbedder::new(&[], vec![1.0, 0.0, 0.0]);
        // port 9 (discard) is never serving HTTP
        let generator = crate::providers::completions::Ollama::new(Some(
            r#"{"base_url": "http://127.0.0.1:9"}"#,
        ));
        let pipeline = RagPipeline::new(store, embedder, generator);

        let response = pipeline.ask("anything").await.unwrap();
        assert!(response.answer.starts_with("Error connecting to Ollama:"));
        assert_eq!(response.answer_source, AnswerSource::BackendFailure);
    }

    #[tokio::test]
    async fn index_table_reports_counts() {
        let store = EmbeddingIndex::new(3);
        let embedder = MockEmbedder::new(&[], vec![0.1, 0.2, 0.3]);
        let mut pipeline =
            RagPipeline::new(store, embedder, MockGenerator::Reply("ok".into()));

        let table = Table::new(
            vec!["Requirement".into(), "Response".into()],
            vec![
                vec!["Req one".into(), "Resp one".into()],
                vec!["".into(), "dropped".into()],
                vec!["Req two".into(), "Resp two".into()],
            ],
        );
        let report = pipeline.index_table(&table).await.unwrap();

        assert_eq!(
            report,
            IndexReport {
                documents_added: 2,
                document_ids: vec![0, 1],
                initial_count: 0,
                final_count: 2,
            }
        );
        assert_eq!(pipeline.document_count(), 2);
        assert_eq!(pipeline.dimension(), 3);
    }

    #[tokio::test]
    async fn index_table_propagates_column_detection_failure() {
        let store = EmbeddingIndex::new(3);
        let embedder = MockEmbedder::new(&[], vec![0.0, 0.0, 0.0]);
        let mut pipeline =
            RagPipeline::new(store, embedder, MockGenerator::Reply("ok".into()));

        let table = Table::new(vec!["Alpha".into()], vec![]);
        let result = pipeline.index_table(&table).await;

        assert!(matches!(
            result,
            Err(PipelineError::Indexer(IndexerError::ColumnsNotDetected { .. }))
        ));
    }
}

pub use crate::document::Document;
pub use crate::embeddings::{EmbedderError, EmbeddingModel};
pub use crate::error::Error;
pub use crate::generation::{GenerationError, GenerationModel};
pub use crate::indexer::{RfpPair, Table};
pub use crate::pipeline::{
    AnswerSource, BatchItem, BatchOutcome, IndexReport, PipelineError, RagPipeline, RagResponse,
};
pub use crate::scoring::{QualityScore, QualityStatus};
pub use crate::vector_store::{EmbeddingIndex, SearchHit, VectorStoreError};

use bidframe::prelude::*;
use bidframe::providers::completions::Ollama;
use bidframe::providers::embeddings::{OllamaEmbedding, DEFAULT_DIMENSION};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt().init();

    let mut pipeline = RagPipeline::new(
        EmbeddingIndex::new(DEFAULT_DIMENSION),
        OllamaEmbedding::new(None),
        Ollama::new(None),
    );

    let table = Table::new(
        vec!["Requirement".into(), "Response".into()],
        vec![
            vec![
                "What is your experience with cloud migration?".into(),
                "We have migrated over 40 enterprise workloads to public cloud platforms \
                 in the last five years, with a proven track record of zero-downtime cutovers."
                    .into(),
            ],
            vec![
                "Describe your data security approach.".into(),
                "All customer data is encrypted at rest and in transit, and our quality \
                 assurance program includes annual third-party penetration testing."
                    .into(),
            ],
        ],
    );
    let report = pipeline.index_table(&table).await?;
    println!("indexed {} historical responses", report.documents_added);

    let response = pipeline
        .ask("How would you migrate our workloads to the cloud?")
        .await?;
    println!("\nAnswer:\n{}", response.answer);
    if let Some(quality) = &response.quality {
        println!("\nQuality: {} ({})", quality.overall, quality.status);
        for item in &quality.feedback {
            println!("  - {item}");
        }
    }
    Ok(())
}

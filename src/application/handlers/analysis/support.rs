//! Steps shared by the analysis workflows.

use futures::future::join_all;
use futures::StreamExt;
use tracing::{debug, warn};

use crate::application::Workspace;
use crate::domain::documents::{InputSummary, RegulatoryInput, RetrievedChunk};
use crate::domain::prompt::{compose_summary, PromptBudget};
use crate::ports::{
    ChunkStream, GenerationRequest, Generator, IngestDocument, Ingestor, RetrievalError,
    Retriever,
};

/// Sends every not-yet-indexed document to the ingestor.
///
/// Best effort: failures are logged and the document stays unprocessed.
pub(super) async fn ingest_pending(
    ingestor: &dyn Ingestor,
    workspace: &mut Workspace,
    documents: Vec<IngestDocument>,
) {
    if documents.is_empty() {
        return;
    }

    let outcomes = join_all(documents.iter().map(|doc| ingestor.ingest(doc.clone()))).await;

    for (doc, outcome) in documents.iter().zip(outcomes) {
        match outcome {
            Ok(outcome) if outcome.success => workspace.mark_processed(doc.kind, &doc.id),
            Ok(outcome) => warn!(
                document = %doc.name,
                message = %outcome.message,
                "Ingestion reported failure, continuing without it"
            ),
            Err(err) => warn!(
                document = %doc.name,
                error = %err,
                "Ingestion failed, continuing without it"
            ),
        }
    }
}

/// Runs one retrieval and drains the stream.
pub(super) async fn retrieve_all(
    retriever: &dyn Retriever,
    query: &str,
    top_k: usize,
) -> Result<Vec<RetrievedChunk>, RetrievalError> {
    let stream: ChunkStream = retriever.retrieve(query, top_k).await?;
    let chunks: Vec<RetrievedChunk> = stream.collect().await;
    debug!(top_k, retrieved = chunks.len(), "Retrieval complete");
    Ok(chunks)
}

/// Summarises each input concurrently.
///
/// A failed summary becomes a placeholder; the count of failures is returned
/// alongside the summaries, which keep input order.
pub(super) async fn summarise_inputs(
    generator: &dyn Generator,
    inputs: &[RegulatoryInput],
    budget: &PromptBudget,
) -> (Vec<InputSummary>, usize) {
    let requests = inputs.iter().map(|input| {
        let prompt = compose_summary(input, budget);
        generator.generate(GenerationRequest::new(prompt.user).with_system_instruction(prompt.system))
    });
    let responses = join_all(requests).await;

    let mut failed = 0;
    let summaries = inputs
        .iter()
        .zip(responses)
        .map(|(input, response)| match response {
            Ok(response) if !response.text.trim().is_empty() => {
                InputSummary::new(&input.title, response.text.trim())
            }
            outcome => {
                failed += 1;
                match outcome {
                    Err(err) => warn!(input = %input.title, error = %err, "Summary failed"),
                    Ok(_) => warn!(input = %input.title, "Summary came back empty"),
                }
                InputSummary::new(&input.title, summary_placeholder(&input.title))
            }
        })
        .collect();

    (summaries, failed)
}

pub(super) fn summary_placeholder(title: &str) -> String {
    format!("Summary unavailable for \"{}\".", title)
}

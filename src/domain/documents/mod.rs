//! Documents module - the two corpora and retrieval evidence.
//!
//! Company documents (internal policies, procedures) and regulatory inputs
//! (legislation, guidance, regulator updates) are uploaded by the user.
//! Retrieved chunks are bounded spans of either kind, tagged with provenance.

mod chunk;
mod corpus;

pub use chunk::RetrievedChunk;
pub use corpus::{
    CompanyDocument, DocumentRef, InputSummary, RegulatoryInput, RegulatoryInputType, SourceKind,
};

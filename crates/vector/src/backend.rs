use async_trait::async_trait;
use vecgate_common::Result;

use crate::types::{Match, QueryPayload, UpsertPayload};

/// Similarity-search backend the normalizer forwards to
///
/// Implementations report an index without an embedding model as
/// `VecgateError::EmbedderNotConfigured`, never as a generic backend error.
#[async_trait]
pub trait VectorBackend: Send + Sync {
    /// Store one vector, or raw data for the index to embed
    async fn upsert(&self, payload: UpsertPayload) -> Result<()>;

    /// Ranked matches, best first
    async fn query(&self, payload: QueryPayload) -> Result<Vec<Match>>;
}

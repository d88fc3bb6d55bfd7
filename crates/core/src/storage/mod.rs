mod memory;

use crate::analysis::AnalysisResult;
use futures::future::BoxFuture;
use uuid::Uuid;

pub use memory::MemoryStore;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("analysis store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence sink for finished analyses.
pub trait AnalysisStore: Send + Sync {
    fn save(&self, result: AnalysisResult) -> BoxFuture<'_, Result<AnalysisResult, StorageError>>;

    /// Every stored analysis, newest first.
    fn list(&self) -> BoxFuture<'_, Result<Vec<AnalysisResult>, StorageError>>;

    fn get_by_id(&self, id: Uuid) -> BoxFuture<'_, Result<Option<AnalysisResult>, StorageError>>;
}

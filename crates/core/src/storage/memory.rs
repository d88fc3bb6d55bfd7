use crate::analysis::AnalysisResult;
use crate::storage::{AnalysisStore, StorageError};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local store. Clones share the same map.
#[derive(Clone, Default)]
pub struct MemoryStore {
    results: Arc<RwLock<HashMap<Uuid, AnalysisResult>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.results.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.results.read().await.is_empty()
    }
}

impl AnalysisStore for MemoryStore {
    fn save(&self, result: AnalysisResult) -> BoxFuture<'_, Result<AnalysisResult, StorageError>> {
        async move {
            self.results.write().await.insert(result.id, result.clone());
            Ok(result)
        }
        .boxed()
    }

    fn list(&self) -> BoxFuture<'_, Result<Vec<AnalysisResult>, StorageError>> {
        async move {
            let mut results: Vec<AnalysisResult> =
                self.results.read().await.values().cloned().collect();
            results.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            Ok(results)
        }
        .boxed()
    }

    fn get_by_id(&self, id: Uuid) -> BoxFuture<'_, Result<Option<AnalysisResult>, StorageError>> {
        async move { Ok(self.results.read().await.get(&id).cloned()) }.boxed()
    }
}

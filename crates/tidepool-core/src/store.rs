use crate::error::{EngineError, Result};
use crate::object::ContentObject;
use crate::stream::Stream;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// ContentService
// ---------------------------------------------------------------------------

/// The persistence collaborator consumed by the pipeline executor.
///
/// The executor calls `save` exactly once, after a successful mutate-mode
/// run; a failed run never reaches it. `reorder_children` backs the sort
/// step: it renumbers the display rank of the object's children to match
/// the given id order. Any cross-request ordering discipline (last-writer
/// wins, optimistic concurrency) is the implementation's concern.
#[async_trait]
pub trait ContentService<O: ContentObject>: Send + Sync {
    async fn save(&self, object: &O, audit_message: &str) -> Result<()>;

    async fn reorder_children(&self, parent_id: Uuid, order: &[Uuid]) -> Result<()>;
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub stream_id: Uuid,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// In-memory stream storage. Backs the server and the test suite; a
/// database-backed service implements the same traits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    streams: RwLock<HashMap<Uuid, Stream>>,
    audit: RwLock<Vec<AuditEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, stream: Stream) {
        self.streams.write().await.insert(stream.stream_id, stream);
    }

    pub async fn load(&self, stream_id: Uuid) -> Result<Stream> {
        self.streams
            .read()
            .await
            .get(&stream_id)
            .cloned()
            .ok_or_else(|| EngineError::ObjectNotFound(stream_id.to_string()))
    }

    pub async fn load_by_token(&self, token: &str) -> Result<Stream> {
        self.streams
            .read()
            .await
            .values()
            .find(|s| s.token == token)
            .cloned()
            .ok_or_else(|| EngineError::ObjectNotFound(token.to_string()))
    }

    /// Children of the given stream, ordered by rank.
    pub async fn children(&self, parent_id: Uuid) -> Vec<Stream> {
        let mut children: Vec<Stream> = self
            .streams
            .read()
            .await
            .values()
            .filter(|s| s.parent_id == Some(parent_id))
            .cloned()
            .collect();
        children.sort_by_key(|s| s.rank);
        children
    }

    pub async fn audit_log(&self) -> Vec<AuditEntry> {
        self.audit.read().await.clone()
    }
}

#[async_trait]
impl ContentService<Stream> for MemoryStore {
    async fn save(&self, object: &Stream, audit_message: &str) -> Result<()> {
        let mut stream = object.clone();
        stream.updated_date = Utc::now();
        self.streams.write().await.insert(stream.stream_id, stream);

        if !audit_message.is_empty() {
            self.audit.write().await.push(AuditEntry {
                stream_id: object.stream_id,
                message: audit_message.to_string(),
                timestamp: Utc::now(),
            });
        }

        Ok(())
    }

    async fn reorder_children(&self, parent_id: Uuid, order: &[Uuid]) -> Result<()> {
        let mut streams = self.streams.write().await;
        for (index, stream_id) in order.iter().enumerate() {
            if let Some(stream) = streams.get_mut(stream_id) {
                // Ids from the payload that name some other parent's child
                // are skipped rather than re-parented.
                if stream.parent_id == Some(parent_id) {
                    stream.rank = index as i64 + 1;
                    stream.updated_date = Utc::now();
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_and_load_by_token() {
        let store = MemoryStore::new();
        let stream = Stream::new("article", "hello-world");
        let id = stream.stream_id;
        store.put(stream).await;

        let loaded = store.load_by_token("hello-world").await.unwrap();
        assert_eq!(loaded.stream_id, id);
        assert!(store.load_by_token("missing").await.is_err());
    }

    #[tokio::test]
    async fn save_records_audit_message() {
        let store = MemoryStore::new();
        let stream = Stream::new("article", "hello-world");
        store.save(&stream, "created by test").await.unwrap();
        store.save(&stream, "").await.unwrap();

        let log = store.audit_log().await;
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].message, "created by test");
    }

    #[tokio::test]
    async fn reorder_children_renumbers_ranks() {
        let store = MemoryStore::new();
        let parent = Stream::new("folder", "parent");
        let parent_id = parent.stream_id;
        store.put(parent).await;

        let mut ids = Vec::new();
        for (i, token) in ["a", "b", "c"].iter().enumerate() {
            let mut child = Stream::new("article", *token);
            child.parent_id = Some(parent_id);
            child.rank = i as i64 + 1;
            ids.push(child.stream_id);
            store.put(child).await;
        }

        // Reverse the order.
        let reversed: Vec<Uuid> = ids.iter().rev().cloned().collect();
        store.reorder_children(parent_id, &reversed).await.unwrap();

        let children = store.children(parent_id).await;
        assert_eq!(children[0].token, "c");
        assert_eq!(children[2].token, "a");
    }

    #[tokio::test]
    async fn reorder_skips_foreign_children() {
        let store = MemoryStore::new();
        let parent = Stream::new("folder", "parent");
        let parent_id = parent.stream_id;
        store.put(parent).await;

        let mut outsider = Stream::new("article", "outsider");
        outsider.rank = 42;
        let outsider_id = outsider.stream_id;
        store.put(outsider).await;

        store
            .reorder_children(parent_id, &[outsider_id])
            .await
            .unwrap();
        assert_eq!(store.load(outsider_id).await.unwrap().rank, 42);
    }
}

//! Test double for [`DocumentStore`]. Only the unit tests and the
//! integration tests under `tests/` construct it.

use super::{DocumentError, DocumentStore, IndexSpec};
use crate::models::EntityKind;
use bson::{Bson, Document, oid::ObjectId};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct State {
    collections: HashMap<EntityKind, Vec<Document>>,
    unique_fields: HashMap<EntityKind, Vec<&'static str>>,
}

/// In-process document store with MongoDB's insert semantics: generated `_id`
/// keys and unique-index enforcement.
#[derive(Default)]
pub struct MemoryDocumentStore {
    state: Mutex<State>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn is_at_or_after(doc: &Document, field: &str, since: bson::DateTime) -> bool {
    matches!(doc.get(field), Some(Bson::DateTime(dt)) if *dt >= since)
}

fn duplicate_of(existing: &[Document], field: &str, value: &Bson) -> bool {
    !matches!(value, Bson::Null) && existing.iter().any(|d| d.get(field) == Some(value))
}

#[async_trait::async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn ping(&self) -> Result<(), DocumentError> {
        Ok(())
    }

    async fn find_all(&self, collection: EntityKind) -> Result<Vec<Document>, DocumentError> {
        Ok(self
            .lock()
            .collections
            .get(&collection)
            .cloned()
            .unwrap_or_default())
    }

    async fn find_since(
        &self,
        collection: EntityKind,
        field: &str,
        since: bson::DateTime,
    ) -> Result<Vec<Document>, DocumentError> {
        let state = self.lock();
        Ok(state
            .collections
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| is_at_or_after(d, field, since))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert_one(
        &self,
        collection: EntityKind,
        mut document: Document,
    ) -> Result<ObjectId, DocumentError> {
        let id = match document.get("_id") {
            Some(Bson::ObjectId(id)) => *id,
            Some(other) => return Err(DocumentError::UnexpectedKey(other.to_string())),
            None => {
                let id = ObjectId::new();
                document.insert("_id", id);
                id
            }
        };

        let mut state = self.lock();
        let unique_fields = state
            .unique_fields
            .get(&collection)
            .cloned()
            .unwrap_or_default();
        let docs = state.collections.entry(collection).or_default();

        for field in std::iter::once("_id").chain(unique_fields) {
            if let Some(value) = document.get(field)
                && duplicate_of(docs, field, value)
            {
                return Err(DocumentError::DuplicateKey {
                    collection,
                    field: field.to_string(),
                    value: value.to_string(),
                });
            }
        }

        docs.push(document);
        Ok(id)
    }

    async fn delete_all(&self, collection: EntityKind) -> Result<u64, DocumentError> {
        let removed = self
            .lock()
            .collections
            .remove(&collection)
            .map_or(0, |docs| docs.len());
        Ok(removed as u64)
    }

    async fn delete_since(
        &self,
        collection: EntityKind,
        field: &str,
        since: bson::DateTime,
    ) -> Result<u64, DocumentError> {
        let mut state = self.lock();
        let Some(docs) = state.collections.get_mut(&collection) else {
            return Ok(0);
        };

        let before = docs.len();
        docs.retain(|d| !is_at_or_after(d, field, since));
        Ok((before - docs.len()) as u64)
    }

    async fn count(&self, collection: EntityKind) -> Result<u64, DocumentError> {
        Ok(self
            .lock()
            .collections
            .get(&collection)
            .map_or(0, Vec::len) as u64)
    }

    async fn create_index(
        &self,
        collection: EntityKind,
        index: IndexSpec,
    ) -> Result<(), DocumentError> {
        if !index.unique {
            return Ok(());
        }

        let mut state = self.lock();
        if let Some(docs) = state.collections.get(&collection) {
            for (i, doc) in docs.iter().enumerate() {
                if let Some(value) = doc.get(index.field)
                    && duplicate_of(&docs[i + 1..], index.field, value)
                {
                    return Err(DocumentError::DuplicateKey {
                        collection,
                        field: index.field.to_string(),
                        value: value.to_string(),
                    });
                }
            }
        }

        let fields = state.unique_fields.entry(collection).or_default();
        if !fields.contains(&index.field) {
            fields.push(index.field);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_insert_generates_object_id() {
        let store = MemoryDocumentStore::new();
        let id = store
            .insert_one(EntityKind::Goods, doc! { "name": "Crate" })
            .await
            .unwrap();

        let docs = store.find_all(EntityKind::Goods).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].get_object_id("_id").unwrap(), id);
        assert_eq!(store.count(EntityKind::Goods).await.unwrap(), 1);
        assert_eq!(store.count(EntityKind::Users).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unique_index_rejects_duplicates() {
        let store = MemoryDocumentStore::new();
        store
            .create_index(EntityKind::Users, IndexSpec::unique("username"))
            .await
            .unwrap();

        store
            .insert_one(EntityKind::Users, doc! { "username": "alice" })
            .await
            .unwrap();
        let err = store
            .insert_one(EntityKind::Users, doc! { "username": "alice" })
            .await
            .unwrap_err();

        assert!(matches!(err, DocumentError::DuplicateKey { .. }));
        assert_eq!(store.count(EntityKind::Users).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unique_index_over_existing_duplicates_fails() {
        let store = MemoryDocumentStore::new();
        for _ in 0..2 {
            store
                .insert_one(EntityKind::Goods, doc! { "name": "Crate" })
                .await
                .unwrap();
        }

        let result = store
            .create_index(EntityKind::Goods, IndexSpec::unique("name"))
            .await;
        assert!(result.is_err());
        assert!(
            store
                .create_index(EntityKind::Goods, IndexSpec::plain("name"))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_since_queries() {
        let store = MemoryDocumentStore::new();
        let now = Utc::now();
        let old = bson::DateTime::from_chrono(now - Duration::days(3));
        let recent = bson::DateTime::from_chrono(now - Duration::hours(1));
        let cutoff = bson::DateTime::from_chrono(now - Duration::days(1));

        store
            .insert_one(EntityKind::UserActivities, doc! { "timestamp": old })
            .await
            .unwrap();
        store
            .insert_one(EntityKind::UserActivities, doc! { "timestamp": recent })
            .await
            .unwrap();
        store
            .insert_one(EntityKind::UserActivities, doc! { "timestamp": "not a date" })
            .await
            .unwrap();

        let found = store
            .find_since(EntityKind::UserActivities, "timestamp", cutoff)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);

        let removed = store
            .delete_since(EntityKind::UserActivities, "timestamp", cutoff)
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.count(EntityKind::UserActivities).await.unwrap(), 2);
        assert_eq!(store.delete_all(EntityKind::UserActivities).await.unwrap(), 2);
    }
}

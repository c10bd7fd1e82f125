//! Document store access.
//!
//! The sync engine talks to the document side only through [`DocumentStore`],
//! with one collection per [`EntityKind`]. [`MongoStore`] is the production
//! implementation; [`MemoryDocumentStore`] keeps collections in process and is
//! what the test suite runs against.

pub mod fields;
pub mod memory;
pub mod mongo;

pub use memory::MemoryDocumentStore;
pub use mongo::MongoStore;

use crate::models::EntityKind;
use bson::{Document, oid::ObjectId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("Duplicate key in {collection}.{field}: {value}")]
    DuplicateKey {
        collection: EntityKind,
        field: String,
        value: String,
    },

    #[error("Inserted document has a non-ObjectId key: {0}")]
    UnexpectedKey(String),
}

/// Single-field ascending index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSpec {
    pub field: &'static str,
    pub unique: bool,
}

impl IndexSpec {
    #[must_use]
    pub const fn plain(field: &'static str) -> Self {
        Self {
            field,
            unique: false,
        }
    }

    #[must_use]
    pub const fn unique(field: &'static str) -> Self {
        Self {
            field,
            unique: true,
        }
    }
}

#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Round-trips to the server. Used as the connectivity check before a run.
    async fn ping(&self) -> Result<(), DocumentError>;

    async fn find_all(&self, collection: EntityKind) -> Result<Vec<Document>, DocumentError>;

    /// Documents whose `field` is a datetime at or after `since`.
    async fn find_since(
        &self,
        collection: EntityKind,
        field: &str,
        since: bson::DateTime,
    ) -> Result<Vec<Document>, DocumentError>;

    /// Inserts one document and returns its generated `_id`.
    async fn insert_one(
        &self,
        collection: EntityKind,
        document: Document,
    ) -> Result<ObjectId, DocumentError>;

    async fn delete_all(&self, collection: EntityKind) -> Result<u64, DocumentError>;

    async fn delete_since(
        &self,
        collection: EntityKind,
        field: &str,
        since: bson::DateTime,
    ) -> Result<u64, DocumentError>;

    async fn count(&self, collection: EntityKind) -> Result<u64, DocumentError>;

    async fn create_index(
        &self,
        collection: EntityKind,
        index: IndexSpec,
    ) -> Result<(), DocumentError>;
}

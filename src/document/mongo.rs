use super::{DocumentError, DocumentStore, IndexSpec};
use crate::config::MongoConfig;
use crate::models::EntityKind;
use bson::{Document, doc, oid::ObjectId};
use futures::TryStreamExt;
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, Database, IndexModel};
use std::time::Duration;
use tracing::info;

pub struct MongoStore {
    client: Client,
    database: Database,
}

impl MongoStore {
    /// Connects and pings. A store that cannot answer the ping is a fatal error for the run.
    pub async fn connect(config: &MongoConfig) -> Result<Self, DocumentError> {
        let mut options = ClientOptions::parse(&config.url).await?;
        options.app_name = Some(config.app_name.clone());
        options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_seconds));
        options.server_selection_timeout =
            Some(Duration::from_secs(config.connect_timeout_seconds));

        let client = Client::with_options(options)?;
        let database = client.database(&config.database);
        let store = Self { client, database };

        store.ping().await?;
        info!("Connected to MongoDB database '{}'", config.database);

        Ok(store)
    }

    fn collection(&self, kind: EntityKind) -> Collection<Document> {
        self.database.collection(kind.as_str())
    }

    pub async fn shutdown(self) {
        self.client.shutdown().await;
    }
}

#[async_trait::async_trait]
impl DocumentStore for MongoStore {
    async fn ping(&self) -> Result<(), DocumentError> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn find_all(&self, collection: EntityKind) -> Result<Vec<Document>, DocumentError> {
        let cursor = self.collection(collection).find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_since(
        &self,
        collection: EntityKind,
        field: &str,
        since: bson::DateTime,
    ) -> Result<Vec<Document>, DocumentError> {
        let cursor = self
            .collection(collection)
            .find(doc! { field: { "$gte": since } })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn insert_one(
        &self,
        collection: EntityKind,
        document: Document,
    ) -> Result<ObjectId, DocumentError> {
        let result = self.collection(collection).insert_one(document).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| DocumentError::UnexpectedKey(result.inserted_id.to_string()))
    }

    async fn delete_all(&self, collection: EntityKind) -> Result<u64, DocumentError> {
        let result = self.collection(collection).delete_many(doc! {}).await?;
        Ok(result.deleted_count)
    }

    async fn delete_since(
        &self,
        collection: EntityKind,
        field: &str,
        since: bson::DateTime,
    ) -> Result<u64, DocumentError> {
        let result = self
            .collection(collection)
            .delete_many(doc! { field: { "$gte": since } })
            .await?;
        Ok(result.deleted_count)
    }

    async fn count(&self, collection: EntityKind) -> Result<u64, DocumentError> {
        Ok(self.collection(collection).count_documents(doc! {}).await?)
    }

    async fn create_index(
        &self,
        collection: EntityKind,
        index: IndexSpec,
    ) -> Result<(), DocumentError> {
        let field = index.field;
        let model = IndexModel::builder()
            .keys(doc! { field: 1 })
            .options(IndexOptions::builder().unique(index.unique).build())
            .build();

        self.collection(collection).create_index(model).await?;
        Ok(())
    }
}

use super::RecordError;
use crate::entities::branches;
use crate::sync::datetime;
use bson::{Document, doc, oid::ObjectId};
use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRecord {
    pub name: String,
    pub location: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub manager_id: Option<i32>,
    pub capacity: Option<i32>,
    pub available_space: Option<i32>,
    pub created_at: Option<NaiveDateTime>,
}

impl BranchRecord {
    pub fn from_row(row: &branches::Model) -> Result<Self, RecordError> {
        if row.name.is_empty() {
            return Err(RecordError::MissingField("name"));
        }

        Ok(Self {
            name: row.name.clone(),
            location: row.location.clone(),
            description: row.description.clone(),
            image_url: row.image_url.clone(),
            manager_id: row.manager_id,
            capacity: row.capacity,
            available_space: row.available_space,
            created_at: datetime::parse_source_format(row.created_at.as_deref()),
        })
    }

    /// `manager` is the manager's document key, already resolved by the caller.
    #[must_use]
    pub fn to_document(
        &self,
        manager: Option<ObjectId>,
        sqlite_id: Option<i32>,
        captured_at: NaiveDateTime,
    ) -> Document {
        doc! {
            "name": self.name.clone(),
            "location": self.location.clone(),
            "description": self.description.clone(),
            "image_url": self.image_url.clone(),
            "manager_id": manager,
            "capacity": self.capacity,
            "available_space": self.available_space,
            "created_at": datetime::to_document(self.created_at.unwrap_or(captured_at)),
            "sqlite_id": sqlite_id,
        }
    }
}

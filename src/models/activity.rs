use super::RecordError;
use crate::document::fields;
use crate::entities::user_activities;
use crate::sync::datetime;
use bson::{Bson, Document, doc, oid::ObjectId};
use chrono::NaiveDateTime;

/// Who an activity belongs to, in the key space of the store it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserRef {
    Relational(i32),
    Document(ObjectId),
    /// Some older documents reference the user by username instead of `_id`.
    Username(String),
}

/// An append-only audit entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRecord {
    pub user: UserRef,
    pub action: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub timestamp: Option<NaiveDateTime>,
}

impl ActivityRecord {
    pub fn from_row(row: &user_activities::Model) -> Result<Self, RecordError> {
        if row.action.is_empty() {
            return Err(RecordError::MissingField("action"));
        }

        Ok(Self {
            user: UserRef::Relational(row.user_id),
            action: row.action.clone(),
            description: row.description.clone(),
            category: row.category.clone(),
            ip_address: row.ip_address.clone(),
            user_agent: row.user_agent.clone(),
            timestamp: datetime::parse_source_format(row.timestamp.as_deref()),
        })
    }

    pub fn from_document(doc: &Document) -> Result<Self, RecordError> {
        let user = match doc.get("user_id") {
            Some(Bson::ObjectId(id)) => UserRef::Document(*id),
            Some(Bson::String(username)) if !username.is_empty() => {
                UserRef::Username(username.clone())
            }
            None | Some(Bson::Null) => return Err(RecordError::MissingField("user_id")),
            Some(other) => {
                return Err(RecordError::InvalidField {
                    field: "user_id",
                    value: other.to_string(),
                });
            }
        };

        Ok(Self {
            user,
            action: fields::required_str(doc, "action")?,
            description: fields::optional_str(doc, "description"),
            category: fields::optional_str(doc, "category"),
            ip_address: fields::optional_str(doc, "ip_address"),
            user_agent: fields::optional_str(doc, "user_agent"),
            timestamp: fields::timestamp(doc, "timestamp"),
        })
    }

    /// `user` is the owner's document key, resolved by the caller.
    #[must_use]
    pub fn to_document(
        &self,
        user: ObjectId,
        sqlite_id: Option<i32>,
        captured_at: NaiveDateTime,
    ) -> Document {
        doc! {
            "user_id": user,
            "action": self.action.clone(),
            "description": self.description.clone(),
            "category": self.category.clone(),
            "ip_address": self.ip_address.clone(),
            "user_agent": self.user_agent.clone(),
            "timestamp": datetime::to_document(self.timestamp.unwrap_or(captured_at)),
            "sqlite_id": sqlite_id,
        }
    }
}

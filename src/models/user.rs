use super::{RecordError, Role};
use crate::document::fields;
use crate::entities::users;
use crate::sync::datetime;
use bson::{Document, doc, oid::ObjectId};
use chrono::NaiveDateTime;

/// A user as it travels between stores. The username is the natural key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    /// Relational branch id; branches are never reconciled so the integer is kept in both stores.
    pub branch_id: Option<i32>,
    pub last_login: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
}

impl UserRecord {
    pub fn from_row(row: &users::Model) -> Result<Self, RecordError> {
        if row.username.is_empty() {
            return Err(RecordError::MissingField("username"));
        }

        Ok(Self {
            username: row.username.clone(),
            email: row.email.clone(),
            hashed_password: row.hashed_password.clone(),
            role: row.role.parse()?,
            first_name: row.first_name.clone(),
            last_name: row.last_name.clone(),
            phone: row.phone.clone(),
            address: row.address.clone(),
            is_active: row.is_active,
            branch_id: row.branch_id,
            last_login: datetime::parse_source_format(row.last_login.as_deref()),
            created_at: datetime::parse_source_format(row.created_at.as_deref()),
        })
    }

    pub fn from_document(doc: &Document) -> Result<Self, RecordError> {
        Ok(Self {
            username: fields::required_str(doc, "username")?,
            email: fields::required_str(doc, "email")?,
            hashed_password: fields::required_str(doc, "hashed_password")?,
            role: fields::required_str(doc, "role")?.parse()?,
            first_name: fields::optional_str(doc, "first_name"),
            last_name: fields::optional_str(doc, "last_name"),
            phone: fields::optional_str(doc, "phone"),
            address: fields::optional_str(doc, "address"),
            is_active: fields::bool_or(doc, "is_active", true),
            branch_id: fields::optional_i32(doc, "branch_id"),
            last_login: fields::timestamp(doc, "last_login"),
            created_at: fields::timestamp(doc, "created_at"),
        })
    }

    #[must_use]
    pub fn to_document(&self, sqlite_id: Option<i32>, captured_at: NaiveDateTime) -> Document {
        doc! {
            "username": self.username.clone(),
            "email": self.email.clone(),
            "hashed_password": self.hashed_password.clone(),
            "role": self.role.as_str(),
            "first_name": self.first_name.clone(),
            "last_name": self.last_name.clone(),
            "phone": self.phone.clone(),
            "address": self.address.clone(),
            "is_active": self.is_active,
            "branch_id": self.branch_id,
            "last_login": self.last_login.map(datetime::to_document),
            "created_at": datetime::to_document(self.created_at.unwrap_or(captured_at)),
            "sqlite_id": sqlite_id,
        }
    }
}

/// Extracts `(username, _id)` from a user document, for identity mapping.
#[must_use]
pub fn document_key(doc: &Document) -> Option<(String, ObjectId)> {
    let username = fields::required_str(doc, "username").ok()?;
    let id = fields::object_id(doc).ok()?;
    Some((username, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::Bson;

    fn row() -> users::Model {
        users::Model {
            id: 4,
            username: "alice".to_string(),
            email: "alice@stockhub.test".to_string(),
            hashed_password: "$argon2id$hash".to_string(),
            role: "employee".to_string(),
            first_name: Some("Alice".to_string()),
            last_name: None,
            phone: None,
            address: Some("1 Dock Road".to_string()),
            is_active: true,
            branch_id: Some(2),
            last_login: Some("garbage".to_string()),
            created_at: Some("2025-08-30 09:00:00.000000".to_string()),
        }
    }

    #[test]
    fn test_row_to_document_keeps_back_reference() {
        let record = UserRecord::from_row(&row()).unwrap();
        let captured = datetime::now();
        let doc = record.to_document(Some(4), captured);

        assert_eq!(doc.get_str("role").unwrap(), "employee");
        assert_eq!(doc.get_i32("sqlite_id").unwrap(), 4);
        assert_eq!(doc.get_i32("branch_id").unwrap(), 2);
        assert_eq!(doc.get("last_login"), Some(&Bson::Null));
        assert!(doc.get_datetime("created_at").is_ok());
    }

    #[test]
    fn test_missing_created_at_uses_capture_time() {
        let mut row = row();
        row.created_at = Some("not a date".to_string());
        let record = UserRecord::from_row(&row).unwrap();
        let captured = datetime::now();

        let doc = record.to_document(None, captured);
        assert_eq!(
            *doc.get_datetime("created_at").unwrap(),
            datetime::to_document(captured)
        );
        assert_eq!(doc.get("sqlite_id"), Some(&Bson::Null));
    }

    #[test]
    fn test_invalid_role_is_rejected() {
        let mut row = row();
        row.role = "root".to_string();
        assert!(matches!(
            UserRecord::from_row(&row),
            Err(RecordError::InvalidField { field: "role", .. })
        ));
    }

    #[test]
    fn test_from_document_requires_credentials() {
        let doc = doc! { "username": "carol", "email": "carol@stockhub.test", "role": "customer" };
        assert_eq!(
            UserRecord::from_document(&doc),
            Err(RecordError::MissingField("hashed_password"))
        );
    }

    #[test]
    fn test_document_key() {
        let id = ObjectId::new();
        assert_eq!(
            document_key(&doc! { "_id": id, "username": "carol" }),
            Some(("carol".to_string(), id))
        );
        assert_eq!(document_key(&doc! { "_id": id }), None);
    }
}

use super::{AssignmentStatus, Priority, RecordError};
use crate::entities::assignments;
use crate::sync::datetime;
use bson::{Document, doc, oid::ObjectId};
use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentRecord {
    pub employee_id: Option<i32>,
    pub task: String,
    pub description: Option<String>,
    pub status: AssignmentStatus,
    pub priority: Priority,
    pub branch_id: Option<i32>,
    pub due_date: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl AssignmentRecord {
    pub fn from_row(row: &assignments::Model) -> Result<Self, RecordError> {
        if row.task.is_empty() {
            return Err(RecordError::MissingField("task"));
        }

        Ok(Self {
            employee_id: row.employee_id,
            task: row.task.clone(),
            description: row.description.clone(),
            status: row.status.parse()?,
            priority: row.priority.parse()?,
            branch_id: row.branch_id,
            due_date: datetime::parse_source_format(row.due_date.as_deref()),
            created_at: datetime::parse_source_format(row.created_at.as_deref()),
            updated_at: datetime::parse_source_format(row.updated_at.as_deref()),
        })
    }

    #[must_use]
    pub fn to_document(
        &self,
        employee: Option<ObjectId>,
        sqlite_id: Option<i32>,
        captured_at: NaiveDateTime,
    ) -> Document {
        doc! {
            "employee_id": employee,
            "task": self.task.clone(),
            "description": self.description.clone(),
            "status": self.status.as_str(),
            "priority": self.priority.as_str(),
            "branch_id": self.branch_id,
            "due_date": self.due_date.map(datetime::to_document),
            "created_at": datetime::to_document(self.created_at.unwrap_or(captured_at)),
            "updated_at": datetime::to_document(self.updated_at.unwrap_or(captured_at)),
            "sqlite_id": sqlite_id,
        }
    }
}

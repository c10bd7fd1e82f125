use crate::entities::{assignments, prelude::*};
use crate::models::AssignmentRecord;
use crate::sync::datetime;
use chrono::NaiveDateTime;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect, Set};

pub struct AssignmentRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> AssignmentRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<assignments::Model>, DbErr> {
        Assignments::find()
            .order_by_asc(assignments::Column::Id)
            .all(self.conn)
            .await
    }

    pub async fn tasks(&self) -> Result<Vec<String>, DbErr> {
        Assignments::find()
            .select_only()
            .column(assignments::Column::Task)
            .into_tuple()
            .all(self.conn)
            .await
    }

    pub async fn insert(
        &self,
        record: &AssignmentRecord,
        captured_at: NaiveDateTime,
    ) -> Result<i32, DbErr> {
        let active = assignments::ActiveModel {
            employee_id: Set(record.employee_id),
            task: Set(record.task.clone()),
            description: Set(record.description.clone()),
            status: Set(record.status.as_str().to_string()),
            priority: Set(record.priority.as_str().to_string()),
            branch_id: Set(record.branch_id),
            due_date: Set(record.due_date.map(datetime::to_relational)),
            created_at: Set(Some(datetime::to_relational(
                record.created_at.unwrap_or(captured_at),
            ))),
            updated_at: Set(Some(datetime::to_relational(
                record.updated_at.unwrap_or(captured_at),
            ))),
            ..Default::default()
        };

        Ok(Assignments::insert(active)
            .exec(self.conn)
            .await?
            .last_insert_id)
    }

    pub async fn count(&self) -> Result<u64, DbErr> {
        Assignments::find().count(self.conn).await
    }
}

use crate::entities::{prelude::*, user_activities};
use crate::models::ActivityRecord;
use crate::sync::datetime;
use chrono::NaiveDateTime;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

/// Audit log rows. Inserted and deleted, never updated.
pub struct ActivityRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> ActivityRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<user_activities::Model>, DbErr> {
        UserActivities::find()
            .order_by_asc(user_activities::Column::Id)
            .all(self.conn)
            .await
    }

    /// `user_id` is the owner's relational key, already resolved by the caller.
    pub async fn insert(
        &self,
        user_id: i32,
        record: &ActivityRecord,
        captured_at: NaiveDateTime,
    ) -> Result<i32, DbErr> {
        let active = user_activities::ActiveModel {
            user_id: Set(user_id),
            action: Set(record.action.clone()),
            description: Set(record.description.clone()),
            category: Set(record.category.clone()),
            ip_address: Set(record.ip_address.clone()),
            user_agent: Set(record.user_agent.clone()),
            timestamp: Set(Some(datetime::to_relational(
                record.timestamp.unwrap_or(captured_at),
            ))),
            ..Default::default()
        };

        Ok(UserActivities::insert(active)
            .exec(self.conn)
            .await?
            .last_insert_id)
    }

    pub async fn delete_all(&self) -> Result<u64, DbErr> {
        let res = UserActivities::delete_many().exec(self.conn).await?;
        Ok(res.rows_affected)
    }

    /// Deletes rows whose timestamp sorts at or after `cutoff`. Timestamps are
    /// text, so this relies on them being in the relational format.
    pub async fn delete_since(&self, cutoff: NaiveDateTime) -> Result<u64, DbErr> {
        let res = UserActivities::delete_many()
            .filter(user_activities::Column::Timestamp.gte(datetime::to_relational(cutoff)))
            .exec(self.conn)
            .await?;
        Ok(res.rows_affected)
    }

    pub async fn count(&self) -> Result<u64, DbErr> {
        UserActivities::find().count(self.conn).await
    }
}

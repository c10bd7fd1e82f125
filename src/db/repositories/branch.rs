use crate::entities::{branches, prelude::*};
use crate::models::BranchRecord;
use crate::sync::datetime;
use chrono::NaiveDateTime;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect, Set};

pub struct BranchRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> BranchRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<branches::Model>, DbErr> {
        Branches::find()
            .order_by_asc(branches::Column::Id)
            .all(self.conn)
            .await
    }

    pub async fn names(&self) -> Result<Vec<String>, DbErr> {
        Branches::find()
            .select_only()
            .column(branches::Column::Name)
            .into_tuple()
            .all(self.conn)
            .await
    }

    pub async fn insert(
        &self,
        record: &BranchRecord,
        captured_at: NaiveDateTime,
    ) -> Result<i32, DbErr> {
        let active = branches::ActiveModel {
            name: Set(record.name.clone()),
            location: Set(record.location.clone()),
            description: Set(record.description.clone()),
            image_url: Set(record.image_url.clone()),
            manager_id: Set(record.manager_id),
            capacity: Set(record.capacity),
            available_space: Set(record.available_space),
            created_at: Set(Some(datetime::to_relational(
                record.created_at.unwrap_or(captured_at),
            ))),
            ..Default::default()
        };

        Ok(Branches::insert(active).exec(self.conn).await?.last_insert_id)
    }

    pub async fn count(&self) -> Result<u64, DbErr> {
        Branches::find().count(self.conn).await
    }
}

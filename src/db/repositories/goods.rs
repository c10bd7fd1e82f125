use crate::entities::{goods, prelude::*};
use crate::models::GoodsRecord;
use crate::sync::datetime;
use chrono::NaiveDateTime;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect, Set};

pub struct GoodsRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> GoodsRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<goods::Model>, DbErr> {
        Goods::find()
            .order_by_asc(goods::Column::Id)
            .all(self.conn)
            .await
    }

    pub async fn names(&self) -> Result<Vec<String>, DbErr> {
        Goods::find()
            .select_only()
            .column(goods::Column::Name)
            .into_tuple()
            .all(self.conn)
            .await
    }

    pub async fn insert(
        &self,
        record: &GoodsRecord,
        captured_at: NaiveDateTime,
    ) -> Result<i32, DbErr> {
        let active = goods::ActiveModel {
            name: Set(record.name.clone()),
            description: Set(record.description.clone()),
            category: Set(record.category.clone()),
            quantity: Set(record.quantity),
            price_per_unit: Set(record.price_per_unit),
            owner_id: Set(record.owner_id),
            branch_id: Set(record.branch_id),
            created_at: Set(Some(datetime::to_relational(
                record.created_at.unwrap_or(captured_at),
            ))),
            updated_at: Set(Some(datetime::to_relational(
                record.updated_at.unwrap_or(captured_at),
            ))),
            ..Default::default()
        };

        Ok(Goods::insert(active).exec(self.conn).await?.last_insert_id)
    }

    pub async fn count(&self) -> Result<u64, DbErr> {
        Goods::find().count(self.conn).await
    }
}

use crate::entities::{customer_applications, prelude::*};
use crate::models::ApplicationRecord;
use crate::sync::datetime;
use chrono::NaiveDateTime;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

pub struct ApplicationRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> ApplicationRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<customer_applications::Model>, DbErr> {
        CustomerApplications::find()
            .order_by_asc(customer_applications::Column::Id)
            .all(self.conn)
            .await
    }

    /// Applications whose `updated_at` sorts at or after `cutoff`.
    pub async fn updated_since(
        &self,
        cutoff: NaiveDateTime,
    ) -> Result<Vec<customer_applications::Model>, DbErr> {
        CustomerApplications::find()
            .filter(customer_applications::Column::UpdatedAt.gte(datetime::to_relational(cutoff)))
            .order_by_asc(customer_applications::Column::Id)
            .all(self.conn)
            .await
    }

    pub async fn insert(
        &self,
        record: &ApplicationRecord,
        captured_at: NaiveDateTime,
    ) -> Result<i32, DbErr> {
        let active = customer_applications::ActiveModel {
            full_name: Set(record.full_name.clone()),
            email: Set(record.email.clone()),
            phone: Set(record.phone.clone()),
            address: Set(record.address.clone()),
            is_business_account: Set(record.is_business_account),
            business_name: Set(record.business_name.clone()),
            business_type: Set(record.business_type.clone()),
            item_type: Set(record.item_type.clone()),
            estimated_volume: Set(record.estimated_volume.clone()),
            storage_type: Set(record.storage_type.clone()),
            access_frequency: Set(record.access_frequency.clone()),
            storage_duration: Set(record.storage_duration.clone()),
            special_requirements: Set(record.special_requirements.clone()),
            insurance_required: Set(record.insurance_required),
            packing_services: Set(record.packing_services),
            transportation_needed: Set(record.transportation_needed),
            inventory_list_url: Set(record.inventory_list_url.clone()),
            identification_doc_url: Set(record.identification_doc_url.clone()),
            status: Set(record.status.as_str().to_string()),
            employee_notes: Set(record.employee_notes.clone()),
            reviewed_by: Set(record.reviewed_by),
            review_date: Set(record.review_date.map(datetime::to_relational)),
            created_at: Set(Some(datetime::to_relational(
                record.created_at.unwrap_or(captured_at),
            ))),
            updated_at: Set(Some(datetime::to_relational(
                record.updated_at.unwrap_or(captured_at),
            ))),
            ..Default::default()
        };

        Ok(CustomerApplications::insert(active)
            .exec(self.conn)
            .await?
            .last_insert_id)
    }

    pub async fn count(&self) -> Result<u64, DbErr> {
        CustomerApplications::find().count(self.conn).await
    }
}

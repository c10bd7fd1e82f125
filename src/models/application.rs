use super::{ApplicationStatus, RecordError};
use crate::entities::customer_applications;
use crate::sync::datetime;
use bson::{Document, doc, oid::ObjectId};
use chrono::NaiveDateTime;

/// Prospective-customer intake form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationRecord {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub is_business_account: bool,
    pub business_name: Option<String>,
    pub business_type: Option<String>,
    pub item_type: String,
    pub estimated_volume: Option<String>,
    pub storage_type: String,
    pub access_frequency: Option<String>,
    pub storage_duration: Option<String>,
    pub special_requirements: Option<String>,
    pub insurance_required: bool,
    pub packing_services: bool,
    pub transportation_needed: bool,
    pub inventory_list_url: Option<String>,
    pub identification_doc_url: Option<String>,
    pub status: ApplicationStatus,
    pub employee_notes: Option<String>,
    pub reviewed_by: Option<i32>,
    pub review_date: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

fn required(value: &str, field: &'static str) -> Result<String, RecordError> {
    if value.trim().is_empty() {
        Err(RecordError::MissingField(field))
    } else {
        Ok(value.to_string())
    }
}

impl ApplicationRecord {
    pub fn from_row(row: &customer_applications::Model) -> Result<Self, RecordError> {
        Ok(Self {
            full_name: required(&row.full_name, "full_name")?,
            email: required(&row.email, "email")?,
            phone: required(&row.phone, "phone")?,
            address: row.address.clone(),
            is_business_account: row.is_business_account,
            business_name: row.business_name.clone(),
            business_type: row.business_type.clone(),
            item_type: required(&row.item_type, "item_type")?,
            estimated_volume: row.estimated_volume.clone(),
            storage_type: required(&row.storage_type, "storage_type")?,
            access_frequency: row.access_frequency.clone(),
            storage_duration: row.storage_duration.clone(),
            special_requirements: row.special_requirements.clone(),
            insurance_required: row.insurance_required,
            packing_services: row.packing_services,
            transportation_needed: row.transportation_needed,
            inventory_list_url: row.inventory_list_url.clone(),
            identification_doc_url: row.identification_doc_url.clone(),
            status: row.status.parse()?,
            employee_notes: row.employee_notes.clone(),
            reviewed_by: row.reviewed_by,
            review_date: datetime::parse_source_format(row.review_date.as_deref()),
            created_at: datetime::parse_source_format(row.created_at.as_deref()),
            updated_at: datetime::parse_source_format(row.updated_at.as_deref()),
        })
    }

    #[must_use]
    pub fn to_document(
        &self,
        reviewer: Option<ObjectId>,
        sqlite_id: Option<i32>,
        captured_at: NaiveDateTime,
    ) -> Document {
        doc! {
            "full_name": self.full_name.clone(),
            "email": self.email.clone(),
            "phone": self.phone.clone(),
            "address": self.address.clone(),
            "is_business_account": self.is_business_account,
            "business_name": self.business_name.clone(),
            "business_type": self.business_type.clone(),
            "item_type": self.item_type.clone(),
            "estimated_volume": self.estimated_volume.clone(),
            "storage_type": self.storage_type.clone(),
            "access_frequency": self.access_frequency.clone(),
            "storage_duration": self.storage_duration.clone(),
            "special_requirements": self.special_requirements.clone(),
            "insurance_required": self.insurance_required,
            "packing_services": self.packing_services,
            "transportation_needed": self.transportation_needed,
            "inventory_list_url": self.inventory_list_url.clone(),
            "identification_doc_url": self.identification_doc_url.clone(),
            "status": self.status.as_str(),
            "employee_notes": self.employee_notes.clone(),
            "reviewed_by": reviewer,
            "review_date": self.review_date.map(datetime::to_document),
            "created_at": datetime::to_document(self.created_at.unwrap_or(captured_at)),
            "updated_at": datetime::to_document(self.updated_at.unwrap_or(captured_at)),
            "sqlite_id": sqlite_id,
        }
    }
}

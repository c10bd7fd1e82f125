use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "customer_applications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub full_name: String,
    pub email: String,
    pub phone: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub address: Option<String>,

    pub is_business_account: bool,
    pub business_name: Option<String>,
    pub business_type: Option<String>,

    pub item_type: String,
    pub estimated_volume: Option<String>,
    pub storage_type: String,
    pub access_frequency: Option<String>,
    pub storage_duration: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub special_requirements: Option<String>,

    pub insurance_required: bool,
    pub packing_services: bool,
    pub transportation_needed: bool,

    /// Public URLs of documents held by the external object store
    pub inventory_list_url: Option<String>,
    pub identification_doc_url: Option<String>,

    /// pending, under_review, approved or rejected
    pub status: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub employee_notes: Option<String>,
    pub reviewed_by: Option<i32>,
    pub review_date: Option<String>,

    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

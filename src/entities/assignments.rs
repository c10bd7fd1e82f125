use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "assignments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub employee_id: Option<i32>,
    pub task: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// pending, in_progress or completed; any value may follow any other
    pub status: String,
    /// low, medium or high
    pub priority: String,
    pub branch_id: Option<i32>,
    pub due_date: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

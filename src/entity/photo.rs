//! Photo entity for SeaORM.
//!
//! Only accepted uploads are persisted; rejected files never get a row.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "photos")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub session_id: String,

    // Camera position, stored as supplied by the caller
    pub angle_index: i32,
    pub angle_label: String,

    pub file_path: String,
    pub captured_at: DateTimeUtc,

    // Validation outcome
    pub is_valid: bool,
    pub validation_message: Option<String>,

    pub upload_status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::session::Entity",
        from = "Column::SessionId",
        to = "super::session::Column::Id",
        on_delete = "Cascade"
    )]
    Session,
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! Damage entity. Enumerated columns hold only vocabulary members.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "damages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub analysis_id: String,
    pub damage_type: String,
    pub severity: String,
    pub zone: String,
    pub description: Option<String>,
    pub bounding_box: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::analysis_result::Entity",
        from = "Column::AnalysisId",
        to = "super::analysis_result::Column::Id",
        on_delete = "Cascade"
    )]
    AnalysisResult,
}

impl Related<super::analysis_result::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AnalysisResult.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

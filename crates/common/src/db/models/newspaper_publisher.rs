//! Newspaper-publisher join entity
//!
//! Composite primary key keeps each (newspaper, redactor) pair unique.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "newspaper_publishers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub newspaper_id: Uuid,

    #[sea_orm(primary_key, auto_increment = false)]
    pub redactor_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::newspaper::Entity",
        from = "Column::NewspaperId",
        to = "super::newspaper::Column::Id",
        on_delete = "Cascade"
    )]
    Newspaper,

    #[sea_orm(
        belongs_to = "super::redactor::Entity",
        from = "Column::RedactorId",
        to = "super::redactor::Column::Id",
        on_delete = "Cascade"
    )]
    Redactor,
}

impl Related<super::newspaper::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Newspaper.def()
    }
}

impl Related<super::redactor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Redactor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

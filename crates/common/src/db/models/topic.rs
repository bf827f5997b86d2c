//! Topic entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "topics")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(column_type = "Text", unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::newspaper::Entity", on_delete = "Cascade")]
    Newspapers,
}

impl Related<super::newspaper::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Newspapers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

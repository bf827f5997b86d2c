//! Newspaper entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "newspapers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// Set once at creation and never updated afterwards
    pub published_date: DateTimeWithTimeZone,

    pub topic_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::topic::Entity",
        from = "Column::TopicId",
        to = "super::topic::Column::Id",
        on_delete = "Cascade"
    )]
    Topic,

    #[sea_orm(has_many = "super::newspaper_publisher::Entity", on_delete = "Cascade")]
    NewspaperPublishers,
}

impl Related<super::topic::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Topic.def()
    }
}

impl Related<super::newspaper_publisher::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NewspaperPublishers.def()
    }
}

impl Related<super::redactor::Entity> for Entity {
    fn to() -> RelationDef {
        super::newspaper_publisher::Relation::Redactor.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::newspaper_publisher::Relation::Newspaper.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

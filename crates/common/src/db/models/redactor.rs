//! Redactor entity
//!
//! A redactor is both an authorable account (username, password hash) and
//! the publisher side of the newspaper many-to-many association.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "redactors")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(column_type = "Text", unique)]
    pub username: String,

    #[sea_orm(column_type = "Text")]
    pub first_name: String,

    #[sea_orm(column_type = "Text")]
    pub last_name: String,

    #[sea_orm(column_type = "Text")]
    pub email: String,

    /// Argon2 PHC string, never serialized
    #[sea_orm(column_type = "Text")]
    #[serde(skip)]
    pub password_hash: String,

    pub years_of_experience: i32,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::newspaper_publisher::Entity", on_delete = "Cascade")]
    NewspaperPublishers,
}

impl Related<super::newspaper_publisher::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NewspaperPublishers.def()
    }
}

impl Related<super::newspaper::Entity> for Entity {
    fn to() -> RelationDef {
        super::newspaper_publisher::Relation::Newspaper.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::newspaper_publisher::Relation::Redactor.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

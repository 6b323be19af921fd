//! Category registry per user.
//!
//! A category belongs to exactly one [`Kind`]; the engine rejects
//! transactions whose category kind does not match.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{EngineError, Kind};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub name_norm: String,
    pub kind: String,
    pub color: String,
    pub icon: String,
    pub is_custom: bool,
    pub archived: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// A category as exposed by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub kind: Kind,
    pub color: String,
    pub icon: String,
    pub is_custom: bool,
    pub archived: bool,
}

impl TryFrom<Model> for Category {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            kind: Kind::try_from(model.kind.as_str())?,
            color: model.color,
            icon: model.icon,
            is_custom: model.is_custom,
            archived: model.archived,
        })
    }
}

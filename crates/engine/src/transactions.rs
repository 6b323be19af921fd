//! Transaction primitives.
//!
//! A `Transaction` is a single income or expense event. The amount is
//! stored as unsigned integer cents; the sign is implicit in the kind.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Kind, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl TryFrom<&str> for Frequency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(EngineError::InvalidField(format!(
                "invalid recurrence frequency: {other}"
            ))),
        }
    }
}

/// How often a transaction repeats and, optionally, until when.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    pub frequency: Frequency,
    pub end_date: Option<NaiveDate>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: String,
    pub category_id: Uuid,
    pub kind: Kind,
    pub amount_minor: i64,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
    pub payment_method: Option<String>,
    pub tags: Vec<String>,
    pub recurrence: Option<Recurrence>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    pub category_id: Uuid,
    pub kind: String,
    pub amount_minor: i64,
    pub description: String,
    pub occurred_at: DateTimeUtc,
    pub payment_method: Option<String>,
    /// JSON array of free-text tags.
    pub tags: String,
    pub recurrence_frequency: Option<String>,
    pub recurrence_end: Option<Date>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Category,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

fn encode_tags(tags: &[String]) -> ResultEngine<String> {
    serde_json::to_string(tags)
        .map_err(|_| EngineError::InvalidField("invalid tags".to_string()))
}

fn decode_tags(raw: &str) -> ResultEngine<Vec<String>> {
    serde_json::from_str(raw).map_err(|_| EngineError::InvalidField("invalid tags".to_string()))
}

impl TryFrom<&Transaction> for ActiveModel {
    type Error = EngineError;

    fn try_from(tx: &Transaction) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ActiveValue::Set(tx.id),
            user_id: ActiveValue::Set(tx.user_id.clone()),
            category_id: ActiveValue::Set(tx.category_id),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            description: ActiveValue::Set(tx.description.clone()),
            occurred_at: ActiveValue::Set(tx.occurred_at),
            payment_method: ActiveValue::Set(tx.payment_method.clone()),
            tags: ActiveValue::Set(encode_tags(&tx.tags)?),
            recurrence_frequency: ActiveValue::Set(
                tx.recurrence.as_ref().map(|r| r.frequency.as_str().to_string()),
            ),
            recurrence_end: ActiveValue::Set(tx.recurrence.as_ref().and_then(|r| r.end_date)),
            created_at: ActiveValue::Set(tx.created_at),
            updated_at: ActiveValue::Set(tx.updated_at),
        })
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let recurrence = match model.recurrence_frequency.as_deref() {
            None => None,
            Some(raw) => Some(Recurrence {
                frequency: Frequency::try_from(raw)?,
                end_date: model.recurrence_end,
            }),
        };
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            category_id: model.category_id,
            kind: Kind::try_from(model.kind.as_str())?,
            amount_minor: model.amount_minor,
            description: model.description,
            occurred_at: model.occurred_at,
            payment_method: model.payment_method,
            tags: decode_tags(&model.tags)?,
            recurrence,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl Transaction {
    /// The amount with the sign implied by the kind: income positive,
    /// expense negative.
    pub fn signed_amount_minor(&self) -> i64 {
        match self.kind {
            Kind::Income => self.amount_minor,
            Kind::Expense => -self.amount_minor,
        }
    }
}

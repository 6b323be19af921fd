//! Command payloads accepted by the engine's write operations.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Kind, transactions::Recurrence};

/// Payload for creating a transaction.
#[derive(Clone, Debug)]
pub struct NewTransactionCmd {
    pub user_id: String,
    pub kind: Kind,
    pub category_id: Uuid,
    pub amount_minor: i64,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
    pub payment_method: Option<String>,
    pub tags: Vec<String>,
    pub recurrence: Option<Recurrence>,
}

/// Partial patch for an existing transaction. `None` leaves the field
/// untouched; `payment_method`/`tags` replace wholesale when present.
/// `recurrence` is tri-state: `Some(Some(..))` replaces, `Some(None)`
/// clears the descriptor.
#[derive(Clone, Debug, Default)]
pub struct UpdateTransactionCmd {
    pub user_id: String,
    pub transaction_id: Uuid,
    pub kind: Option<Kind>,
    pub category_id: Option<Uuid>,
    pub amount_minor: Option<i64>,
    pub description: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub payment_method: Option<String>,
    pub tags: Option<Vec<String>>,
    pub recurrence: Option<Option<Recurrence>>,
}

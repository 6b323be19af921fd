//! Transaction operations: validated CRUD plus cursor-paginated listing.

use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*,
};

use crate::{
    EngineError, Kind, NewTransactionCmd, ResultEngine, Transaction, UpdateTransactionCmd,
    transactions, util::normalize_optional_text,
};

use super::{Engine, with_tx};

const MAX_DESCRIPTION_LEN: usize = 200;
const MAX_PAYMENT_METHOD_LEN: usize = 50;

/// Filters for listing transactions.
///
/// `from` is inclusive and `to` is exclusive (`[from, to)`), both in UTC.
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// If present, acts as an allow-list of kinds to return.
    pub kinds: Option<Vec<Kind>>,
    /// If present and non-empty, acts as an allow-list of category ids.
    pub category_ids: Option<Vec<Uuid>>,
}

fn validate_list_filter(filter: &TransactionListFilter) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (filter.from, filter.to)
        && from >= to
    {
        return Err(EngineError::InvalidField(
            "invalid range: from must be < to".to_string(),
        ));
    }
    if filter.kinds.as_ref().is_some_and(|k| k.is_empty()) {
        return Err(EngineError::InvalidField(
            "kinds must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_amount(amount_minor: i64) -> ResultEngine<()> {
    if amount_minor <= 0 {
        return Err(EngineError::InvalidAmount(
            "amount_minor must be > 0".to_string(),
        ));
    }
    Ok(())
}

fn validate_description(description: &str) -> ResultEngine<String> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidField(
            "description must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(EngineError::InvalidField(format!(
            "description must be at most {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_payment_method(payment_method: Option<&str>) -> ResultEngine<Option<String>> {
    let Some(label) = normalize_optional_text(payment_method) else {
        return Ok(None);
    };
    if label.chars().count() > MAX_PAYMENT_METHOD_LEN {
        return Err(EngineError::InvalidField(format!(
            "payment method must be at most {MAX_PAYMENT_METHOD_LEN} characters"
        )));
    }
    Ok(Some(label))
}

/// Trim tags, drop empties, de-duplicate preserving first occurrence.
fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() || out.iter().any(|seen| seen == tag) {
            continue;
        }
        out.push(tag.to_string());
    }
    out
}

trait ApplyTxFilters: QueryFilter + Sized {
    fn apply_tx_filters(self, filter: &TransactionListFilter) -> Self;
}

impl<T> ApplyTxFilters for T
where
    T: QueryFilter + Sized,
{
    fn apply_tx_filters(mut self, filter: &TransactionListFilter) -> Self {
        if let Some(from) = filter.from {
            self = self.filter(transactions::Column::OccurredAt.gte(from));
        }
        if let Some(to) = filter.to {
            self = self.filter(transactions::Column::OccurredAt.lt(to));
        }
        if let Some(kinds) = &filter.kinds {
            let kinds: Vec<String> = kinds.iter().map(|k| k.as_str().to_string()).collect();
            self = self.filter(transactions::Column::Kind.is_in(kinds));
        }
        if let Some(category_ids) = &filter.category_ids
            && !category_ids.is_empty()
        {
            self = self.filter(transactions::Column::CategoryId.is_in(category_ids.clone()));
        }

        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct TransactionsCursor {
    occurred_at: DateTime<Utc>,
    transaction_id: Uuid,
}

impl TransactionsCursor {
    fn encode(&self) -> ResultEngine<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|_| EngineError::InvalidField("invalid transactions cursor".to_string()))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    fn decode(input: &str) -> ResultEngine<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input.as_bytes())
            .map_err(|_| EngineError::InvalidField("invalid transactions cursor".to_string()))?;
        serde_json::from_slice::<Self>(&bytes)
            .map_err(|_| EngineError::InvalidField("invalid transactions cursor".to_string()))
    }
}

impl Engine {
    /// Validates and stores a new transaction, returning its id.
    pub async fn create_transaction(&self, cmd: NewTransactionCmd) -> ResultEngine<Uuid> {
        validate_amount(cmd.amount_minor)?;
        let description = validate_description(&cmd.description)?;
        let payment_method = validate_payment_method(cmd.payment_method.as_deref())?;
        let tags = normalize_tags(&cmd.tags);

        with_tx!(self, |db_tx| {
            self.require_category_kind(&db_tx, &cmd.user_id, cmd.category_id, cmd.kind)
                .await?;

            let now = Utc::now();
            let tx = Transaction {
                id: Uuid::new_v4(),
                user_id: cmd.user_id,
                category_id: cmd.category_id,
                kind: cmd.kind,
                amount_minor: cmd.amount_minor,
                description,
                occurred_at: cmd.occurred_at,
                payment_method,
                tags,
                recurrence: cmd.recurrence,
                created_at: now,
                updated_at: now,
            };
            transactions::ActiveModel::try_from(&tx)?.insert(&db_tx).await?;

            Ok(tx.id)
        })
    }

    /// Applies a partial patch, re-validating the category/kind invariant
    /// against the patched values.
    pub async fn update_transaction(&self, cmd: UpdateTransactionCmd) -> ResultEngine<()> {
        if let Some(amount_minor) = cmd.amount_minor {
            validate_amount(amount_minor)?;
        }
        let description = cmd
            .description
            .as_deref()
            .map(validate_description)
            .transpose()?;
        let payment_method = cmd
            .payment_method
            .as_deref()
            .map(|label| validate_payment_method(Some(label)))
            .transpose()?;

        with_tx!(self, |db_tx| {
            let model = self
                .require_transaction(&db_tx, &cmd.user_id, cmd.transaction_id)
                .await?;
            let existing = Transaction::try_from(model.clone())?;

            let kind = cmd.kind.unwrap_or(existing.kind);
            let category_id = cmd.category_id.unwrap_or(existing.category_id);
            self.require_category_kind(&db_tx, &cmd.user_id, category_id, kind)
                .await?;

            let mut active: transactions::ActiveModel = model.into();
            active.kind = ActiveValue::Set(kind.as_str().to_string());
            active.category_id = ActiveValue::Set(category_id);
            if let Some(amount_minor) = cmd.amount_minor {
                active.amount_minor = ActiveValue::Set(amount_minor);
            }
            if let Some(description) = description {
                active.description = ActiveValue::Set(description);
            }
            if let Some(occurred_at) = cmd.occurred_at {
                active.occurred_at = ActiveValue::Set(occurred_at);
            }
            if let Some(payment_method) = payment_method {
                active.payment_method = ActiveValue::Set(payment_method);
            }
            if let Some(tags) = &cmd.tags {
                let tags = normalize_tags(tags);
                let encoded = serde_json::to_string(&tags)
                    .map_err(|_| EngineError::InvalidField("invalid tags".to_string()))?;
                active.tags = ActiveValue::Set(encoded);
            }
            if let Some(recurrence) = &cmd.recurrence {
                active.recurrence_frequency = ActiveValue::Set(
                    recurrence
                        .as_ref()
                        .map(|r| r.frequency.as_str().to_string()),
                );
                active.recurrence_end =
                    ActiveValue::Set(recurrence.as_ref().and_then(|r| r.end_date));
            }
            active.updated_at = ActiveValue::Set(Utc::now());
            active.update(&db_tx).await?;

            Ok(())
        })
    }

    /// Hard-deletes a transaction owned by the user.
    pub async fn delete_transaction(&self, user_id: &str, transaction_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_transaction(&db_tx, user_id, transaction_id)
                .await?;
            transactions::Entity::delete_by_id(transaction_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Lists the user's transactions with cursor-based pagination.
    ///
    /// Pagination is newest → older by `(occurred_at DESC, id DESC)`; the
    /// opaque cursor carries the last row's sort key, so a stable snapshot
    /// never delivers duplicates across pages.
    pub async fn list_transactions_page(
        &self,
        user_id: &str,
        limit: u64,
        cursor: Option<&str>,
        filter: &TransactionListFilter,
    ) -> ResultEngine<(Vec<Transaction>, Option<String>)> {
        with_tx!(self, |db_tx| {
            validate_list_filter(filter)?;

            let limit_plus_one = limit.saturating_add(1);
            let mut query = transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(user_id.to_string()))
                .order_by_desc(transactions::Column::OccurredAt)
                .order_by_desc(transactions::Column::Id)
                .limit(limit_plus_one);

            if let Some(cursor) = cursor {
                let cursor = TransactionsCursor::decode(cursor)?;
                query = query.filter(
                    Condition::any()
                        .add(transactions::Column::OccurredAt.lt(cursor.occurred_at))
                        .add(
                            Condition::all()
                                .add(transactions::Column::OccurredAt.eq(cursor.occurred_at))
                                .add(transactions::Column::Id.lt(cursor.transaction_id)),
                        ),
                );
            }
            query = query.apply_tx_filters(filter);

            let rows = query.all(&db_tx).await?;
            let has_more = rows.len() > limit as usize;

            let mut out: Vec<Transaction> = Vec::with_capacity(rows.len().min(limit as usize));
            for model in rows.into_iter().take(limit as usize) {
                out.push(Transaction::try_from(model)?);
            }

            let next_cursor = out.last().map(|tx| TransactionsCursor {
                occurred_at: tx.occurred_at,
                transaction_id: tx.id,
            });
            let next_cursor = if has_more {
                next_cursor.map(|c| c.encode()).transpose()?
            } else {
                None
            };

            Ok((out, next_cursor))
        })
    }

    /// Loads every transaction of the user, one consistent snapshot,
    /// ordered oldest → newest.
    pub(super) async fn load_snapshot(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<Vec<Transaction>> {
        transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id.to_string()))
            .order_by_asc(transactions::Column::OccurredAt)
            .order_by_asc(transactions::Column::Id)
            .all(db_tx)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    async fn require_transaction(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        transaction_id: Uuid,
    ) -> ResultEngine<transactions::Model> {
        transactions::Entity::find_by_id(transaction_id)
            .filter(transactions::Column::UserId.eq(user_id.to_string()))
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))
    }

    /// Enforces the storage-boundary invariant: the category exists, is
    /// owned by the user, and shares the transaction's kind.
    async fn require_category_kind(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        category_id: Uuid,
        kind: Kind,
    ) -> ResultEngine<()> {
        let category = self.require_category(db_tx, user_id, category_id).await?;
        if category.kind != kind.as_str() {
            return Err(EngineError::KindMismatch(format!(
                "category '{}' is {}, transaction is {}",
                category.name,
                category.kind,
                kind.as_str()
            )));
        }
        Ok(())
    }
}

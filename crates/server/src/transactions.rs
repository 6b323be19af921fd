use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::Query;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    ServerError,
    categories::{from_engine_kind, to_engine_kind},
    server::ServerState,
    types::transaction,
};
use engine::{
    Frequency, NewTransactionCmd, Recurrence, TransactionListFilter, UpdateTransactionCmd, users,
};

const DEFAULT_PAGE_SIZE: u64 = 50;
const MAX_PAGE_SIZE: u64 = 200;

fn to_engine_recurrence(recurrence: transaction::Recurrence) -> Recurrence {
    Recurrence {
        frequency: match recurrence.frequency {
            transaction::Frequency::Daily => Frequency::Daily,
            transaction::Frequency::Weekly => Frequency::Weekly,
            transaction::Frequency::Monthly => Frequency::Monthly,
            transaction::Frequency::Yearly => Frequency::Yearly,
        },
        end_date: recurrence.end_date,
    }
}

fn from_engine_recurrence(recurrence: Recurrence) -> transaction::Recurrence {
    transaction::Recurrence {
        frequency: match recurrence.frequency {
            Frequency::Daily => transaction::Frequency::Daily,
            Frequency::Weekly => transaction::Frequency::Weekly,
            Frequency::Monthly => transaction::Frequency::Monthly,
            Frequency::Yearly => transaction::Frequency::Yearly,
        },
        end_date: recurrence.end_date,
    }
}

fn map_transaction(tx: engine::Transaction) -> transaction::TransactionView {
    transaction::TransactionView {
        id: tx.id,
        kind: from_engine_kind(tx.kind),
        category_id: tx.category_id,
        amount_minor: tx.amount_minor,
        description: tx.description,
        occurred_at: tx.occurred_at.fixed_offset(),
        payment_method: tx.payment_method,
        tags: tx.tags,
        recurrence: tx.recurrence.map(from_engine_recurrence),
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<users::Model>,
    Query(params): Query<transaction::TransactionList>,
) -> Result<impl IntoResponse, ServerError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let filter = TransactionListFilter {
        from: params.from.map(|from| from.with_timezone(&Utc)),
        to: params.to.map(|to| to.with_timezone(&Utc)),
        kinds: params
            .kinds
            .map(|kinds| kinds.into_iter().map(to_engine_kind).collect()),
        category_ids: params.category_ids,
    };

    let (transactions, next_cursor) = state
        .engine
        .list_transactions_page(&user.username, limit, params.cursor.as_deref(), &filter)
        .await?;

    Ok(Json(transaction::TransactionListResponse {
        transactions: transactions.into_iter().map(map_transaction).collect(),
        next_cursor,
    }))
}

pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<users::Model>,
    Json(payload): Json<transaction::TransactionCreate>,
) -> Result<impl IntoResponse, ServerError> {
    let id = state
        .engine
        .create_transaction(NewTransactionCmd {
            user_id: user.username,
            kind: to_engine_kind(payload.kind),
            category_id: payload.category_id,
            amount_minor: payload.amount_minor,
            description: payload.description,
            occurred_at: payload.occurred_at.with_timezone(&Utc),
            payment_method: payload.payment_method,
            tags: payload.tags,
            recurrence: payload.recurrence.map(to_engine_recurrence),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(transaction::TransactionCreated { id }),
    ))
}

pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<users::Model>,
    Path(id): Path<Uuid>,
    Json(payload): Json<transaction::TransactionUpdate>,
) -> Result<impl IntoResponse, ServerError> {
    state
        .engine
        .update_transaction(UpdateTransactionCmd {
            user_id: user.username,
            transaction_id: id,
            kind: payload.kind.map(to_engine_kind),
            category_id: payload.category_id,
            amount_minor: payload.amount_minor,
            description: payload.description,
            occurred_at: payload.occurred_at.map(|at| at.with_timezone(&Utc)),
            payment_method: payload.payment_method,
            tags: payload.tags,
            recurrence: payload
                .recurrence
                .map(|recurrence| recurrence.map(to_engine_recurrence)),
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<ServerState>,
    Extension(user): Extension<users::Model>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    state.engine.delete_transaction(&user.username, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{run, run_with_listener, spawn_with_listener};

mod categories;
mod dashboard;
mod export;
mod server;
mod transactions;
mod user;


pub mod types {
    pub mod user {
        pub use api_types::user::{ResetConfirm, ResetRequest, SessionView};
    }

    pub mod category {
        pub use api_types::category::{
            CategoryCreate, CategoryCreated, CategoryList, CategoryListResponse, CategoryUpdate,
            CategoryView,
        };
    }

    pub mod transaction {
        pub use api_types::transaction::{
            Frequency, Recurrence, TransactionCreate, TransactionCreated, TransactionList,
            TransactionListResponse, TransactionUpdate, TransactionView,
        };
    }

    pub mod dashboard {
        pub use api_types::dashboard::{
            CategorySliceView, DashboardQuery, DashboardResponse, MonthlySummaryView,
            TrendPointView,
        };
    }

    pub mod export {
        pub use api_types::export::{ExportColumn, ExportFormat, ExportRequest};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidAmount(_)
        | EngineError::InvalidField(_)
        | EngineError::KindMismatch(_)
        | EngineError::NothingToExport => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

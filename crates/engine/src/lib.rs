//! Centime engine: domain model, storage operations, and the pure
//! aggregation/export cores.
//!
//! The engine owns the database exclusively. Every public operation runs
//! inside one database transaction, so aggregation and export always see a
//! single consistent snapshot of the user's data.

pub use categories::Category;
pub use commands::{NewTransactionCmd, UpdateTransactionCmd};
pub use error::EngineError;
pub use export::{
    ExportColumn, ExportFile, ExportFilter, ExportFormat, ExportRequest, Sheet, Workbook,
    build_workbook, export_file_name, serialize_workbook,
};
pub use kind::Kind;
pub use ops::{Engine, EngineBuilder, TransactionListFilter};
pub use summary::{
    CategorySlice, Dashboard, MonthlySummary, TrendPoint, TRAILING_MONTHS, expense_breakdown,
    monthly_summary, percent_change, trailing_series,
};
pub use transactions::{Frequency, Recurrence, Transaction};

pub mod categories;
mod commands;
mod error;
pub mod export;
mod kind;
mod ops;
pub mod summary;
pub mod transactions;
pub mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;

//! Snapshot-backed entry points for the pure aggregation and export cores.

use chrono::NaiveDate;
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    Category, ResultEngine, categories,
    export::{ExportFile, ExportRequest, build_workbook, export_file_name, serialize_workbook},
    summary::{Dashboard, TRAILING_MONTHS, expense_breakdown, monthly_summary, trailing_series},
};

use super::{Engine, with_tx};

impl Engine {
    /// Computes the dashboard from one consistent snapshot of the user's
    /// transactions and categories.
    pub async fn dashboard(&self, user_id: &str, reference: NaiveDate) -> ResultEngine<Dashboard> {
        with_tx!(self, |db_tx| {
            let transactions = self.load_snapshot(&db_tx, user_id).await?;
            let categories = self.load_categories(&db_tx, user_id).await?;

            Ok(Dashboard {
                summary: monthly_summary(&transactions, reference),
                breakdown: expense_breakdown(&transactions, &categories, reference),
                trend: trailing_series(&transactions, reference, TRAILING_MONTHS),
            })
        })
    }

    /// Builds and serializes an export file from one consistent snapshot.
    ///
    /// Fails with `NothingToExport` before producing any bytes when the
    /// filtered set is empty.
    pub async fn export(
        &self,
        user_id: &str,
        request: &ExportRequest,
        today: NaiveDate,
    ) -> ResultEngine<ExportFile> {
        with_tx!(self, |db_tx| {
            let transactions = self.load_snapshot(&db_tx, user_id).await?;
            let categories = self.load_categories(&db_tx, user_id).await?;

            let workbook = build_workbook(&transactions, &categories, request)?;
            let bytes = serialize_workbook(&workbook, request.format)?;

            Ok(ExportFile {
                file_name: export_file_name(request.format, today),
                content_type: request.format.content_type(),
                bytes,
            })
        })
    }

    async fn load_categories(
        &self,
        db_tx: &sea_orm::DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<Vec<Category>> {
        categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id.to_string()))
            .order_by_asc(categories::Column::Name)
            .all(db_tx)
            .await?
            .into_iter()
            .map(Category::try_from)
            .collect()
    }
}

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Distinguishes an absent patch field from an explicit `null`: absent
/// stays `None`, `null` becomes `Some(None)`, a value `Some(Some(..))`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// The income/expense discriminator shared by transactions and categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Income,
    Expense,
}

pub mod user {
    use super::*;

    /// Response body for `GET /session`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionView {
        pub username: String,
        pub email: String,
    }

    /// Request body for a password-reset request.
    ///
    /// `account` is a username or an email address.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ResetRequest {
        pub account: String,
    }

    /// Request body for confirming a password reset.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ResetConfirm {
        pub code: String,
        pub new_password: String,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryList {
        pub include_archived: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        pub kind: Kind,
        pub color: String,
        pub icon: String,
        pub is_custom: bool,
        pub archived: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryListResponse {
        pub categories: Vec<CategoryView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryCreate {
        pub name: String,
        pub kind: Kind,
        pub color: Option<String>,
        pub icon: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryCreated {
        pub id: Uuid,
        pub name: String,
    }

    /// Partial update; absent fields are left untouched. Kind is immutable.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub name: Option<String>,
        pub color: Option<String>,
        pub icon: Option<String>,
        pub archived: Option<bool>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Frequency {
        Daily,
        Weekly,
        Monthly,
        Yearly,
    }

    /// Recurrence descriptor: how often the transaction repeats and until when.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Recurrence {
        pub frequency: Frequency,
        pub end_date: Option<NaiveDate>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionList {
        pub limit: Option<u64>,
        /// Opaque pagination cursor (base64), from `next_cursor`.
        ///
        /// Newest → older pagination.
        pub cursor: Option<String>,
        /// Inclusive lower bound on the transaction date.
        pub from: Option<DateTime<FixedOffset>>,
        /// Exclusive upper bound on the transaction date.
        pub to: Option<DateTime<FixedOffset>>,
        /// If present, acts as an allow-list of kinds to return.
        pub kinds: Option<Vec<Kind>>,
        /// If present and non-empty, acts as an allow-list of category ids.
        pub category_ids: Option<Vec<Uuid>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub kind: Kind,
        pub category_id: Uuid,
        pub amount_minor: i64,
        pub description: String,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub occurred_at: DateTime<FixedOffset>,
        pub payment_method: Option<String>,
        pub tags: Vec<String>,
        pub recurrence: Option<Recurrence>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
        /// Opaque cursor for fetching the next page (older items).
        pub next_cursor: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionCreate {
        pub kind: Kind,
        pub category_id: Uuid,
        pub amount_minor: i64,
        pub description: String,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub occurred_at: DateTime<FixedOffset>,
        pub payment_method: Option<String>,
        #[serde(default)]
        pub tags: Vec<String>,
        pub recurrence: Option<Recurrence>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionCreated {
        pub id: Uuid,
    }

    /// Partial update; absent fields are left untouched.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub kind: Option<Kind>,
        pub category_id: Option<Uuid>,
        pub amount_minor: Option<i64>,
        pub description: Option<String>,
        pub occurred_at: Option<DateTime<FixedOffset>>,
        pub payment_method: Option<String>,
        pub tags: Option<Vec<String>>,
        /// Absent leaves the recurrence untouched; an explicit `null`
        /// clears it.
        #[serde(
            default,
            skip_serializing_if = "Option::is_none",
            deserialize_with = "super::double_option"
        )]
        pub recurrence: Option<Option<Recurrence>>,
    }
}

pub mod dashboard {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct DashboardQuery {
        /// Reference date for the aggregation; defaults to today.
        pub reference: Option<NaiveDate>,
    }

    /// Current-month totals plus deltas against the previous month.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthlySummaryView {
        pub income_minor: i64,
        pub expense_minor: i64,
        pub balance_minor: i64,
        pub income_change_pct: f64,
        pub expense_change_pct: f64,
        pub balance_change_pct: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategorySliceView {
        pub category_id: Option<Uuid>,
        pub name: String,
        pub color: String,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TrendPointView {
        /// Human month/year label, e.g. "Feb 2026".
        pub label: String,
        pub income_minor: i64,
        pub expense_minor: i64,
        pub balance_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DashboardResponse {
        pub summary: MonthlySummaryView,
        pub breakdown: Vec<CategorySliceView>,
        pub trend: Vec<TrendPointView>,
    }
}

pub mod export {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ExportFormat {
        Csv,
        Json,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ExportColumn {
        Date,
        Kind,
        Category,
        Description,
        Amount,
        PaymentMethod,
        Tags,
        RunningBalance,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExportRequest {
        /// Inclusive on both ends.
        pub from: NaiveDate,
        pub to: NaiveDate,
        /// Empty means "all categories".
        #[serde(default)]
        pub category_ids: Vec<Uuid>,
        /// Absent means "all kinds".
        pub kind: Option<Kind>,
        pub columns: Vec<ExportColumn>,
        pub format: ExportFormat,
    }
}

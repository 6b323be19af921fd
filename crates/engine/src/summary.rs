//! Pure aggregation over an in-memory transaction snapshot.
//!
//! Everything here is a deterministic function of its inputs: the engine
//! loads one consistent snapshot of the user's transactions and categories
//! and hands it to these functions. No caching, no incremental state.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use crate::{Category, Kind, Transaction};

/// Number of calendar months in the trend series, reference month included.
pub const TRAILING_MONTHS: usize = 6;

/// Sentinel label for breakdown slices whose category id is unknown.
pub const OTHER_LABEL: &str = "Other";

/// Neutral color carried by the sentinel slice.
pub const OTHER_COLOR: &str = "#9e9e9e";

/// Current-month totals plus deltas against the previous month.
#[derive(Clone, Debug, PartialEq)]
pub struct MonthlySummary {
    pub income_minor: i64,
    pub expense_minor: i64,
    pub balance_minor: i64,
    pub income_change_pct: f64,
    pub expense_change_pct: f64,
    pub balance_change_pct: f64,
}

/// One slice of the current-month expense breakdown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategorySlice {
    /// `None` collects transactions whose category id matched nothing.
    pub category_id: Option<Uuid>,
    pub name: String,
    pub color: String,
    pub amount_minor: i64,
}

/// One month of the trailing income/expense/net series.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrendPoint {
    /// Human month/year label, e.g. "Feb 2026".
    pub label: String,
    pub income_minor: i64,
    pub expense_minor: i64,
    pub balance_minor: i64,
}

/// Everything the dashboard endpoint returns, computed from one snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct Dashboard {
    pub summary: MonthlySummary,
    pub breakdown: Vec<CategorySlice>,
    pub trend: Vec<TrendPoint>,
}

/// Months since year zero; adjacent months differ by exactly one.
fn month_index(date: NaiveDate) -> i32 {
    date.year() * 12 + date.month0() as i32
}

fn month_label(index: i32) -> String {
    let year = index.div_euclid(12);
    let month0 = index.rem_euclid(12) as u32;
    match NaiveDate::from_ymd_opt(year, month0 + 1, 1) {
        Some(date) => date.format("%b %Y").to_string(),
        None => String::new(),
    }
}

/// Period-over-period percentage change.
///
/// Returns exactly 0 when the previous value is zero or negative. This
/// suppresses "new category" growth signals on purpose; the guard is part
/// of the contract, not a shortcut.
pub fn percent_change(current: i64, previous: i64) -> f64 {
    if previous <= 0 {
        return 0.0;
    }
    (current - previous) as f64 / previous as f64 * 100.0
}

/// Income/expense/balance for the reference month, with percentage deltas
/// against the month before it.
pub fn monthly_summary(transactions: &[Transaction], reference: NaiveDate) -> MonthlySummary {
    let current = month_index(reference);
    let previous = current - 1;

    let mut cur = (0i64, 0i64);
    let mut prev = (0i64, 0i64);
    for tx in transactions {
        let index = month_index(tx.occurred_at.date_naive());
        let slot = if index == current {
            &mut cur
        } else if index == previous {
            &mut prev
        } else {
            continue;
        };
        match tx.kind {
            Kind::Income => slot.0 += tx.amount_minor,
            Kind::Expense => slot.1 += tx.amount_minor,
        }
    }

    let balance = cur.0 - cur.1;
    let prev_balance = prev.0 - prev.1;
    MonthlySummary {
        income_minor: cur.0,
        expense_minor: cur.1,
        balance_minor: balance,
        income_change_pct: percent_change(cur.0, prev.0),
        expense_change_pct: percent_change(cur.1, prev.1),
        balance_change_pct: percent_change(balance, prev_balance),
    }
}

/// Current-month expense totals grouped by category, largest first.
///
/// Transactions whose category id matches no known category are collected
/// into a single [`OTHER_LABEL`] slice.
pub fn expense_breakdown(
    transactions: &[Transaction],
    categories: &[Category],
    reference: NaiveDate,
) -> Vec<CategorySlice> {
    let current = month_index(reference);
    let by_id: HashMap<Uuid, &Category> = categories.iter().map(|c| (c.id, c)).collect();

    let mut known: HashMap<Uuid, i64> = HashMap::new();
    let mut other_minor = 0i64;
    for tx in transactions {
        if tx.kind != Kind::Expense || month_index(tx.occurred_at.date_naive()) != current {
            continue;
        }
        if by_id.contains_key(&tx.category_id) {
            *known.entry(tx.category_id).or_insert(0) += tx.amount_minor;
        } else {
            other_minor += tx.amount_minor;
        }
    }

    let mut slices: Vec<CategorySlice> = known
        .into_iter()
        .filter_map(|(id, amount_minor)| {
            by_id.get(&id).map(|category| CategorySlice {
                category_id: Some(id),
                name: category.name.clone(),
                color: category.color.clone(),
                amount_minor,
            })
        })
        .collect();
    if other_minor > 0 {
        slices.push(CategorySlice {
            category_id: None,
            name: OTHER_LABEL.to_string(),
            color: OTHER_COLOR.to_string(),
            amount_minor: other_minor,
        });
    }

    slices.sort_by(|a, b| b.amount_minor.cmp(&a.amount_minor).then(a.name.cmp(&b.name)));
    slices
}

/// Income/expense/net sums for each of the `months` calendar months ending
/// at the reference month inclusive, oldest → newest.
///
/// Always returns exactly `months` entries; months without transactions
/// contribute zeros.
pub fn trailing_series(
    transactions: &[Transaction],
    reference: NaiveDate,
    months: usize,
) -> Vec<TrendPoint> {
    let last = month_index(reference);
    let first = last - (months as i32 - 1);

    let mut sums: HashMap<i32, (i64, i64)> = HashMap::new();
    for tx in transactions {
        let index = month_index(tx.occurred_at.date_naive());
        if index < first || index > last {
            continue;
        }
        let slot = sums.entry(index).or_insert((0, 0));
        match tx.kind {
            Kind::Income => slot.0 += tx.amount_minor,
            Kind::Expense => slot.1 += tx.amount_minor,
        }
    }

    (first..=last)
        .map(|index| {
            let (income, expense) = sums.get(&index).copied().unwrap_or((0, 0));
            TrendPoint {
                label: month_label(index),
                income_minor: income,
                expense_minor: expense,
                balance_minor: income - expense,
            }
        })
        .collect()
}

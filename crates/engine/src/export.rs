//! Pure export pipeline: filter, sort, running balance, projection,
//! serialization.
//!
//! The engine hands one consistent snapshot of transactions and categories
//! to [`build_workbook`]; nothing here touches storage. The produced
//! [`Workbook`] always has a "Transactions" sheet and a "Summary" sheet;
//! the CSV serialization keeps only the former (single delimited
//! document), the JSON serialization keeps both.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Category, EngineError, Kind, ResultEngine, Transaction,
    summary::OTHER_LABEL,
    util::format_minor,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Json => "application/json",
        }
    }
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

impl ExportColumn {
    pub fn header(self) -> &'static str {
        match self {
            Self::Date => "Date",
            Self::Kind => "Kind",
            Self::Category => "Category",
            Self::Description => "Description",
            Self::Amount => "Amount",
            Self::PaymentMethod => "Payment method",
            Self::Tags => "Tags",
            Self::RunningBalance => "Running balance",
        }
    }
}

/// Which transactions end up in the export.
///
/// The date range is inclusive on both ends; an empty category allow-list
/// means "all categories"; an absent kind means "all kinds".
#[derive(Clone, Debug)]
pub struct ExportFilter {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub category_ids: Vec<Uuid>,
    pub kind: Option<Kind>,
}

#[derive(Clone, Debug)]
pub struct ExportRequest {
    pub filter: ExportFilter,
    pub columns: Vec<ExportColumn>,
    pub format: ExportFormat,
}

/// A generated export artifact, ready to hand to the HTTP layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportFile {
    /// `transactions_<YYYY-MM-DD>.<ext>`.
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

fn project_cell(
    column: ExportColumn,
    tx: &Transaction,
    category_names: &HashMap<Uuid, &str>,
    running_minor: i64,
) -> String {
    match column {
        ExportColumn::Date => format_date(tx.occurred_at.date_naive()),
        ExportColumn::Kind => tx.kind.display().to_string(),
        ExportColumn::Category => category_names
            .get(&tx.category_id)
            .map_or(OTHER_LABEL, |name| name)
            .to_string(),
        ExportColumn::Description => tx.description.clone(),
        ExportColumn::Amount => format_minor(tx.amount_minor),
        ExportColumn::PaymentMethod => tx.payment_method.clone().unwrap_or_default(),
        ExportColumn::Tags => tx.tags.join(","),
        ExportColumn::RunningBalance => format_minor(running_minor),
    }
}

/// Builds the two-sheet workbook from a snapshot.
///
/// Fails with [`EngineError::NothingToExport`] when the filtered set is
/// empty. Column selection only affects the "Transactions" sheet; the
/// "Summary" sheet always covers the whole filtered set.
pub fn build_workbook(
    transactions: &[Transaction],
    categories: &[Category],
    request: &ExportRequest,
) -> ResultEngine<Workbook> {
    let filter = &request.filter;
    if filter.from > filter.to {
        return Err(EngineError::InvalidField(
            "invalid range: from must be <= to".to_string(),
        ));
    }

    let mut selected: Vec<&Transaction> = transactions
        .iter()
        .filter(|tx| {
            let date = tx.occurred_at.date_naive();
            date >= filter.from && date <= filter.to
        })
        .filter(|tx| {
            filter.category_ids.is_empty() || filter.category_ids.contains(&tx.category_id)
        })
        .filter(|tx| filter.kind.is_none_or(|kind| tx.kind == kind))
        .collect();

    if selected.is_empty() {
        return Err(EngineError::NothingToExport);
    }

    selected.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at).then(a.id.cmp(&b.id)));

    let category_names: HashMap<Uuid, &str> = categories
        .iter()
        .map(|c| (c.id, c.name.as_str()))
        .collect();

    let mut rows = Vec::with_capacity(selected.len() + 1);
    rows.push(
        request
            .columns
            .iter()
            .map(|c| c.header().to_string())
            .collect(),
    );

    let mut running_minor = 0i64;
    let mut income_minor = 0i64;
    let mut expense_minor = 0i64;
    for tx in &selected {
        running_minor += tx.signed_amount_minor();
        match tx.kind {
            Kind::Income => income_minor += tx.amount_minor,
            Kind::Expense => expense_minor += tx.amount_minor,
        }
        rows.push(
            request
                .columns
                .iter()
                .map(|column| project_cell(*column, tx, &category_names, running_minor))
                .collect(),
        );
    }

    let summary_rows = vec![
        vec!["Period start".to_string(), format_date(filter.from)],
        vec!["Period end".to_string(), format_date(filter.to)],
        vec!["Transactions".to_string(), selected.len().to_string()],
        vec!["Total income".to_string(), format_minor(income_minor)],
        vec!["Total expense".to_string(), format_minor(expense_minor)],
        vec![
            "Net balance".to_string(),
            format_minor(income_minor - expense_minor),
        ],
    ];

    Ok(Workbook {
        sheets: vec![
            Sheet {
                name: "Transactions".to_string(),
                rows,
            },
            Sheet {
                name: "Summary".to_string(),
                rows: summary_rows,
            },
        ],
    })
}

/// Serializes a workbook: CSV keeps the primary sheet as one delimited
/// document, JSON emits every sheet as a name → row-grid object.
pub fn serialize_workbook(workbook: &Workbook, format: ExportFormat) -> ResultEngine<Vec<u8>> {
    match format {
        ExportFormat::Csv => {
            let primary = workbook
                .sheets
                .first()
                .ok_or(EngineError::NothingToExport)?;
            let mut writer = csv::Writer::from_writer(Vec::new());
            for row in &primary.rows {
                writer
                    .write_record(row)
                    .map_err(|err| EngineError::InvalidField(err.to_string()))?;
            }
            writer
                .into_inner()
                .map_err(|err| EngineError::InvalidField(err.to_string()))
        }
        ExportFormat::Json => {
            let mut object = serde_json::Map::new();
            for sheet in &workbook.sheets {
                object.insert(
                    sheet.name.clone(),
                    serde_json::to_value(&sheet.rows)
                        .map_err(|err| EngineError::InvalidField(err.to_string()))?,
                );
            }
            serde_json::to_vec_pretty(&serde_json::Value::Object(object))
                .map_err(|err| EngineError::InvalidField(err.to_string()))
        }
    }
}

/// File name for a generated export, stamped with the current date.
pub fn export_file_name(format: ExportFormat, today: NaiveDate) -> String {
    format!(
        "transactions_{}.{}",
        today.format("%Y-%m-%d"),
        format.extension()
    )
}

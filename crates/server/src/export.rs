use axum::{
    Extension, Json,
    extract::State,
    http::header,
    response::IntoResponse,
};
use chrono::Utc;

use crate::{ServerError, categories::to_engine_kind, server::ServerState, types::export};
use engine::{
    export::{ExportColumn, ExportFilter, ExportFormat, ExportRequest},
    users,
};

fn to_engine_column(column: export::ExportColumn) -> ExportColumn {
    match column {
        export::ExportColumn::Date => ExportColumn::Date,
        export::ExportColumn::Kind => ExportColumn::Kind,
        export::ExportColumn::Category => ExportColumn::Category,
        export::ExportColumn::Description => ExportColumn::Description,
        export::ExportColumn::Amount => ExportColumn::Amount,
        export::ExportColumn::PaymentMethod => ExportColumn::PaymentMethod,
        export::ExportColumn::Tags => ExportColumn::Tags,
        export::ExportColumn::RunningBalance => ExportColumn::RunningBalance,
    }
}

fn to_engine_format(format: export::ExportFormat) -> ExportFormat {
    match format {
        export::ExportFormat::Csv => ExportFormat::Csv,
        export::ExportFormat::Json => ExportFormat::Json,
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<users::Model>,
    Json(payload): Json<export::ExportRequest>,
) -> Result<impl IntoResponse, ServerError> {
    if payload.columns.is_empty() {
        return Err(ServerError::Generic(
            "columns must not be empty".to_string(),
        ));
    }

    let request = ExportRequest {
        filter: ExportFilter {
            from: payload.from,
            to: payload.to,
            category_ids: payload.category_ids,
            kind: payload.kind.map(to_engine_kind),
        },
        columns: payload.columns.into_iter().map(to_engine_column).collect(),
        format: to_engine_format(payload.format),
    };

    let file = state
        .engine
        .export(&user.username, &request, Utc::now().date_naive())
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.file_name),
            ),
        ],
        file.bytes,
    ))
}

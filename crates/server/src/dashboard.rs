use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::Utc;

use crate::{ServerError, server::ServerState, types::dashboard};
use engine::users;

pub async fn get(
    State(state): State<ServerState>,
    Extension(user): Extension<users::Model>,
    Query(params): Query<dashboard::DashboardQuery>,
) -> Result<impl IntoResponse, ServerError> {
    let reference = params.reference.unwrap_or_else(|| Utc::now().date_naive());
    let result = state.engine.dashboard(&user.username, reference).await?;

    Ok(Json(dashboard::DashboardResponse {
        summary: dashboard::MonthlySummaryView {
            income_minor: result.summary.income_minor,
            expense_minor: result.summary.expense_minor,
            balance_minor: result.summary.balance_minor,
            income_change_pct: result.summary.income_change_pct,
            expense_change_pct: result.summary.expense_change_pct,
            balance_change_pct: result.summary.balance_change_pct,
        },
        breakdown: result
            .breakdown
            .into_iter()
            .map(|slice| dashboard::CategorySliceView {
                category_id: slice.category_id,
                name: slice.name,
                color: slice.color,
                amount_minor: slice.amount_minor,
            })
            .collect(),
        trend: result
            .trend
            .into_iter()
            .map(|point| dashboard::TrendPointView {
                label: point.label,
                income_minor: point.income_minor,
                expense_minor: point.expense_minor,
                balance_minor: point.balance_minor,
            })
            .collect(),
    }))
}

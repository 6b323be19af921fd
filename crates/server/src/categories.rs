use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, types::category};
use engine::users;

pub(crate) fn to_engine_kind(kind: api_types::Kind) -> engine::Kind {
    match kind {
        api_types::Kind::Income => engine::Kind::Income,
        api_types::Kind::Expense => engine::Kind::Expense,
    }
}

pub(crate) fn from_engine_kind(kind: engine::Kind) -> api_types::Kind {
    match kind {
        engine::Kind::Income => api_types::Kind::Income,
        engine::Kind::Expense => api_types::Kind::Expense,
    }
}

fn map_category(category: engine::Category) -> category::CategoryView {
    category::CategoryView {
        id: category.id,
        name: category.name,
        kind: from_engine_kind(category.kind),
        color: category.color,
        icon: category.icon,
        is_custom: category.is_custom,
        archived: category.archived,
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<users::Model>,
    Query(params): Query<category::CategoryList>,
) -> Result<impl IntoResponse, ServerError> {
    let categories = state
        .engine
        .list_categories(&user.username, params.include_archived.unwrap_or(false))
        .await?;

    Ok(Json(category::CategoryListResponse {
        categories: categories.into_iter().map(map_category).collect(),
    }))
}

pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<users::Model>,
    Json(payload): Json<category::CategoryCreate>,
) -> Result<impl IntoResponse, ServerError> {
    let created = state
        .engine
        .create_category(
            &user.username,
            &payload.name,
            to_engine_kind(payload.kind),
            payload.color.as_deref(),
            payload.icon.as_deref(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(category::CategoryCreated {
            id: created.id,
            name: created.name,
        }),
    ))
}

pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<users::Model>,
    Path(id): Path<Uuid>,
    Json(payload): Json<category::CategoryUpdate>,
) -> Result<impl IntoResponse, ServerError> {
    let updated = state
        .engine
        .update_category(
            &user.username,
            id,
            payload.name.as_deref(),
            payload.color.as_deref(),
            payload.icon.as_deref(),
            payload.archived,
        )
        .await?;

    Ok(Json(map_category(updated)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Extension(user): Extension<users::Model>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    state.engine.delete_category(&user.username, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

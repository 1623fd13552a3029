// src/handlers/notifications.rs

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{i18n::Locale, tenancy::TenantContext},
    models::notifications::Notification,
};

// GET /api/notifications
#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "Avisos",
    responses((status = 200, description = "Avisos da empresa, mais recentes primeiro", body = Vec<Notification>)),
    security(("api_jwt" = []))
)]
pub async fn list_notifications(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
) -> Result<Json<Vec<Notification>>, ApiError> {
    app_state
        .notification_service
        .list(tenant.0)
        .await
        .map(Json)
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))
}

// POST /api/notifications/{id}/read
#[utoipa::path(
    post,
    path = "/api/notifications/{id}/read",
    tag = "Avisos",
    params(("id" = Uuid, Path, description = "ID do aviso")),
    responses(
        (status = 200, description = "Aviso marcado como lido", body = Notification),
        (status = 404, description = "Aviso não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_read(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<Notification>, ApiError> {
    app_state
        .notification_service
        .mark_read(tenant.0, id)
        .await
        .map(Json)
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))
}

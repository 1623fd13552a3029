// src/handlers/operations.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{CompanyAdmin, RequireRole},
        tenancy::TenantContext,
    },
    models::operations::{CreateOrderPayload, ServiceOrder, UpdateOrderPayload},
};

// GET /api/orders
#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Ordens de Serviço",
    responses(
        (status = 200, description = "Ordens da empresa, mais recentes primeiro", body = Vec<ServiceOrder>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_orders(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let orders = app_state
        .operations_service
        .list_orders(tenant.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(orders)))
}

// POST /api/orders
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Ordens de Serviço",
    request_body = CreateOrderPayload,
    responses(
        (status = 201, description = "OS aberta", body = ServiceOrder),
        (status = 404, description = "Cliente ou técnico não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let order = app_state
        .operations_service
        .create_order(tenant.0, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(order)))
}

// PUT /api/orders/{id}
#[utoipa::path(
    put,
    path = "/api/orders/{id}",
    tag = "Ordens de Serviço",
    request_body = UpdateOrderPayload,
    params(("id" = Uuid, Path, description = "ID da OS")),
    responses(
        (status = 200, description = "OS atualizada", body = ServiceOrder),
        (status = 404, description = "OS não encontrada"),
        (status = 409, description = "OS finalizada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_order(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let order = app_state
        .operations_service
        .update_order(tenant.0, id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(order)))
}

// DELETE /api/orders/{id}
#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    tag = "Ordens de Serviço",
    params(("id" = Uuid, Path, description = "ID da OS")),
    responses(
        (status = 204, description = "OS removida"),
        (status = 403, description = "Apenas o administrador da empresa"),
        (status = 404, description = "OS não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_order(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<CompanyAdmin>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .operations_service
        .delete_order(tenant.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

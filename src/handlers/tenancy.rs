// src/handlers/tenancy.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::{
        finance::{CompanyBillingDetail, NewPayment, Payment},
        notifications::{NewNotification, Notification},
        tenancy::{BillingAdjustment, Company, CompanySettings, NewCompany, UpdateStatusPayload},
    },
};

// =============================================================================
//  EMPRESAS
// =============================================================================

// GET /api/dev/companies
#[utoipa::path(
    get,
    path = "/api/dev/companies",
    tag = "Painel do Desenvolvedor",
    responses((status = 200, description = "Empresas clientes (sem a do sistema)", body = Vec<Company>)),
    security(("api_jwt" = []))
)]
pub async fn list_companies(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Json<Vec<Company>>, ApiError> {
    app_state
        .tenant_service
        .list_companies()
        .await
        .map(Json)
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))
}

// POST /api/dev/companies
#[utoipa::path(
    post,
    path = "/api/dev/companies",
    tag = "Painel do Desenvolvedor",
    request_body = NewCompany,
    responses(
        (status = 201, description = "Empresa criada", body = Company),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_company(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<NewCompany>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let company = app_state
        .tenant_service
        .create_company(&payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(company)))
}

// PUT /api/dev/companies/{id}/status
#[utoipa::path(
    put,
    path = "/api/dev/companies/{id}/status",
    tag = "Painel do Desenvolvedor",
    request_body = UpdateStatusPayload,
    params(("id" = Uuid, Path, description = "ID da empresa")),
    responses(
        (status = 200, description = "Status alterado (bloqueio encerra as sessões)", body = Company),
        (status = 403, description = "Empresa do sistema"),
        (status = 404, description = "Empresa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_status(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<Json<Company>, ApiError> {
    app_state
        .tenant_service
        .set_status(id, payload.status)
        .await
        .map(Json)
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))
}

// PUT /api/dev/companies/{id}/billing
#[utoipa::path(
    put,
    path = "/api/dev/companies/{id}/billing",
    tag = "Painel do Desenvolvedor",
    request_body = BillingAdjustment,
    params(("id" = Uuid, Path, description = "ID da empresa")),
    responses(
        (status = 200, description = "Cobrança ajustada", body = Company),
        (status = 400, description = "Valores negativos"),
        (status = 404, description = "Empresa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn adjust_billing(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<BillingAdjustment>,
) -> Result<Json<Company>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .tenant_service
        .adjust_billing(id, &payload)
        .await
        .map(Json)
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))
}

// PUT /api/dev/companies/{id}/settings
#[utoipa::path(
    put,
    path = "/api/dev/companies/{id}/settings",
    tag = "Painel do Desenvolvedor",
    request_body = CompanySettings,
    params(("id" = Uuid, Path, description = "ID da empresa")),
    responses(
        (status = 200, description = "Recursos da empresa atualizados", body = Company),
        (status = 404, description = "Empresa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<CompanySettings>,
) -> Result<Json<Company>, ApiError> {
    app_state
        .tenant_service
        .update_settings(id, &payload)
        .await
        .map(Json)
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))
}

// DELETE /api/dev/companies/{id}
#[utoipa::path(
    delete,
    path = "/api/dev/companies/{id}",
    tag = "Painel do Desenvolvedor",
    params(("id" = Uuid, Path, description = "ID da empresa")),
    responses(
        (status = 204, description = "Empresa e todos os seus dados excluídos"),
        (status = 403, description = "Empresa do sistema"),
        (status = 404, description = "Empresa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn purge_company(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .tenant_service
        .purge(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  COBRANÇA E AVISOS
// =============================================================================

#[derive(Debug, Deserialize, IntoParams, Validate)]
pub struct ExpiringQuery {
    /// Janela em dias (padrão 7, máximo 3650)
    #[validate(range(min = 0, max = 3650, message = "A janela deve estar entre 0 e 3650 dias."))]
    pub days: Option<i64>,
}

// GET /api/dev/companies/expiring
#[utoipa::path(
    get,
    path = "/api/dev/companies/expiring",
    tag = "Painel do Desenvolvedor",
    params(ExpiringQuery),
    responses(
        (status = 200, description = "Empresas ativas com vencimento próximo", body = Vec<Company>),
        (status = 400, description = "Janela fora do intervalo")
    ),
    security(("api_jwt" = []))
)]
pub async fn expiring_companies(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<ExpiringQuery>,
) -> Result<Json<Vec<Company>>, ApiError> {
    query
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .tenant_service
        .expiring(query.days.unwrap_or(7))
        .await
        .map(Json)
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))
}

// GET /api/dev/companies/{id}/payments
#[utoipa::path(
    get,
    path = "/api/dev/companies/{id}/payments",
    tag = "Painel do Desenvolvedor",
    params(("id" = Uuid, Path, description = "ID da empresa")),
    responses(
        (status = 200, description = "Mensalidade líquida e histórico de pagamentos", body = CompanyBillingDetail),
        (status = 404, description = "Empresa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn billing_detail(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<Json<CompanyBillingDetail>, ApiError> {
    app_state
        .tenant_service
        .billing_detail(id)
        .await
        .map(Json)
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))
}

// POST /api/dev/companies/{id}/payments
#[utoipa::path(
    post,
    path = "/api/dev/companies/{id}/payments",
    tag = "Painel do Desenvolvedor",
    request_body = NewPayment,
    params(("id" = Uuid, Path, description = "ID da empresa")),
    responses(
        (status = 201, description = "Pagamento registrado", body = Payment),
        (status = 404, description = "Empresa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn record_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewPayment>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let payment = app_state
        .tenant_service
        .record_payment(id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(payment)))
}

// POST /api/dev/companies/{id}/notifications
#[utoipa::path(
    post,
    path = "/api/dev/companies/{id}/notifications",
    tag = "Painel do Desenvolvedor",
    request_body = NewNotification,
    params(("id" = Uuid, Path, description = "ID da empresa")),
    responses(
        (status = 201, description = "Aviso enviado à empresa", body = Notification),
        (status = 404, description = "Empresa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn notify_company(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewNotification>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let notification = app_state
        .tenant_service
        .notify(id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(notification)))
}

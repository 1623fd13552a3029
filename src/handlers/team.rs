// src/handlers/team.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{CompanyAdmin, RequireRole},
        tenancy::TenantContext,
    },
    models::auth::{CreateTechnicianPayload, User},
};

// GET /api/technicians
#[utoipa::path(
    get,
    path = "/api/technicians",
    tag = "Equipe",
    responses((status = 200, description = "Técnicos da empresa", body = Vec<User>)),
    security(("api_jwt" = []))
)]
pub async fn list_technicians(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let technicians = app_state
        .team_service
        .list_technicians(tenant.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(technicians)))
}

// POST /api/technicians
#[utoipa::path(
    post,
    path = "/api/technicians",
    tag = "Equipe",
    request_body = CreateTechnicianPayload,
    responses(
        (status = 201, description = "Técnico cadastrado", body = User),
        (status = 403, description = "Apenas o administrador da empresa"),
        (status = 409, description = "E-mail em uso ou limite de técnicos atingido")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_technician(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<CompanyAdmin>,
    Json(payload): Json<CreateTechnicianPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let technician = app_state
        .team_service
        .create_technician(tenant.0, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(technician)))
}

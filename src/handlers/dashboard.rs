// src/handlers/dashboard.rs

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    models::dashboard::BillingSummary,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct SummaryQuery {
    /// Ano com quatro dígitos; padrão: ano corrente
    #[param(example = "2024")]
    pub year: Option<String>,
}

// GET /api/dev/billing/summary
#[utoipa::path(
    get,
    path = "/api/dev/billing/summary",
    tag = "Painel do Desenvolvedor",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Contadores, MRR e série mensal do ano", body = BillingSummary),
        (status = 403, description = "Apenas desenvolvedores")
    ),
    security(("api_jwt" = []))
)]
pub async fn billing_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<BillingSummary>, ApiError> {
    app_state
        .billing_service
        .summary(query.year.as_deref())
        .await
        .map(Json)
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))
}

// src/handlers/support.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::{error::ApiError, i18n::I18nStore},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, tenancy::TenantContext},
    models::support::{ChatMessage, DeskView, SendMessagePayload},
    services::support_desk::SendOutcome,
};

// Traduz a chave do aviso para o idioma do cliente
fn localized(mut view: DeskView, locale: &Locale, i18n_store: &I18nStore) -> DeskView {
    view.notice = view.notice.map(|key| i18n_store.translate(&locale.0, &key));
    view
}

// =============================================================================
//  LADO DA EMPRESA
// =============================================================================

// GET /api/support/messages
#[utoipa::path(
    get,
    path = "/api/support/messages",
    tag = "Suporte",
    responses((status = 200, description = "Conversa da empresa com o suporte", body = Vec<ChatMessage>)),
    security(("api_jwt" = []))
)]
pub async fn company_thread(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    app_state
        .support_service
        .company_thread(tenant.0)
        .await
        .map(Json)
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))
}

// POST /api/support/messages
#[utoipa::path(
    post,
    path = "/api/support/messages",
    tag = "Suporte",
    request_body = SendMessagePayload,
    responses(
        (status = 201, description = "Mensagem enviada ao suporte", body = ChatMessage),
        (status = 400, description = "Mensagem vazia")
    ),
    security(("api_jwt" = []))
)]
pub async fn send_to_support(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(session): AuthenticatedUser,
    Json(payload): Json<SendMessagePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let message = app_state
        .support_service
        .send_to_support(&session.user, &payload.text)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(message)))
}

// =============================================================================
//  MESA DE SUPORTE (painel do desenvolvedor)
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeskSendStatus {
    Ignored,
    Sent,
    Failed,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeskSendResponse {
    pub status: DeskSendStatus,
    // Mensagem confirmada pelo servidor (só em SENT)
    pub message: Option<ChatMessage>,
    pub desk: DeskView,
}

// POST /api/dev/support/desk
#[utoipa::path(
    post,
    path = "/api/dev/support/desk",
    tag = "Suporte",
    responses((status = 200, description = "Mesa aberta com a lista de canais", body = DeskView)),
    security(("api_jwt" = []))
)]
pub async fn mount_desk(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(session): AuthenticatedUser,
) -> Json<DeskView> {
    let view = app_state.support_service.mount(session.id).await;
    Json(localized(view, &locale, &app_state.i18n_store))
}

// GET /api/dev/support/desk
#[utoipa::path(
    get,
    path = "/api/dev/support/desk",
    tag = "Suporte",
    responses((status = 200, description = "Estado atual da mesa", body = DeskView)),
    security(("api_jwt" = []))
)]
pub async fn desk_snapshot(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(session): AuthenticatedUser,
) -> Json<DeskView> {
    let view = app_state.support_service.snapshot(session.id).await;
    Json(localized(view, &locale, &app_state.i18n_store))
}

// POST /api/dev/support/desk/channel/{company_id}
#[utoipa::path(
    post,
    path = "/api/dev/support/desk/channel/{company_id}",
    tag = "Suporte",
    params(("company_id" = Uuid, Path, description = "Empresa do canal")),
    responses((status = 200, description = "Canal aberto; polling reiniciado", body = DeskView)),
    security(("api_jwt" = []))
)]
pub async fn select_channel(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(company_id): Path<Uuid>,
) -> Json<DeskView> {
    let view = app_state
        .support_service
        .select_channel(session.id, company_id)
        .await;
    Json(localized(view, &locale, &app_state.i18n_store))
}

// POST /api/dev/support/desk/messages
#[utoipa::path(
    post,
    path = "/api/dev/support/desk/messages",
    tag = "Suporte",
    request_body = SendMessagePayload,
    responses((status = 200, description = "Resultado do envio e a mesa atualizada", body = DeskSendResponse)),
    security(("api_jwt" = []))
)]
pub async fn send_from_desk(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(session): AuthenticatedUser,
    Json(payload): Json<SendMessagePayload>,
) -> Json<DeskSendResponse> {
    let (outcome, view) = app_state
        .support_service
        .send(session.id, &session.user, &payload.text)
        .await;

    let (status, message) = match outcome {
        SendOutcome::Ignored => (DeskSendStatus::Ignored, None),
        SendOutcome::Sent(message) => (DeskSendStatus::Sent, Some(message)),
        SendOutcome::Failed => (DeskSendStatus::Failed, None),
    };

    Json(DeskSendResponse {
        status,
        message,
        desk: localized(view, &locale, &app_state.i18n_store),
    })
}

// DELETE /api/dev/support/desk
#[utoipa::path(
    delete,
    path = "/api/dev/support/desk",
    tag = "Suporte",
    responses((status = 204, description = "Mesa fechada; polling cancelado")),
    security(("api_jwt" = []))
)]
pub async fn close_desk(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
) -> StatusCode {
    app_state.support_service.close(session.id).await;
    StatusCode::NO_CONTENT
}

// src/middleware/auth.rs

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{i18n::Locale, tenancy::TenantContext},
    models::auth::UserRole,
    services::session::Session,
};

type BearerHeader = TypedHeader<Authorization<Bearer>>;

// Sessão do usuário autenticado (colocada nos extensions pelos guards)
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Session);

fn authenticate(app_state: &AppState, bearer: Option<BearerHeader>) -> Result<Session, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AppError::InvalidToken)?;
    app_state.auth_service.validate_token(bearer.token())
}

// Qualquer usuário autenticado
pub async fn auth_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    bearer: Option<BearerHeader>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let session = authenticate(&app_state, bearer)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    request.extensions_mut().insert(AuthenticatedUser(session));
    Ok(next.run(request).await)
}

// Usuário de uma empresa cliente; o tenant vem da própria sessão
pub async fn tenant_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    bearer: Option<BearerHeader>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let session = authenticate(&app_state, bearer)
        .and_then(|session| match session.user.role {
            UserRole::Developer => Err(AppError::Forbidden),
            _ => Ok(session),
        })
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    request.extensions_mut().insert(TenantContext(session.user.company_id));
    request.extensions_mut().insert(AuthenticatedUser(session));
    Ok(next.run(request).await)
}

// Painel do desenvolvedor
pub async fn developer_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    bearer: Option<BearerHeader>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let session = authenticate(&app_state, bearer)
        .and_then(|session| match session.user.role {
            UserRole::Developer => Ok(session),
            _ => Err(AppError::Forbidden),
        })
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    request.extensions_mut().insert(AuthenticatedUser(session));
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(user.clone());
        }

        // Rota sem guard: trata como não autenticado
        let app_state = AppState::from_ref(state);
        let locale = Locale::from_request_parts(parts, state)
            .await
            .unwrap_or_else(|never| match never {});
        Err(AppError::InvalidToken.to_api_error(&locale, &app_state.i18n_store))
    }
}

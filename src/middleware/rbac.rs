// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::UserRole,
};

/// Papéis aceitos por uma rota.
pub trait RoleDef: Send + Sync + 'static {
    fn roles() -> &'static [UserRole];
}

/// Extractor (guardião): rejeita com 403 quem não tem um dos papéis de `T`.
pub struct RequireRole<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(session) = AuthenticatedUser::from_request_parts(parts, state).await?;

        if T::roles().contains(&session.user.role) {
            return Ok(RequireRole(PhantomData));
        }

        tracing::warn!(
            "⛔ Usuário {} ({:?}) sem papel para a rota {}",
            session.user.id,
            session.user.role,
            parts.uri.path()
        );
        let app_state = AppState::from_ref(state);
        let locale = Locale::from_request_parts(parts, state)
            .await
            .unwrap_or_else(|never| match never {});
        Err(AppError::Forbidden.to_api_error(&locale, &app_state.i18n_store))
    }
}

// ---
// PAPÉIS (TIPOS)
// ---

/// Administrador da empresa (cadastro de técnicos, exclusão de OS).
pub struct CompanyAdmin;
impl RoleDef for CompanyAdmin {
    fn roles() -> &'static [UserRole] {
        &[UserRole::Admin]
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// Erro de domínio. Nunca vai direto para o cliente: passa por `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Acesso negado")]
    Forbidden,

    #[error("Empresa não encontrada")]
    CompanyNotFound,

    #[error("Empresa bloqueada")]
    CompanyBlocked,

    #[error("A empresa do sistema não pode ser alterada")]
    SentinelCompany,

    #[error("Cliente não encontrado")]
    CustomerNotFound,

    #[error("Cliente possui ordens de serviço")]
    CustomerHasOrders,

    #[error("Ordem de serviço não encontrada")]
    OrderNotFound,

    #[error("Ordem de serviço finalizada")]
    OrderFinished,

    #[error("Técnico não encontrado")]
    TechnicianNotFound,

    #[error("Limite de técnicos atingido")]
    TechnicianLimit,

    #[error("Notificação não encontrada")]
    NotificationNotFound,

    #[error("Mensagem vazia")]
    EmptyMessage,

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Chave do catálogo de mensagens (locales/*.json).
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation",
            AppError::EmailAlreadyExists => "email_already_exists",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::InvalidToken | AppError::JwtError(_) => "invalid_token",
            AppError::UserNotFound => "user_not_found",
            AppError::Forbidden => "forbidden",
            AppError::CompanyNotFound => "company_not_found",
            AppError::CompanyBlocked => "company_blocked",
            AppError::SentinelCompany => "sentinel_company",
            AppError::CustomerNotFound => "customer_not_found",
            AppError::CustomerHasOrders => "customer_has_orders",
            AppError::OrderNotFound => "order_not_found",
            AppError::OrderFinished => "order_finished",
            AppError::TechnicianNotFound => "technician_not_found",
            AppError::TechnicianLimit => "technician_limit",
            AppError::NotificationNotFound => "notification_not_found",
            AppError::EmptyMessage => "empty_message",
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::EmptyMessage => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken | AppError::JwtError(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden | AppError::CompanyBlocked | AppError::SentinelCompany => {
                StatusCode::FORBIDDEN
            }
            AppError::UserNotFound
            | AppError::CompanyNotFound
            | AppError::CustomerNotFound
            | AppError::OrderNotFound
            | AppError::TechnicianNotFound
            | AppError::NotificationNotFound => StatusCode::NOT_FOUND,
            AppError::EmailAlreadyExists
            | AppError::CustomerHasOrders
            | AppError::OrderFinished
            | AppError::TechnicianLimit => StatusCode::CONFLICT,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte para a resposta HTTP, traduzindo a mensagem para o idioma do cliente.
    pub fn to_api_error(self, locale: &Locale, i18n_store: &I18nStore) -> ApiError {
        let status = self.status();
        let error = i18n_store.translate(&locale.0, self.code());

        // Os detalhes internos ficam só no log
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let details = match &self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<Value> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .map(Value::String)
                        .collect();
                    details.insert(field.to_string(), Value::Array(messages));
                }
                Some(Value::Object(details))
            }
            _ => None,
        };

        ApiError { status, error, details }
    }
}

// O que o cliente recebe
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

// src/models/operations.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- Enums ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Open,
    InProgress,
    WaitingParts,
    Finished,
}

impl OrderStatus {
    // FINISHED é terminal: a OS não volta mais para a fila
    pub fn is_terminal(self) -> bool {
        self == OrderStatus::Finished
    }
}

// --- Ordem de Serviço ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOrder {
    pub id: Uuid,
    #[schema(ignore)]
    pub company_id: Uuid,
    #[schema(example = 1024)]
    pub number: i32,

    pub customer_id: Uuid,
    // Cópia desnormalizada; acompanha o nome atual do cliente
    #[schema(example = "Ana Pereira")]
    pub customer_name: String,

    pub technician_id: Option<Uuid>,
    #[schema(example = "Carlos Técnico")]
    pub technician_name: Option<String>,

    #[schema(example = "Geladeira não gela")]
    pub description: String,
    #[schema(example = "Refrigerador Brastemp Frost Free")]
    pub equipment: Option<String>,

    pub status: OrderStatus,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,

    #[schema(example = "350.00")]
    pub price: Option<Decimal>,
    // Laudo técnico
    pub report: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    pub customer_id: Uuid,
    pub technician_id: Option<Uuid>,
    #[validate(length(min = 1, message = "A descrição é obrigatória."))]
    pub description: String,
    pub equipment: Option<String>,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub price: Option<Decimal>,
}

// Edição parcial: só os campos enviados são alterados
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderPayload {
    pub technician_id: Option<Uuid>,
    pub description: Option<String>,
    pub equipment: Option<String>,
    pub status: Option<OrderStatus>,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub price: Option<Decimal>,
    pub report: Option<String>,
}

// Rascunho já resolvido pelo serviço (nomes copiados do cliente e do técnico)
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub customer_id: Uuid,
    pub customer_name: String,
    pub technician_id: Option<Uuid>,
    pub technician_name: Option<String>,
    pub description: String,
    pub equipment: Option<String>,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub price: Option<Decimal>,
}

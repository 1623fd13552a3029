// src/models/crm.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- CLIENTE (O Dado) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    #[schema(ignore)]
    pub company_id: Uuid,

    #[schema(example = "Ana Pereira")]
    pub full_name: String,
    #[schema(example = "123.456.789-00")]
    pub document_number: Option<String>,

    pub email: Option<String>,
    #[schema(example = "(11) 99999-8888")]
    pub phone: Option<String>,

    // Endereço
    pub street: Option<String>,
    pub number: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,

    // Observações livres
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Usado tanto na criação quanto na edição (PUT substitui todos os campos)
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    #[schema(example = "Ana Pereira")]
    pub full_name: String,
    pub document_number: Option<String>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub notes: Option<String>,
}

// Campo em branco vira NULL
fn blank_to_none(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl CustomerInput {
    /// Remove espaços das pontas e troca textos vazios por `None`.
    pub fn normalized(&self) -> Self {
        Self {
            full_name: self.full_name.trim().to_string(),
            document_number: blank_to_none(&self.document_number),
            email: blank_to_none(&self.email),
            phone: blank_to_none(&self.phone),
            street: blank_to_none(&self.street),
            number: blank_to_none(&self.number),
            district: blank_to_none(&self.district),
            city: blank_to_none(&self.city),
            state: blank_to_none(&self.state),
            zip_code: blank_to_none(&self.zip_code),
            notes: blank_to_none(&self.notes),
        }
    }
}

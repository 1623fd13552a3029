// src/models/support.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

pub const SUPPORT_CHANNEL_PREFIX: &str = "support_";

/// Canal de suporte de uma empresa: `"support_" + companyId`.
pub fn support_channel_id(company_id: Uuid) -> String {
    format!("{SUPPORT_CHANNEL_PREFIX}{company_id}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub company_id: Uuid,
    #[schema(example = "support_550e8400-e29b-41d4-a716-446655440000")]
    pub channel_id: String,
    pub sender_id: Uuid,
    #[schema(example = "Suporte")]
    pub sender_name: String,
    pub receiver_id: Uuid,
    #[schema(example = "Olá! Como podemos ajudar?")]
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Cópia local de uma mensagem ainda não confirmada pelo servidor.
    pub fn optimistic(outgoing: &NewChatMessage, sent_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            company_id: outgoing.company_id,
            channel_id: outgoing.channel_id.clone(),
            sender_id: outgoing.sender_id,
            sender_name: outgoing.sender_name.clone(),
            receiver_id: outgoing.receiver_id,
            text: outgoing.text.clone(),
            sent_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewChatMessage {
    pub company_id: Uuid,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub receiver_id: Uuid,
    pub channel_id: String,
    pub text: String,
}

// Derivado: um por empresa que já trocou mensagens com o suporte
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupportChannel {
    pub company_id: Uuid,
    pub channel_id: String,
    #[schema(example = "Oficina do Zé")]
    pub company_name: String,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessagePayload {
    #[schema(example = "Bom dia, preciso de ajuda com o relatório.")]
    pub text: String,
}

// --- Mesa de suporte (painel do desenvolvedor) ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeskPhase {
    #[default]
    Idle,
    Loading,
    Active,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeskView {
    pub phase: DeskPhase,
    pub selected_company_id: Option<Uuid>,
    pub channels: Vec<SupportChannel>,
    pub messages: Vec<ChatMessage>,
    // Aviso transitório (some sozinho depois de alguns segundos)
    pub notice: Option<String>,
}

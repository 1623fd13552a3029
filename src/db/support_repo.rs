// src/db/support_repo.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::{PgStore, SupportStore},
    models::support::{ChatMessage, NewChatMessage, SupportChannel},
};

#[async_trait]
impl SupportStore for PgStore {
    /// Um canal por empresa com mensagens; a prévia é a última mensagem.
    async fn list_support_channels(&self) -> Result<Vec<SupportChannel>, AppError> {
        let channels = sqlx::query_as::<_, SupportChannel>(
            r#"
            SELECT * FROM (
                SELECT DISTINCT ON (m.company_id)
                    m.company_id,
                    m.channel_id,
                    c.trade_name AS company_name,
                    m.text AS last_message,
                    m.sent_at AS last_message_at
                FROM chat_messages m
                JOIN companies c ON c.id = m.company_id
                ORDER BY m.company_id, m.sent_at DESC
            ) latest
            ORDER BY last_message_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(channels)
    }

    async fn list_support_messages(&self, company_id: Uuid) -> Result<Vec<ChatMessage>, AppError> {
        let messages = sqlx::query_as::<_, ChatMessage>(
            "SELECT * FROM chat_messages WHERE company_id = $1 ORDER BY sent_at ASC",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    async fn send_message(&self, message: &NewChatMessage) -> Result<ChatMessage, AppError> {
        let sent = sqlx::query_as::<_, ChatMessage>(
            r#"
            INSERT INTO chat_messages (company_id, channel_id, sender_id, sender_name, receiver_id, text)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(message.company_id)
        .bind(&message.channel_id)
        .bind(message.sender_id)
        .bind(&message.sender_name)
        .bind(message.receiver_id)
        .bind(&message.text)
        .fetch_one(&self.pool)
        .await?;

        Ok(sent)
    }
}

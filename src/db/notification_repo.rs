// src/db/notification_repo.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::{db_utils::begin_scoped, error::AppError},
    db::store::{NotificationStore, PgStore},
    models::notifications::{NewNotification, Notification},
};

#[async_trait]
impl NotificationStore for PgStore {
    async fn list_notifications(&self, company_id: Uuid) -> Result<Vec<Notification>, AppError> {
        let mut tx = begin_scoped(&self.pool, company_id).await?;

        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE company_id = $1 ORDER BY created_at DESC",
        )
        .bind(company_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(notifications)
    }

    // Enviada pelo painel do desenvolvedor (sem escopo de tenant)
    async fn create_notification(
        &self,
        company_id: Uuid,
        input: &NewNotification,
    ) -> Result<Notification, AppError> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (company_id, title, body)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(&input.title)
        .bind(&input.body)
        .fetch_one(&self.pool)
        .await?;

        Ok(notification)
    }

    async fn mark_notification_read(&self, company_id: Uuid, id: Uuid) -> Result<Notification, AppError> {
        let mut tx = begin_scoped(&self.pool, company_id).await?;

        let notification = sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET read = TRUE WHERE company_id = $1 AND id = $2 RETURNING *",
        )
        .bind(company_id)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotificationNotFound)?;

        tx.commit().await?;
        Ok(notification)
    }
}

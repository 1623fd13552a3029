// src/services/notification_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::RecordStore,
    models::notifications::Notification,
};

// Lado da empresa: os avisos são criados pelo painel (TenantService::notify)
#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn RecordStore>,
}

impl NotificationService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, company_id: Uuid) -> Result<Vec<Notification>, AppError> {
        self.store.list_notifications(company_id).await
    }

    pub async fn mark_read(&self, company_id: Uuid, id: Uuid) -> Result<Notification, AppError> {
        self.store.mark_notification_read(company_id, id).await
    }
}

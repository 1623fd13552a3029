// src/services/operation_service.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::RecordStore,
    models::{
        auth::{User, UserRole},
        operations::{CreateOrderPayload, OrderDraft, OrderStatus, ServiceOrder, UpdateOrderPayload},
    },
};

/// Aplica uma edição parcial. OS finalizada não muda mais; ao entrar em
/// FINISHED a data de conclusão é carimbada.
pub fn apply_update(
    mut order: ServiceOrder,
    update: &UpdateOrderPayload,
    technician: Option<&User>,
    now: DateTime<Utc>,
) -> Result<ServiceOrder, AppError> {
    if order.status.is_terminal() {
        return Err(AppError::OrderFinished);
    }

    if let Some(technician) = technician {
        order.technician_id = Some(technician.id);
        order.technician_name = Some(technician.name.clone());
    }
    if let Some(description) = &update.description {
        order.description = description.trim().to_string();
    }
    if let Some(equipment) = &update.equipment {
        order.equipment = Some(equipment.clone());
    }
    if let Some(scheduled_for) = update.scheduled_for {
        order.scheduled_for = Some(scheduled_for);
    }
    if let Some(price) = update.price {
        order.price = Some(price);
    }
    if let Some(report) = &update.report {
        order.report = Some(report.clone());
    }
    if let Some(status) = update.status {
        order.status = status;
        if status == OrderStatus::Finished {
            order.finished_at = Some(now);
        }
    }

    Ok(order)
}

#[derive(Clone)]
pub struct OperationsService {
    store: Arc<dyn RecordStore>,
}

impl OperationsService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    // Técnico precisa ser da mesma empresa (admin também atende)
    async fn resolve_technician(&self, company_id: Uuid, id: Uuid) -> Result<User, AppError> {
        self.store
            .find_user_by_id(id)
            .await?
            .filter(|u| u.company_id == company_id)
            .filter(|u| matches!(u.role, UserRole::Technician | UserRole::Admin))
            .ok_or(AppError::TechnicianNotFound)
    }

    pub async fn list_orders(&self, company_id: Uuid) -> Result<Vec<ServiceOrder>, AppError> {
        self.store.list_orders(company_id).await
    }

    pub async fn get_order(&self, company_id: Uuid, id: Uuid) -> Result<ServiceOrder, AppError> {
        self.store
            .find_order(company_id, id)
            .await?
            .ok_or(AppError::OrderNotFound)
    }

    pub async fn create_order(
        &self,
        company_id: Uuid,
        payload: &CreateOrderPayload,
    ) -> Result<ServiceOrder, AppError> {
        let customer = self
            .store
            .find_customer(company_id, payload.customer_id)
            .await?
            .ok_or(AppError::CustomerNotFound)?;

        let technician = match payload.technician_id {
            Some(id) => Some(self.resolve_technician(company_id, id).await?),
            None => None,
        };

        // Nomes copiados agora; a renomeação do cliente mantém a cópia em dia
        let draft = OrderDraft {
            customer_id: customer.id,
            customer_name: customer.full_name,
            technician_id: technician.as_ref().map(|t| t.id),
            technician_name: technician.map(|t| t.name),
            description: payload.description.trim().to_string(),
            equipment: payload.equipment.clone(),
            scheduled_for: payload.scheduled_for,
            price: payload.price,
        };

        let order = self.store.insert_order(company_id, &draft).await?;
        tracing::info!("📋 OS #{} aberta para '{}'.", order.number, order.customer_name);
        Ok(order)
    }

    pub async fn update_order(
        &self,
        company_id: Uuid,
        id: Uuid,
        payload: &UpdateOrderPayload,
    ) -> Result<ServiceOrder, AppError> {
        let order = self.get_order(company_id, id).await?;

        let technician = match payload.technician_id {
            Some(technician_id) => Some(self.resolve_technician(company_id, technician_id).await?),
            None => None,
        };

        let updated = apply_update(order, payload, technician.as_ref(), Utc::now())?;
        self.store.save_order(&updated).await
    }

    pub async fn delete_order(&self, company_id: Uuid, id: Uuid) -> Result<(), AppError> {
        self.store.delete_order(company_id, id).await
    }
}

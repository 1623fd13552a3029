// src/services/crm_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::RecordStore,
    models::crm::{Customer, CustomerInput},
};

#[derive(Clone)]
pub struct CrmService {
    store: Arc<dyn RecordStore>,
}

impl CrmService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn list_customers(&self, company_id: Uuid) -> Result<Vec<Customer>, AppError> {
        self.store.list_customers(company_id).await
    }

    pub async fn get_customer(&self, company_id: Uuid, id: Uuid) -> Result<Customer, AppError> {
        self.store
            .find_customer(company_id, id)
            .await?
            .ok_or(AppError::CustomerNotFound)
    }

    pub async fn create_customer(&self, company_id: Uuid, input: &CustomerInput) -> Result<Customer, AppError> {
        self.store.create_customer(company_id, &input.normalized()).await
    }

    /// O nome novo vai junto para as ordens do cliente (mesma transação).
    pub async fn update_customer(
        &self,
        company_id: Uuid,
        id: Uuid,
        input: &CustomerInput,
    ) -> Result<Customer, AppError> {
        self.store.update_customer(company_id, id, &input.normalized()).await
    }

    pub async fn delete_customer(&self, company_id: Uuid, id: Uuid) -> Result<(), AppError> {
        self.store.delete_customer(company_id, id).await
    }
}

// src/db/store.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::{NewUser, User, UserRole},
        crm::{Customer, CustomerInput},
        finance::{NewPayment, Payment},
        notifications::{NewNotification, Notification},
        operations::{OrderDraft, ServiceOrder},
        support::{ChatMessage, NewChatMessage, SupportChannel},
        tenancy::{BillingAdjustment, Company, CompanySettings, CompanyStatus, NewCompany},
    },
};

// =========================================================================
//  CAMADA DE ACESSO A REGISTROS
//  Operações uniformes por entidade; a implementação real fala com o
//  Postgres (PgStore) e os testes usam a MemoryStore.
// =========================================================================

#[async_trait]
pub trait CompanyStore: Send + Sync {
    async fn list_companies(&self) -> Result<Vec<Company>, AppError>;

    async fn find_company(&self, id: Uuid) -> Result<Option<Company>, AppError>;

    async fn create_company(&self, input: &NewCompany) -> Result<Company, AppError>;

    /// Cria a empresa e o seu primeiro administrador na mesma transação.
    async fn register_company(
        &self,
        company: &NewCompany,
        admin: &NewUser,
    ) -> Result<(Company, User), AppError>;

    async fn set_company_status(&self, id: Uuid, status: CompanyStatus) -> Result<Company, AppError>;

    async fn adjust_billing(&self, id: Uuid, adjustment: &BillingAdjustment) -> Result<Company, AppError>;

    async fn update_settings(&self, id: Uuid, settings: &CompanySettings) -> Result<Company, AppError>;

    /// Remove a empresa; usuários, clientes, ordens, mensagens, pagamentos e
    /// notificações vão junto (cascata).
    async fn purge_company(&self, id: Uuid) -> Result<(), AppError>;

    async fn record_payment(&self, company_id: Uuid, payment: &NewPayment) -> Result<Payment, AppError>;

    async fn list_payments(&self, company_id: Uuid) -> Result<Vec<Payment>, AppError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn create_user(&self, company_id: Uuid, user: &NewUser) -> Result<User, AppError>;

    async fn list_users(&self, company_id: Uuid, role: UserRole) -> Result<Vec<User>, AppError>;
}

#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn list_customers(&self, company_id: Uuid) -> Result<Vec<Customer>, AppError>;

    async fn find_customer(&self, company_id: Uuid, id: Uuid) -> Result<Option<Customer>, AppError>;

    async fn create_customer(&self, company_id: Uuid, input: &CustomerInput) -> Result<Customer, AppError>;

    /// Atualiza o cliente e propaga o nome para as ordens de serviço dele.
    async fn update_customer(
        &self,
        company_id: Uuid,
        id: Uuid,
        input: &CustomerInput,
    ) -> Result<Customer, AppError>;

    async fn delete_customer(&self, company_id: Uuid, id: Uuid) -> Result<(), AppError>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn list_orders(&self, company_id: Uuid) -> Result<Vec<ServiceOrder>, AppError>;

    async fn find_order(&self, company_id: Uuid, id: Uuid) -> Result<Option<ServiceOrder>, AppError>;

    async fn insert_order(&self, company_id: Uuid, draft: &OrderDraft) -> Result<ServiceOrder, AppError>;

    async fn save_order(&self, order: &ServiceOrder) -> Result<ServiceOrder, AppError>;

    async fn delete_order(&self, company_id: Uuid, id: Uuid) -> Result<(), AppError>;
}

#[async_trait]
pub trait SupportStore: Send + Sync {
    async fn list_support_channels(&self) -> Result<Vec<SupportChannel>, AppError>;

    async fn list_support_messages(&self, company_id: Uuid) -> Result<Vec<ChatMessage>, AppError>;

    async fn send_message(&self, message: &NewChatMessage) -> Result<ChatMessage, AppError>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn list_notifications(&self, company_id: Uuid) -> Result<Vec<Notification>, AppError>;

    async fn create_notification(
        &self,
        company_id: Uuid,
        input: &NewNotification,
    ) -> Result<Notification, AppError>;

    async fn mark_notification_read(&self, company_id: Uuid, id: Uuid) -> Result<Notification, AppError>;
}

/// Tudo o que a aplicação consome do armazenamento.
pub trait RecordStore:
    CompanyStore + UserStore + CustomerStore + OrderStore + SupportStore + NotificationStore
{
}

impl<T> RecordStore for T where
    T: CompanyStore + UserStore + CustomerStore + OrderStore + SupportStore + NotificationStore
{
}

// A implementação Postgres; cada área tem o seu arquivo *_repo.rs
#[derive(Clone)]
pub struct PgStore {
    pub(crate) pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

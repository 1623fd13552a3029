//! Armazenamento em memória para testes.
//!
//! Implementa todas as traits da camada de acesso a registros sobre vetores
//! protegidos por `RwLock`. Também conta leituras de mensagens por empresa e
//! permite simular falhas, o que os testes da mesa de suporte usam.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::{CompanyStore, CustomerStore, NotificationStore, OrderStore, SupportStore, UserStore},
    models::{
        auth::{NewUser, User, UserRole},
        crm::{Customer, CustomerInput},
        finance::{NewPayment, Payment},
        notifications::{NewNotification, Notification},
        operations::{OrderDraft, OrderStatus, ServiceOrder},
        support::{support_channel_id, ChatMessage, NewChatMessage, SupportChannel},
        tenancy::{
            BillingAdjustment, BillingCycle, Company, CompanySettings, CompanyStatus, NewCompany,
            PlanTier,
        },
    },
};

#[derive(Default)]
struct Tables {
    companies: Vec<Company>,
    users: Vec<User>,
    customers: Vec<Customer>,
    orders: Vec<ServiceOrder>,
    messages: Vec<ChatMessage>,
    payments: Vec<Payment>,
    notifications: Vec<Notification>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    message_fetches: Mutex<HashMap<Uuid, usize>>,
    sends: AtomicUsize,
    fail_channel_reads: AtomicBool,
    fail_message_reads: AtomicBool,
    fail_sends: AtomicBool,
}

fn simulated_outage() -> AppError {
    AppError::InternalServerError(anyhow::anyhow!("falha simulada do armazenamento"))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    // --- Semeadura ---

    pub fn insert_company(&self, company: Company) {
        self.write().companies.push(company);
    }

    pub fn insert_user(&self, user: User) {
        self.write().users.push(user);
    }

    /// Mensagem que "chegou" pelo outro lado (sem passar por send_message).
    pub fn push_message(&self, company_id: Uuid, sender_name: &str, text: &str, sent_at: DateTime<Utc>) {
        self.write().messages.push(ChatMessage {
            id: Uuid::new_v4(),
            company_id,
            channel_id: support_channel_id(company_id),
            sender_id: Uuid::new_v4(),
            sender_name: sender_name.to_string(),
            receiver_id: Uuid::nil(),
            text: text.to_string(),
            sent_at,
        });
    }

    // --- Inspeção e falhas simuladas ---

    pub fn message_fetches(&self, company_id: Uuid) -> usize {
        let fetches = self.message_fetches.lock().unwrap_or_else(PoisonError::into_inner);
        fetches.get(&company_id).copied().unwrap_or(0)
    }

    pub fn sends(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }

    pub fn fail_channel_reads(&self, fail: bool) {
        self.fail_channel_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_message_reads(&self, fail: bool) {
        self.fail_message_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub fn stored_messages(&self, company_id: Uuid) -> Vec<ChatMessage> {
        self.read()
            .messages
            .iter()
            .filter(|m| m.company_id == company_id)
            .cloned()
            .collect()
    }

    fn build_company(input: &NewCompany, created_at: DateTime<Utc>) -> Company {
        Company {
            id: Uuid::new_v4(),
            trade_name: input.trade_name.clone(),
            corporate_name: input.corporate_name.clone(),
            document_number: input.document_number.clone(),
            plan: input.plan,
            billing_cycle: input.billing_cycle,
            monthly_fee: input.monthly_fee,
            refunded_amount: None,
            status: CompanyStatus::Active,
            settings: Json(CompanySettings::default()),
            created_at: Some(created_at),
            expires_at: input.expires_at,
        }
    }

    fn build_user(company_id: Uuid, user: &NewUser) -> User {
        User {
            id: Uuid::new_v4(),
            company_id,
            name: user.name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role,
            created_at: Utc::now(),
        }
    }
}

/// Empresa pronta para testes; `created` no formato AAAA-MM-DD.
pub fn sample_company(
    trade_name: &str,
    monthly_fee: i64,
    refunded_amount: i64,
    created: Option<&str>,
    status: CompanyStatus,
) -> Company {
    let created_at = created.map(|day| {
        NaiveDate::parse_from_str(day, "%Y-%m-%d")
            .expect("data de fixture inválida")
            .and_hms_opt(12, 0, 0)
            .expect("horário válido")
            .and_utc()
    });

    Company {
        id: Uuid::new_v4(),
        trade_name: trade_name.to_string(),
        corporate_name: None,
        document_number: None,
        plan: PlanTier::Prata,
        billing_cycle: BillingCycle::Monthly,
        monthly_fee: Decimal::from(monthly_fee),
        refunded_amount: Some(Decimal::from(refunded_amount)),
        status,
        settings: Json(CompanySettings::default()),
        created_at,
        expires_at: None,
    }
}

/// Usuário pronto para testes (hash bcrypt de custo mínimo).
pub fn sample_user(company_id: Uuid, email: &str, password: &str, role: UserRole) -> User {
    User {
        id: Uuid::new_v4(),
        company_id,
        name: email.split('@').next().unwrap_or(email).to_string(),
        email: email.to_string(),
        password_hash: bcrypt::hash(password, 4).expect("hash de teste"),
        role,
        created_at: Utc::now(),
    }
}

#[async_trait]
impl CompanyStore for MemoryStore {
    async fn list_companies(&self) -> Result<Vec<Company>, AppError> {
        Ok(self.read().companies.clone())
    }

    async fn find_company(&self, id: Uuid) -> Result<Option<Company>, AppError> {
        Ok(self.read().companies.iter().find(|c| c.id == id).cloned())
    }

    async fn create_company(&self, input: &NewCompany) -> Result<Company, AppError> {
        let company = Self::build_company(input, Utc::now());
        self.write().companies.push(company.clone());
        Ok(company)
    }

    async fn register_company(
        &self,
        company: &NewCompany,
        admin: &NewUser,
    ) -> Result<(Company, User), AppError> {
        let mut tables = self.write();
        if tables.users.iter().any(|u| u.email == admin.email) {
            return Err(AppError::EmailAlreadyExists);
        }
        let company = Self::build_company(company, Utc::now());
        let user = Self::build_user(company.id, admin);
        tables.companies.push(company.clone());
        tables.users.push(user.clone());
        Ok((company, user))
    }

    async fn set_company_status(&self, id: Uuid, status: CompanyStatus) -> Result<Company, AppError> {
        let mut tables = self.write();
        let company = tables
            .companies
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(AppError::CompanyNotFound)?;
        company.status = status;
        Ok(company.clone())
    }

    async fn adjust_billing(&self, id: Uuid, adjustment: &BillingAdjustment) -> Result<Company, AppError> {
        let mut tables = self.write();
        let company = tables
            .companies
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(AppError::CompanyNotFound)?;
        if let Some(plan) = adjustment.plan {
            company.plan = plan;
        }
        if let Some(cycle) = adjustment.billing_cycle {
            company.billing_cycle = cycle;
        }
        if let Some(fee) = adjustment.monthly_fee {
            company.monthly_fee = fee;
        }
        if let Some(refunded) = adjustment.refunded_amount {
            company.refunded_amount = Some(refunded);
        }
        if let Some(expires_at) = adjustment.expires_at {
            company.expires_at = Some(expires_at);
        }
        Ok(company.clone())
    }

    async fn update_settings(&self, id: Uuid, settings: &CompanySettings) -> Result<Company, AppError> {
        let mut tables = self.write();
        let company = tables
            .companies
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(AppError::CompanyNotFound)?;
        company.settings = Json(settings.clone());
        Ok(company.clone())
    }

    async fn purge_company(&self, id: Uuid) -> Result<(), AppError> {
        let mut tables = self.write();
        let before = tables.companies.len();
        tables.companies.retain(|c| c.id != id);
        if tables.companies.len() == before {
            return Err(AppError::CompanyNotFound);
        }
        // Cascata
        tables.users.retain(|u| u.company_id != id);
        tables.customers.retain(|c| c.company_id != id);
        tables.orders.retain(|o| o.company_id != id);
        tables.messages.retain(|m| m.company_id != id);
        tables.payments.retain(|p| p.company_id != id);
        tables.notifications.retain(|n| n.company_id != id);
        Ok(())
    }

    async fn record_payment(&self, company_id: Uuid, payment: &NewPayment) -> Result<Payment, AppError> {
        let mut tables = self.write();
        if !tables.companies.iter().any(|c| c.id == company_id) {
            return Err(AppError::CompanyNotFound);
        }
        let payment = Payment {
            id: Uuid::new_v4(),
            company_id,
            amount: payment.amount,
            reference_month: payment.reference_month.clone(),
            note: payment.note.clone(),
            paid_at: payment.paid_at.unwrap_or_else(Utc::now),
        };
        tables.payments.push(payment.clone());
        Ok(payment)
    }

    async fn list_payments(&self, company_id: Uuid) -> Result<Vec<Payment>, AppError> {
        let mut payments: Vec<Payment> = self
            .read()
            .payments
            .iter()
            .filter(|p| p.company_id == company_id)
            .cloned()
            .collect();
        payments.sort_by(|a, b| b.paid_at.cmp(&a.paid_at));
        Ok(payments)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.read().users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.read().users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_user(&self, company_id: Uuid, user: &NewUser) -> Result<User, AppError> {
        let mut tables = self.write();
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::EmailAlreadyExists);
        }
        let user = Self::build_user(company_id, user);
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn list_users(&self, company_id: Uuid, role: UserRole) -> Result<Vec<User>, AppError> {
        Ok(self
            .read()
            .users
            .iter()
            .filter(|u| u.company_id == company_id && u.role == role)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CustomerStore for MemoryStore {
    async fn list_customers(&self, company_id: Uuid) -> Result<Vec<Customer>, AppError> {
        let mut customers: Vec<Customer> = self
            .read()
            .customers
            .iter()
            .filter(|c| c.company_id == company_id)
            .cloned()
            .collect();
        customers.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(customers)
    }

    async fn find_customer(&self, company_id: Uuid, id: Uuid) -> Result<Option<Customer>, AppError> {
        Ok(self
            .read()
            .customers
            .iter()
            .find(|c| c.company_id == company_id && c.id == id)
            .cloned())
    }

    async fn create_customer(&self, company_id: Uuid, input: &CustomerInput) -> Result<Customer, AppError> {
        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4(),
            company_id,
            full_name: input.full_name.clone(),
            document_number: input.document_number.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            street: input.street.clone(),
            number: input.number.clone(),
            district: input.district.clone(),
            city: input.city.clone(),
            state: input.state.clone(),
            zip_code: input.zip_code.clone(),
            notes: input.notes.clone(),
            created_at: now,
            updated_at: now,
        };
        self.write().customers.push(customer.clone());
        Ok(customer)
    }

    async fn update_customer(
        &self,
        company_id: Uuid,
        id: Uuid,
        input: &CustomerInput,
    ) -> Result<Customer, AppError> {
        let mut tables = self.write();
        let customer = tables
            .customers
            .iter_mut()
            .find(|c| c.company_id == company_id && c.id == id)
            .ok_or(AppError::CustomerNotFound)?;

        customer.full_name = input.full_name.clone();
        customer.document_number = input.document_number.clone();
        customer.email = input.email.clone();
        customer.phone = input.phone.clone();
        customer.street = input.street.clone();
        customer.number = input.number.clone();
        customer.district = input.district.clone();
        customer.city = input.city.clone();
        customer.state = input.state.clone();
        customer.zip_code = input.zip_code.clone();
        customer.notes = input.notes.clone();
        customer.updated_at = Utc::now();
        let updated = customer.clone();

        for order in tables
            .orders
            .iter_mut()
            .filter(|o| o.company_id == company_id && o.customer_id == id)
        {
            order.customer_name = updated.full_name.clone();
        }

        Ok(updated)
    }

    async fn delete_customer(&self, company_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let mut tables = self.write();
        if tables.orders.iter().any(|o| o.customer_id == id) {
            return Err(AppError::CustomerHasOrders);
        }
        let before = tables.customers.len();
        tables.customers.retain(|c| !(c.company_id == company_id && c.id == id));
        if tables.customers.len() == before {
            return Err(AppError::CustomerNotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn list_orders(&self, company_id: Uuid) -> Result<Vec<ServiceOrder>, AppError> {
        let mut orders: Vec<ServiceOrder> = self
            .read()
            .orders
            .iter()
            .filter(|o| o.company_id == company_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.number.cmp(&a.number));
        Ok(orders)
    }

    async fn find_order(&self, company_id: Uuid, id: Uuid) -> Result<Option<ServiceOrder>, AppError> {
        Ok(self
            .read()
            .orders
            .iter()
            .find(|o| o.company_id == company_id && o.id == id)
            .cloned())
    }

    async fn insert_order(&self, company_id: Uuid, draft: &OrderDraft) -> Result<ServiceOrder, AppError> {
        let mut tables = self.write();
        let number = tables
            .orders
            .iter()
            .filter(|o| o.company_id == company_id)
            .map(|o| o.number)
            .max()
            .unwrap_or(0)
            + 1;
        let now = Utc::now();
        let order = ServiceOrder {
            id: Uuid::new_v4(),
            company_id,
            number,
            customer_id: draft.customer_id,
            customer_name: draft.customer_name.clone(),
            technician_id: draft.technician_id,
            technician_name: draft.technician_name.clone(),
            description: draft.description.clone(),
            equipment: draft.equipment.clone(),
            status: OrderStatus::Open,
            scheduled_for: draft.scheduled_for,
            finished_at: None,
            price: draft.price,
            report: None,
            created_at: now,
            updated_at: now,
        };
        tables.orders.push(order.clone());
        Ok(order)
    }

    async fn save_order(&self, order: &ServiceOrder) -> Result<ServiceOrder, AppError> {
        let mut tables = self.write();
        let stored = tables
            .orders
            .iter_mut()
            .find(|o| o.company_id == order.company_id && o.id == order.id)
            .ok_or(AppError::OrderNotFound)?;
        *stored = ServiceOrder {
            updated_at: Utc::now(),
            ..order.clone()
        };
        Ok(stored.clone())
    }

    async fn delete_order(&self, company_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let mut tables = self.write();
        let before = tables.orders.len();
        tables.orders.retain(|o| !(o.company_id == company_id && o.id == id));
        if tables.orders.len() == before {
            return Err(AppError::OrderNotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl SupportStore for MemoryStore {
    async fn list_support_channels(&self) -> Result<Vec<SupportChannel>, AppError> {
        if self.fail_channel_reads.load(Ordering::SeqCst) {
            return Err(simulated_outage());
        }
        let tables = self.read();
        let mut latest: HashMap<Uuid, &ChatMessage> = HashMap::new();
        for message in &tables.messages {
            let entry = latest.entry(message.company_id).or_insert(message);
            if message.sent_at > entry.sent_at {
                *entry = message;
            }
        }

        let mut channels: Vec<SupportChannel> = latest
            .into_values()
            .map(|m| SupportChannel {
                company_id: m.company_id,
                channel_id: m.channel_id.clone(),
                company_name: tables
                    .companies
                    .iter()
                    .find(|c| c.id == m.company_id)
                    .map(|c| c.trade_name.clone())
                    .unwrap_or_default(),
                last_message: Some(m.text.clone()),
                last_message_at: Some(m.sent_at),
            })
            .collect();
        channels.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
        Ok(channels)
    }

    async fn list_support_messages(&self, company_id: Uuid) -> Result<Vec<ChatMessage>, AppError> {
        *self
            .message_fetches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(company_id)
            .or_insert(0) += 1;

        if self.fail_message_reads.load(Ordering::SeqCst) {
            return Err(simulated_outage());
        }
        let mut messages = self.stored_messages(company_id);
        messages.sort_by(|a, b| a.sent_at.cmp(&b.sent_at));
        Ok(messages)
    }

    async fn send_message(&self, message: &NewChatMessage) -> Result<ChatMessage, AppError> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(simulated_outage());
        }
        let sent = ChatMessage {
            id: Uuid::new_v4(),
            company_id: message.company_id,
            channel_id: message.channel_id.clone(),
            sender_id: message.sender_id,
            sender_name: message.sender_name.clone(),
            receiver_id: message.receiver_id,
            text: message.text.clone(),
            sent_at: Utc::now(),
        };
        self.write().messages.push(sent.clone());
        Ok(sent)
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn list_notifications(&self, company_id: Uuid) -> Result<Vec<Notification>, AppError> {
        let mut notifications: Vec<Notification> = self
            .read()
            .notifications
            .iter()
            .filter(|n| n.company_id == company_id)
            .cloned()
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    async fn create_notification(
        &self,
        company_id: Uuid,
        input: &NewNotification,
    ) -> Result<Notification, AppError> {
        let notification = Notification {
            id: Uuid::new_v4(),
            company_id,
            title: input.title.clone(),
            body: input.body.clone(),
            read: false,
            created_at: Utc::now(),
        };
        self.write().notifications.push(notification.clone());
        Ok(notification)
    }

    async fn mark_notification_read(&self, company_id: Uuid, id: Uuid) -> Result<Notification, AppError> {
        let mut tables = self.write();
        let notification = tables
            .notifications
            .iter_mut()
            .find(|n| n.company_id == company_id && n.id == id)
            .ok_or(AppError::NotificationNotFound)?;
        notification.read = true;
        Ok(notification.clone())
    }
}

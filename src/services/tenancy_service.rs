// src/services/tenancy_service.rs

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::RecordStore,
    models::{
        finance::{CompanyBillingDetail, NewPayment, Payment},
        notifications::{NewNotification, Notification},
        tenancy::{BillingAdjustment, Company, CompanySettings, CompanyStatus, NewCompany},
    },
    services::session::SessionStore,
};

/// Gestão das empresas pelo painel do desenvolvedor.
pub const MAX_EXPIRING_DAYS: i64 = 3650;

#[derive(Clone)]
pub struct TenantService {
    store: Arc<dyn RecordStore>,
    sessions: SessionStore,
    sentinel_id: Uuid,
}

impl TenantService {
    pub fn new(store: Arc<dyn RecordStore>, sessions: SessionStore, sentinel_id: Uuid) -> Self {
        Self { store, sessions, sentinel_id }
    }

    // A empresa do sistema não aparece nem pode ser mexida por aqui
    fn guard_sentinel(&self, id: Uuid) -> Result<(), AppError> {
        if id == self.sentinel_id {
            return Err(AppError::SentinelCompany);
        }
        Ok(())
    }

    pub async fn list_companies(&self) -> Result<Vec<Company>, AppError> {
        let mut companies = self.store.list_companies().await?;
        companies.retain(|c| c.id != self.sentinel_id);
        Ok(companies)
    }

    pub async fn get_company(&self, id: Uuid) -> Result<Company, AppError> {
        self.guard_sentinel(id)?;
        self.store.find_company(id).await?.ok_or(AppError::CompanyNotFound)
    }

    pub async fn create_company(&self, input: &NewCompany) -> Result<Company, AppError> {
        let company = self.store.create_company(input).await?;
        tracing::info!("✅ Empresa '{}' criada pelo painel.", company.trade_name);
        Ok(company)
    }

    /// Bloquear derruba as sessões abertas da empresa.
    pub async fn set_status(&self, id: Uuid, status: CompanyStatus) -> Result<Company, AppError> {
        self.guard_sentinel(id)?;
        let company = self.store.set_company_status(id, status).await?;

        if status == CompanyStatus::Blocked {
            let ended = self.sessions.end_all_for_company(id);
            tracing::info!("🔒 Empresa '{}' bloqueada; {} sessões encerradas.", company.trade_name, ended.len());
        }
        Ok(company)
    }

    pub async fn adjust_billing(&self, id: Uuid, adjustment: &BillingAdjustment) -> Result<Company, AppError> {
        self.guard_sentinel(id)?;
        self.store.adjust_billing(id, adjustment).await
    }

    pub async fn update_settings(&self, id: Uuid, settings: &CompanySettings) -> Result<Company, AppError> {
        self.guard_sentinel(id)?;
        self.store.update_settings(id, settings).await
    }

    /// Exclusão definitiva; o banco apaga o resto em cascata.
    pub async fn purge(&self, id: Uuid) -> Result<(), AppError> {
        self.guard_sentinel(id)?;
        self.store.purge_company(id).await?;
        let ended = self.sessions.end_all_for_company(id);
        tracing::warn!("🗑️ Empresa {} excluída ({} sessões encerradas).", id, ended.len());
        Ok(())
    }

    // =========================================================================
    //  COBRANÇA
    // =========================================================================

    pub async fn record_payment(&self, id: Uuid, payment: &NewPayment) -> Result<Payment, AppError> {
        self.guard_sentinel(id)?;
        self.store.record_payment(id, payment).await
    }

    pub async fn list_payments(&self, id: Uuid) -> Result<Vec<Payment>, AppError> {
        self.get_company(id).await?;
        self.store.list_payments(id).await
    }

    pub async fn billing_detail(&self, id: Uuid) -> Result<CompanyBillingDetail, AppError> {
        let company = self.get_company(id).await?;
        let payments = self.store.list_payments(id).await?;
        Ok(CompanyBillingDetail {
            net_fee: company.net_fee(),
            company,
            payments,
        })
    }

    /// Empresas ativas cuja validade vence nos próximos `days` dias
    /// (a mais próxima primeiro). A janela vai de 0 a `MAX_EXPIRING_DAYS`.
    pub async fn expiring(&self, days: i64) -> Result<Vec<Company>, AppError> {
        let now = Utc::now();
        let horizon = now + Duration::days(days.clamp(0, MAX_EXPIRING_DAYS));

        let mut companies: Vec<Company> = self
            .list_companies()
            .await?
            .into_iter()
            .filter(|c| !c.is_blocked())
            .filter(|c| c.expires_at.is_some_and(|at| at >= now && at <= horizon))
            .collect();
        companies.sort_by_key(|c| c.expires_at);
        Ok(companies)
    }

    // =========================================================================
    //  AVISOS
    // =========================================================================

    pub async fn notify(&self, id: Uuid, input: &NewNotification) -> Result<Notification, AppError> {
        self.get_company(id).await?;
        self.store.create_notification(id, input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::CompanyStore;
    use crate::db::memory::{sample_company, sample_user, MemoryStore};
    use crate::models::auth::UserRole;
    use rust_decimal::Decimal;

    struct Fixture {
        store: Arc<MemoryStore>,
        sessions: SessionStore,
        service: TenantService,
        sentinel: Company,
        tenant: Company,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let sentinel = sample_company("Sistema", 0, 0, None, CompanyStatus::Active);
        let tenant = sample_company("Oficina", 120, 0, Some("2024-02-01"), CompanyStatus::Active);
        store.insert_company(sentinel.clone());
        store.insert_company(tenant.clone());

        let sessions = SessionStore::new();
        let service = TenantService::new(store.clone(), sessions.clone(), sentinel.id);
        Fixture { store, sessions, service, sentinel, tenant }
    }

    #[tokio::test]
    async fn sentinel_is_hidden_and_protected() -> Result<(), AppError> {
        let f = fixture();

        let listed = f.service.list_companies().await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, f.tenant.id);

        let blocked = f.service.set_status(f.sentinel.id, CompanyStatus::Blocked).await;
        assert!(matches!(blocked, Err(AppError::SentinelCompany)));
        let purged = f.service.purge(f.sentinel.id).await;
        assert!(matches!(purged, Err(AppError::SentinelCompany)));
        Ok(())
    }

    #[tokio::test]
    async fn blocking_ends_the_company_sessions() -> Result<(), AppError> {
        let f = fixture();
        let admin = sample_user(f.tenant.id, "admin@oficina.com", "segredo1", UserRole::Admin);
        let dev = sample_user(f.sentinel.id, "dev@sistema.com", "segredo1", UserRole::Developer);
        let tenant_session = f.sessions.begin(admin);
        let dev_session = f.sessions.begin(dev);

        let company = f.service.set_status(f.tenant.id, CompanyStatus::Blocked).await?;

        assert!(company.is_blocked());
        assert!(f.sessions.get(tenant_session.id).is_none());
        assert!(f.sessions.get(dev_session.id).is_some());
        Ok(())
    }

    #[tokio::test]
    async fn purge_cascades_to_payments() -> Result<(), AppError> {
        let f = fixture();
        let payment = NewPayment {
            amount: Decimal::from(120),
            reference_month: "2024-03".into(),
            note: None,
            paid_at: None,
        };
        f.service.record_payment(f.tenant.id, &payment).await?;

        f.service.purge(f.tenant.id).await?;

        assert!(f.store.find_company(f.tenant.id).await?.is_none());
        assert!(f.store.list_payments(f.tenant.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn billing_detail_uses_the_net_fee() -> Result<(), AppError> {
        let f = fixture();
        let adjustment = BillingAdjustment {
            refunded_amount: Some(Decimal::from(200)),
            ..BillingAdjustment::default()
        };
        f.service.adjust_billing(f.tenant.id, &adjustment).await?;

        let detail = f.service.billing_detail(f.tenant.id).await?;

        assert_eq!(detail.net_fee, Decimal::ZERO);
        assert_eq!(detail.company.monthly_fee, Decimal::from(120));
        Ok(())
    }

    #[tokio::test]
    async fn expiring_lists_only_active_companies_inside_the_window() -> Result<(), AppError> {
        let f = fixture();
        let now = Utc::now();

        let mut soon = sample_company("Vence logo", 50, 0, None, CompanyStatus::Active);
        soon.expires_at = Some(now + Duration::days(2));
        let mut later = sample_company("Vence depois", 50, 0, None, CompanyStatus::Active);
        later.expires_at = Some(now + Duration::days(30));
        let mut blocked = sample_company("Bloqueada", 50, 0, None, CompanyStatus::Blocked);
        blocked.expires_at = Some(now + Duration::days(1));
        let mut past = sample_company("Vencida", 50, 0, None, CompanyStatus::Active);
        past.expires_at = Some(now - Duration::days(1));
        for company in [&soon, &later, &blocked, &past] {
            f.store.insert_company(company.clone());
        }

        let expiring = f.service.expiring(7).await?;

        let names: Vec<&str> = expiring.iter().map(|c| c.trade_name.as_str()).collect();
        assert_eq!(names, vec!["Vence logo"]);
        Ok(())
    }

    #[tokio::test]
    async fn oversized_or_negative_windows_are_bounded() -> Result<(), AppError> {
        let f = fixture();
        let mut far = sample_company("Contrato longo", 50, 0, None, CompanyStatus::Active);
        far.expires_at = Some(Utc::now() + Duration::days(400));
        f.store.insert_company(far);

        let wide = f.service.expiring(i64::MAX).await?;
        assert_eq!(wide.len(), 1);
        assert_eq!(wide[0].trade_name, "Contrato longo");

        assert!(f.service.expiring(i64::MIN).await?.is_empty());
        Ok(())
    }
}

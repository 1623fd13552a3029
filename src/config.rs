// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use crate::{
    common::i18n::I18nStore,
    db::{PgStore, RecordStore},
    services::{
        auth::AuthService,
        billing::BillingService,
        crm_service::CrmService,
        notification_service::NotificationService,
        operation_service::OperationsService,
        session::SessionStore,
        support_desk::SupportIdentity,
        support_service::{SupportService, REAP_EVERY},
        team_service::TeamService,
        tenancy_service::TenantService,
    },
};

// Teto para prazos em dias (datas do chrono não aceitam valores arbitrários)
const MAX_DAYS: i64 = 3650;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    // Empresa reservada ao operador da plataforma
    pub sentinel_company_id: Uuid,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub support_poll: Duration,
    pub support_identity: SupportIdentity,
    pub trial_days: i64,
    pub session_days: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let required = |key: &str| get(key).with_context(|| format!("{key} deve ser definida"));
        let uuid_or_nil = |key: &str| -> anyhow::Result<Uuid> {
            match get(key) {
                Some(raw) => Uuid::parse_str(raw.trim()).with_context(|| format!("{key} não é um UUID")),
                None => Ok(Uuid::nil()),
            }
        };
        let number_or = |key: &str, default: i64| -> anyhow::Result<i64> {
            match get(key) {
                Some(raw) => raw.trim().parse().with_context(|| format!("{key} não é um número")),
                None => Ok(default),
            }
        };

        let sentinel_raw = required("SENTINEL_COMPANY_ID")?;
        let sentinel_company_id = Uuid::parse_str(sentinel_raw.trim())
            .context("SENTINEL_COMPANY_ID não é um UUID")?;

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            sentinel_company_id,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            db_max_connections: u32::try_from(number_or("DB_MAX_CONNECTIONS", 5)?)
                .context("DB_MAX_CONNECTIONS fora do intervalo")?,
            support_poll: Duration::from_secs(
                u64::try_from(number_or("SUPPORT_POLL_SECONDS", 5)?.max(1)).unwrap_or(5),
            ),
            support_identity: SupportIdentity {
                sender_id: uuid_or_nil("SUPPORT_SENDER_ID")?,
                sender_name: get("SUPPORT_SENDER_NAME").unwrap_or_else(|| "Suporte".to_string()),
                admin_id: uuid_or_nil("SUPPORT_ADMIN_ID")?,
            },
            trial_days: number_or("TRIAL_DAYS", 7)?.clamp(0, MAX_DAYS),
            session_days: number_or("SESSION_DAYS", 7)?.clamp(1, MAX_DAYS),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: SessionStore,
    pub i18n_store: I18nStore,
    pub auth_service: AuthService,
    pub billing_service: BillingService,
    pub tenant_service: TenantService,
    pub crm_service: CrmService,
    pub operations_service: OperationsService,
    pub team_service: TeamService,
    pub support_service: SupportService,
    pub notification_service: NotificationService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = Config::from_env()?;

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;
        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        sqlx::migrate!().run(&db_pool).await?;
        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

        let state = Self::from_parts(config, Arc::new(PgStore::new(db_pool)))?;

        // Sessões vencidas e mesas abandonadas não podem deixar pollers para trás
        tokio::spawn(
            state
                .support_service
                .clone()
                .run_reaper(state.sessions.clone(), REAP_EVERY),
        );

        Ok(state)
    }

    /// Monta o gráfico de dependências sobre qualquer armazenamento.
    pub fn from_parts(config: Config, store: Arc<dyn RecordStore>) -> anyhow::Result<Self> {
        let i18n_store = I18nStore::load()?;
        let session_days = u64::try_from(config.session_days.clamp(1, MAX_DAYS)).unwrap_or(7);
        let sessions = SessionStore::with_ttl(Duration::from_secs(session_days * 24 * 60 * 60));

        let auth_service = AuthService::new(
            store.clone(),
            sessions.clone(),
            config.jwt_secret.clone(),
            config.session_days,
            config.trial_days,
        );
        let billing_service = BillingService::new(store.clone(), config.sentinel_company_id);
        let tenant_service =
            TenantService::new(store.clone(), sessions.clone(), config.sentinel_company_id);
        let crm_service = CrmService::new(store.clone());
        let operations_service = OperationsService::new(store.clone());
        let team_service = TeamService::new(store.clone(), auth_service.clone());
        let support_service = SupportService::new(
            store.clone(),
            config.support_identity.clone(),
            config.support_poll,
        );
        let notification_service = NotificationService::new(store);

        Ok(Self {
            config: Arc::new(config),
            sessions,
            i18n_store,
            auth_service,
            billing_service,
            tenant_service,
            crm_service,
            operations_service,
            team_service,
            support_service,
            notification_service,
        })
    }
}

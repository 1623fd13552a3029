// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    db::RecordStore,
    models::{
        auth::{AuthResponse, Claims, NewUser, SignUpPayload, User, UserRole},
        tenancy::{BillingCycle, NewCompany, PlanTier},
    },
    services::session::{Session, SessionStore},
};

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn RecordStore>,
    sessions: SessionStore,
    jwt_secret: String,
    session_days: i64,
    trial_days: i64,
    hash_cost: u32,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        sessions: SessionStore,
        jwt_secret: String,
        session_days: i64,
        trial_days: i64,
    ) -> Self {
        Self {
            store,
            sessions,
            jwt_secret,
            session_days,
            trial_days,
            hash_cost: bcrypt::DEFAULT_COST,
        }
    }

    #[cfg(test)]
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    /// Hash em thread separada (bcrypt é CPU-bound)
    pub async fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let password_clone = password.to_owned();
        let cost = self.hash_cost;
        let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
        Ok(hashed)
    }

    /// Cadastro self-service: empresa em período de teste + administrador.
    pub async fn sign_up(&self, payload: &SignUpPayload) -> Result<AuthResponse, AppError> {
        let password_hash = self.hash_password(&payload.password).await?;

        let company = NewCompany {
            trade_name: payload.company_name.trim().to_string(),
            corporate_name: None,
            document_number: payload.document_number.clone(),
            plan: PlanTier::Teste,
            billing_cycle: BillingCycle::Monthly,
            monthly_fee: Decimal::ZERO,
            expires_at: Some(Utc::now() + Duration::days(self.trial_days)),
        };
        let admin = NewUser {
            name: payload.admin_name.trim().to_string(),
            email: payload.email.trim().to_lowercase(),
            password_hash,
            role: UserRole::Admin,
        };

        let (company, user) = self.store.register_company(&company, &admin).await?;
        tracing::info!("✅ Empresa '{}' cadastrada (teste até {:?}).", company.trade_name, company.expires_at);

        self.open_session(user)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let user = self
            .store
            .find_user_by_email(&email.trim().to_lowercase())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        // Empresa bloqueada não entra
        let company = self
            .store
            .find_company(user.company_id)
            .await?
            .ok_or(AppError::CompanyNotFound)?;
        if company.is_blocked() {
            return Err(AppError::CompanyBlocked);
        }

        self.open_session(user)
    }

    /// Token válido + sessão ainda aberta para o mesmo usuário.
    pub fn validate_token(&self, token: &str) -> Result<Session, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        let claims = token_data.claims;
        self.sessions
            .get(claims.sid)
            .filter(|session| session.user.id == claims.sub)
            .ok_or(AppError::InvalidToken)
    }

    pub fn logout(&self, session_id: uuid::Uuid) {
        if self.sessions.end(session_id).is_some() {
            tracing::info!("👋 Sessão {} encerrada.", session_id);
        }
    }

    fn open_session(&self, user: User) -> Result<AuthResponse, AppError> {
        let session = self.sessions.begin(user);
        let token = self.create_token(&session)?;
        Ok(AuthResponse { token, user: session.user })
    }

    fn create_token(&self, session: &Session) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + Duration::days(self.session_days);

        let claims = Claims {
            sub: session.user.id,
            sid: session.id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::{CompanyStore, UserStore};
    use crate::db::memory::{sample_company, sample_user, MemoryStore};
    use crate::models::tenancy::CompanyStatus;

    fn service(store: Arc<MemoryStore>, sessions: SessionStore) -> AuthService {
        AuthService::new(store, sessions, "segredo-de-teste".into(), 7, 7).with_hash_cost(4)
    }

    #[tokio::test]
    async fn sign_up_creates_trial_company_and_signs_in() -> Result<(), AppError> {
        let store = Arc::new(MemoryStore::new());
        let sessions = SessionStore::new();
        let auth = service(store.clone(), sessions.clone());

        let payload = SignUpPayload {
            company_name: "Oficina do Zé".into(),
            document_number: None,
            admin_name: "José".into(),
            email: "Jose@Oficina.com".into(),
            password: "segredo1".into(),
        };
        let response = auth.sign_up(&payload).await?;

        assert_eq!(response.user.email, "jose@oficina.com");
        assert_eq!(response.user.role, UserRole::Admin);
        let company = store.find_company(response.user.company_id).await?.expect("empresa criada");
        assert_eq!(company.plan, PlanTier::Teste);
        assert!(company.expires_at.is_some());

        let session = auth.validate_token(&response.token)?;
        assert_eq!(session.user.id, response.user.id);
        Ok(())
    }

    #[tokio::test]
    async fn blocked_company_cannot_sign_in() -> Result<(), AppError> {
        let store = Arc::new(MemoryStore::new());
        let company = sample_company("Bloqueada", 100, 0, Some("2024-01-10"), CompanyStatus::Blocked);
        store.insert_company(company.clone());
        store.insert_user(sample_user(company.id, "admin@bloqueada.com", "segredo1", UserRole::Admin));

        let auth = service(store, SessionStore::new());
        let result = auth.login_user("admin@bloqueada.com", "segredo1").await;

        assert!(matches!(result, Err(AppError::CompanyBlocked)));
        Ok(())
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() -> Result<(), AppError> {
        let store = Arc::new(MemoryStore::new());
        let company = sample_company("Ativa", 100, 0, None, CompanyStatus::Active);
        store.insert_company(company.clone());
        store.insert_user(sample_user(company.id, "admin@ativa.com", "segredo1", UserRole::Admin));

        let auth = service(store, SessionStore::new());
        let result = auth.login_user("admin@ativa.com", "outra-senha").await;

        assert!(matches!(result, Err(AppError::InvalidCredentials)));
        Ok(())
    }

    #[tokio::test]
    async fn token_of_an_ended_session_is_rejected() -> Result<(), AppError> {
        let store = Arc::new(MemoryStore::new());
        let company = sample_company("Ativa", 100, 0, None, CompanyStatus::Active);
        store.insert_company(company.clone());
        store.insert_user(sample_user(company.id, "tec@ativa.com", "segredo1", UserRole::Technician));

        let auth = service(store.clone(), SessionStore::new());
        let response = auth.login_user("tec@ativa.com", "segredo1").await?;
        let session = auth.validate_token(&response.token)?;

        auth.logout(session.id);

        assert!(matches!(auth.validate_token(&response.token), Err(AppError::InvalidToken)));
        assert!(store.find_user_by_id(response.user.id).await?.is_some());
        Ok(())
    }
}

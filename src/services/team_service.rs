// src/services/team_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::RecordStore,
    models::auth::{CreateTechnicianPayload, NewUser, User, UserRole},
    services::auth::AuthService,
};

// Técnicos da empresa
#[derive(Clone)]
pub struct TeamService {
    store: Arc<dyn RecordStore>,
    auth_service: AuthService,
}

impl TeamService {
    pub fn new(store: Arc<dyn RecordStore>, auth_service: AuthService) -> Self {
        Self { store, auth_service }
    }

    pub async fn list_technicians(&self, company_id: Uuid) -> Result<Vec<User>, AppError> {
        self.store.list_users(company_id, UserRole::Technician).await
    }

    /// Respeita o limite `maxTechnicians` das configurações da empresa.
    pub async fn create_technician(
        &self,
        company_id: Uuid,
        payload: &CreateTechnicianPayload,
    ) -> Result<User, AppError> {
        let company = self
            .store
            .find_company(company_id)
            .await?
            .ok_or(AppError::CompanyNotFound)?;

        if let Some(max) = company.settings.max_technicians {
            let current = self.list_technicians(company_id).await?.len();
            if current >= usize::try_from(max).unwrap_or(0) {
                return Err(AppError::TechnicianLimit);
            }
        }

        let password_hash = self.auth_service.hash_password(&payload.password).await?;
        let new_user = NewUser {
            name: payload.name.trim().to_string(),
            email: payload.email.trim().to_lowercase(),
            password_hash,
            role: UserRole::Technician,
        };

        self.store.create_user(company_id, &new_user).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::{sample_company, MemoryStore};
    use crate::models::tenancy::{CompanySettings, CompanyStatus};
    use crate::services::session::SessionStore;
    use sqlx::types::Json;

    fn team(store: Arc<MemoryStore>) -> TeamService {
        let auth = AuthService::new(store.clone(), SessionStore::new(), "segredo".into(), 7, 7).with_hash_cost(4);
        TeamService::new(store, auth)
    }

    fn payload(email: &str) -> CreateTechnicianPayload {
        CreateTechnicianPayload {
            name: "Carlos".into(),
            email: email.into(),
            password: "segredo1".into(),
        }
    }

    #[tokio::test]
    async fn limit_from_settings_is_enforced() -> Result<(), AppError> {
        let store = Arc::new(MemoryStore::new());
        let mut company = sample_company("Oficina", 100, 0, None, CompanyStatus::Active);
        company.settings = Json(CompanySettings {
            max_technicians: Some(1),
            ..CompanySettings::default()
        });
        store.insert_company(company.clone());
        let team = team(store);

        team.create_technician(company.id, &payload("um@oficina.com")).await?;
        let second = team.create_technician(company.id, &payload("dois@oficina.com")).await;

        assert!(matches!(second, Err(AppError::TechnicianLimit)));
        assert_eq!(team.list_technicians(company.id).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() -> Result<(), AppError> {
        let store = Arc::new(MemoryStore::new());
        let company = sample_company("Oficina", 100, 0, None, CompanyStatus::Active);
        store.insert_company(company.clone());
        let team = team(store);

        team.create_technician(company.id, &payload("tec@oficina.com")).await?;
        let again = team.create_technician(company.id, &payload("TEC@oficina.com")).await;

        assert!(matches!(again, Err(AppError::EmailAlreadyExists)));
        Ok(())
    }
}

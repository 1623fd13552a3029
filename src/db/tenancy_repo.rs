// src/db/tenancy_repo.rs

use async_trait::async_trait;
use sqlx::types::Json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::{CompanyStore, PgStore},
    models::{
        auth::{NewUser, User},
        finance::{NewPayment, Payment},
        tenancy::{BillingAdjustment, Company, CompanySettings, CompanyStatus, NewCompany},
    },
};

// Converte violação de e-mail único num erro amigável
fn map_user_insert_error(e: sqlx::Error) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return AppError::EmailAlreadyExists;
        }
    }
    AppError::DatabaseError(e)
}

#[async_trait]
impl CompanyStore for PgStore {
    async fn list_companies(&self) -> Result<Vec<Company>, AppError> {
        let companies = sqlx::query_as::<_, Company>(
            "SELECT * FROM companies ORDER BY created_at DESC NULLS LAST",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(companies)
    }

    async fn find_company(&self, id: Uuid) -> Result<Option<Company>, AppError> {
        let company = sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(company)
    }

    async fn create_company(&self, input: &NewCompany) -> Result<Company, AppError> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (
                trade_name, corporate_name, document_number,
                plan, billing_cycle, monthly_fee, expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&input.trade_name)
        .bind(&input.corporate_name)
        .bind(&input.document_number)
        .bind(input.plan)
        .bind(input.billing_cycle)
        .bind(input.monthly_fee)
        .bind(input.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(company)
    }

    async fn register_company(
        &self,
        company: &NewCompany,
        admin: &NewUser,
    ) -> Result<(Company, User), AppError> {
        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        let new_company = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (
                trade_name, corporate_name, document_number,
                plan, billing_cycle, monthly_fee, expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&company.trade_name)
        .bind(&company.corporate_name)
        .bind(&company.document_number)
        .bind(company.plan)
        .bind(company.billing_cycle)
        .bind(company.monthly_fee)
        .bind(company.expires_at)
        .fetch_one(&mut *tx)
        .await?;

        // Se o e-mail já existir, o drop do tx desfaz a empresa criada acima
        let new_user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (company_id, name, email, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(new_company.id)
        .bind(&admin.name)
        .bind(&admin.email)
        .bind(&admin.password_hash)
        .bind(admin.role)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_user_insert_error)?;

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        Ok((new_company, new_user))
    }

    async fn set_company_status(&self, id: Uuid, status: CompanyStatus) -> Result<Company, AppError> {
        sqlx::query_as::<_, Company>("UPDATE companies SET status = $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::CompanyNotFound)
    }

    async fn adjust_billing(&self, id: Uuid, adjustment: &BillingAdjustment) -> Result<Company, AppError> {
        // COALESCE: campo ausente mantém o valor atual
        sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies SET
                plan = COALESCE($2, plan),
                billing_cycle = COALESCE($3, billing_cycle),
                monthly_fee = COALESCE($4, monthly_fee),
                refunded_amount = COALESCE($5, refunded_amount),
                expires_at = COALESCE($6, expires_at)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(adjustment.plan)
        .bind(adjustment.billing_cycle)
        .bind(adjustment.monthly_fee)
        .bind(adjustment.refunded_amount)
        .bind(adjustment.expires_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::CompanyNotFound)
    }

    async fn update_settings(&self, id: Uuid, settings: &CompanySettings) -> Result<Company, AppError> {
        sqlx::query_as::<_, Company>("UPDATE companies SET settings = $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(Json(settings))
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::CompanyNotFound)
    }

    async fn purge_company(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::CompanyNotFound);
        }
        Ok(())
    }

    async fn record_payment(&self, company_id: Uuid, payment: &NewPayment) -> Result<Payment, AppError> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (company_id, amount, reference_month, note, paid_at)
            VALUES ($1, $2, $3, $4, COALESCE($5, NOW()))
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(payment.amount)
        .bind(&payment.reference_month)
        .bind(&payment.note)
        .bind(payment.paid_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_foreign_key_violation() {
                    return AppError::CompanyNotFound;
                }
            }
            AppError::DatabaseError(e)
        })?;

        Ok(payment)
    }

    async fn list_payments(&self, company_id: Uuid) -> Result<Vec<Payment>, AppError> {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE company_id = $1 ORDER BY paid_at DESC",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }
}

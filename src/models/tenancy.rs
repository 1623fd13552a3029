// src/models/tenancy.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Valores monetários não podem ser negativos.
pub fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "plan_tier", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PlanTier {
    Teste,
    Livre,
    Anual,
    Ouro,
    Prata,
    Diamante,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "billing_cycle", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingCycle {
    Monthly,
    Quarterly,
    Semiannual,
    Annual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "company_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompanyStatus {
    Active,
    Blocked,
}

// ---
// Feature flags da empresa (coluna JSONB `settings`)
// ---
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanySettings {
    #[schema(example = true)]
    pub ai_reports: bool,
    #[schema(example = false)]
    pub customer_portal: bool,
    #[schema(example = false)]
    pub whatsapp_notifications: bool,
    // None = sem limite
    #[schema(example = 5)]
    pub max_technicians: Option<i32>,
}

// ---
// Company (O "Tenant")
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,
    #[schema(example = "Oficina do Zé")]
    pub trade_name: String,
    #[schema(example = "José Silva Manutenções LTDA")]
    pub corporate_name: Option<String>,
    #[schema(example = "12.345.678/0001-99")]
    pub document_number: Option<String>,

    pub plan: PlanTier,
    pub billing_cycle: BillingCycle,

    #[schema(example = "99.90")]
    pub monthly_fee: Decimal,
    #[schema(example = "0.00")]
    pub refunded_amount: Option<Decimal>,

    pub status: CompanyStatus,

    #[schema(value_type = CompanySettings)]
    pub settings: Json<CompanySettings>,

    // Registros antigos podem não ter data de criação
    pub created_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Company {
    /// Mensalidade líquida (mensalidade - estorno), nunca negativa.
    pub fn net_fee(&self) -> Decimal {
        let refunded = self.refunded_amount.unwrap_or(Decimal::ZERO);
        (self.monthly_fee - refunded).max(Decimal::ZERO)
    }

    pub fn is_blocked(&self) -> bool {
        self.status == CompanyStatus::Blocked
    }
}

// Inserção feita pelo painel do desenvolvedor (ou pelo cadastro self-service)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewCompany {
    #[validate(length(min = 2, message = "O nome fantasia deve ter no mínimo 2 caracteres."))]
    #[schema(example = "Oficina do Zé")]
    pub trade_name: String,
    pub corporate_name: Option<String>,
    pub document_number: Option<String>,
    pub plan: PlanTier,
    pub billing_cycle: BillingCycle,
    #[validate(custom(function = "non_negative"))]
    #[schema(example = "99.90")]
    pub monthly_fee: Decimal,
    pub expires_at: Option<DateTime<Utc>>,
}

// Ajuste de cobrança: só os campos enviados são alterados
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BillingAdjustment {
    pub plan: Option<PlanTier>,
    pub billing_cycle: Option<BillingCycle>,
    #[validate(custom(function = "non_negative"))]
    #[schema(example = "149.90")]
    pub monthly_fee: Option<Decimal>,
    #[validate(custom(function = "non_negative"))]
    #[schema(example = "50.00")]
    pub refunded_amount: Option<Decimal>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusPayload {
    pub status: CompanyStatus,
}

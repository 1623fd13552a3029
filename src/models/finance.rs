// src/models/finance.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::tenancy::{non_negative, Company};

// Pagamento de mensalidade recebido de uma empresa
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub company_id: Uuid,
    #[schema(example = "99.90")]
    pub amount: Decimal,
    #[schema(example = "2024-03")]
    pub reference_month: String,
    pub note: Option<String>,
    pub paid_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    #[validate(custom(function = "non_negative"))]
    #[schema(example = "99.90")]
    pub amount: Decimal,
    // YYYY-MM
    #[validate(length(equal = 7, message = "Use o formato AAAA-MM."))]
    #[schema(example = "2024-03")]
    pub reference_month: String,
    pub note: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyBillingDetail {
    pub company: Company,
    #[schema(example = "99.90")]
    pub net_fee: Decimal,
    pub payments: Vec<Payment>,
}

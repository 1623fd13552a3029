// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

// Resumo de cobrança do painel do desenvolvedor (cards + gráfico mensal)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BillingSummary {
    #[schema(example = "2024")]
    pub year: String,

    pub total: usize,
    pub active: usize,
    pub blocked: usize,

    // Soma das mensalidades líquidas
    #[schema(value_type = f64, example = 250.0)]
    pub mrr: Decimal,

    // 12 posições, 0 = janeiro
    #[schema(value_type = Vec<f64>)]
    pub monthly_series: [Decimal; 12],

    // Denominador do gráfico: max(maior mês, 100)
    #[schema(value_type = f64, example = 250.0)]
    pub chart_ceiling: Decimal,

    // Mais recente primeiro; sempre inclui o ano corrente
    pub available_years: Vec<i32>,
}

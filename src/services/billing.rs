// src/services/billing.rs

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::RecordStore,
    models::{dashboard::BillingSummary, tenancy::Company},
};

/// Piso do eixo do gráfico: série zerada ainda desenha algo.
pub const CHART_FLOOR: Decimal = Decimal::ONE_HUNDRED;

/// Agrega as empresas (exceto a sentinela) em contadores, MRR e série mensal
/// do ano pedido. `year` que não é um ano gera série zerada.
pub fn summarize(
    companies: &[Company],
    year: &str,
    sentinel_id: Uuid,
    current_year: i32,
) -> BillingSummary {
    let target_year = year.trim().parse::<i32>().ok();

    let mut total = 0;
    let mut active = 0;
    let mut blocked = 0;
    let mut mrr = Decimal::ZERO;
    let mut monthly_series = [Decimal::ZERO; 12];
    let mut years = BTreeSet::from([current_year]);

    for company in companies.iter().filter(|c| c.id != sentinel_id) {
        let net = company.net_fee();

        total += 1;
        if company.is_blocked() {
            blocked += 1;
        } else {
            active += 1;
        }
        mrr += net;

        // Sem data de criação: fica fora do gráfico, mas conta no resto
        let Some(created_at) = company.created_at else {
            continue;
        };
        years.insert(created_at.year());

        if Some(created_at.year()) == target_year {
            monthly_series[created_at.month0() as usize] += net;
        }
    }

    let largest = monthly_series.iter().copied().max().unwrap_or(Decimal::ZERO);

    BillingSummary {
        year: year.trim().to_string(),
        total,
        active,
        blocked,
        mrr,
        monthly_series,
        chart_ceiling: largest.max(CHART_FLOOR),
        available_years: years.into_iter().rev().collect(),
    }
}

#[derive(Clone)]
pub struct BillingService {
    store: Arc<dyn RecordStore>,
    sentinel_id: Uuid,
}

impl BillingService {
    pub fn new(store: Arc<dyn RecordStore>, sentinel_id: Uuid) -> Self {
        Self { store, sentinel_id }
    }

    pub async fn summary(&self, year: Option<&str>) -> Result<BillingSummary, AppError> {
        let current_year = Utc::now().year();
        let year = year
            .map(str::to_string)
            .unwrap_or_else(|| current_year.to_string());

        let companies = self.store.list_companies().await?;
        Ok(summarize(&companies, &year, self.sentinel_id, current_year))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::sample_company;
    use crate::models::tenancy::CompanyStatus;

    fn dec(value: i64) -> Decimal {
        Decimal::from(value)
    }

    #[test]
    fn two_companies_in_march() {
        let sentinel = sample_company("Sistema", 999, 0, Some("2023-01-01"), CompanyStatus::Active);
        let companies = vec![
            sentinel.clone(),
            sample_company("A", 100, 0, Some("2024-03-01"), CompanyStatus::Active),
            sample_company("B", 200, 50, Some("2024-03-15"), CompanyStatus::Blocked),
        ];

        let summary = summarize(&companies, "2024", sentinel.id, 2024);

        assert_eq!(summary.total, 2);
        assert_eq!(summary.active, 1);
        assert_eq!(summary.blocked, 1);
        assert_eq!(summary.mrr, dec(250));
        assert_eq!(summary.monthly_series[2], dec(250));
        for (month, value) in summary.monthly_series.iter().enumerate() {
            if month != 2 {
                assert_eq!(*value, Decimal::ZERO, "mês {month}");
            }
        }
        assert_eq!(summary.chart_ceiling, dec(250));
    }

    #[test]
    fn refund_larger_than_fee_contributes_zero() {
        let companies = vec![
            sample_company("Estornada", 100, 300, Some("2024-05-02"), CompanyStatus::Active),
            sample_company("Normal", 80, 0, Some("2024-05-03"), CompanyStatus::Active),
        ];

        let summary = summarize(&companies, "2024", Uuid::nil(), 2024);

        assert_eq!(summary.mrr, dec(80));
        assert_eq!(summary.monthly_series[4], dec(80));
    }

    #[test]
    fn sentinel_is_never_counted() {
        let sentinel = sample_company("Sistema", 500, 0, Some("2024-01-01"), CompanyStatus::Blocked);
        let summary = summarize(&[sentinel.clone()], "2024", sentinel.id, 2024);

        assert_eq!(summary.total, 0);
        assert_eq!(summary.active + summary.blocked, 0);
        assert_eq!(summary.mrr, Decimal::ZERO);
        assert_eq!(summary.available_years, vec![2024]);
    }

    #[test]
    fn series_only_sums_the_selected_year() {
        let companies = vec![
            sample_company("2023", 70, 0, Some("2023-11-20"), CompanyStatus::Active),
            sample_company("2024a", 100, 10, Some("2024-01-05"), CompanyStatus::Active),
            sample_company("2024b", 40, 0, Some("2024-12-31"), CompanyStatus::Blocked),
            sample_company("sem data", 55, 0, None, CompanyStatus::Active),
        ];

        let summary = summarize(&companies, "2024", Uuid::nil(), 2025);
        let series_total: Decimal = summary.monthly_series.iter().copied().sum();

        assert_eq!(summary.monthly_series.len(), 12);
        assert_eq!(series_total, dec(130));
        assert_eq!(summary.monthly_series[0], dec(90));
        assert_eq!(summary.monthly_series[11], dec(40));
        // A empresa sem data entra nos contadores e no MRR
        assert_eq!(summary.total, 4);
        assert_eq!(summary.active + summary.blocked, summary.total);
        assert_eq!(summary.mrr, dec(255));
    }

    #[test]
    fn available_years_include_current_and_are_descending() {
        let companies = vec![
            sample_company("a", 10, 0, Some("2022-06-01"), CompanyStatus::Active),
            sample_company("b", 10, 0, Some("2024-02-01"), CompanyStatus::Active),
            sample_company("c", 10, 0, Some("2022-09-01"), CompanyStatus::Active),
        ];

        let summary = summarize(&companies, "2022", Uuid::nil(), 2026);

        assert_eq!(summary.available_years, vec![2026, 2024, 2022]);
    }

    #[test]
    fn empty_or_unparseable_year_keeps_the_chart_floor() {
        let companies = vec![sample_company("a", 10, 0, Some("2024-06-01"), CompanyStatus::Active)];

        let empty = summarize(&[], "2024", Uuid::nil(), 2024);
        let garbage = summarize(&companies, "20x4", Uuid::nil(), 2024);

        assert_eq!(empty.chart_ceiling, CHART_FLOOR);
        assert!(garbage.monthly_series.iter().all(|v| v.is_zero()));
        assert_eq!(garbage.chart_ceiling, CHART_FLOOR);
        assert_eq!(garbage.mrr, dec(10));
    }
}

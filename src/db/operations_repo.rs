// src/db/operations_repo.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::{db_utils::begin_scoped, error::AppError},
    db::store::{OrderStore, PgStore},
    models::operations::{OrderDraft, ServiceOrder},
};

#[async_trait]
impl OrderStore for PgStore {
    async fn list_orders(&self, company_id: Uuid) -> Result<Vec<ServiceOrder>, AppError> {
        let mut tx = begin_scoped(&self.pool, company_id).await?;

        let orders = sqlx::query_as::<_, ServiceOrder>(
            "SELECT * FROM service_orders WHERE company_id = $1 ORDER BY number DESC",
        )
        .bind(company_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(orders)
    }

    async fn find_order(&self, company_id: Uuid, id: Uuid) -> Result<Option<ServiceOrder>, AppError> {
        let mut tx = begin_scoped(&self.pool, company_id).await?;

        let order = sqlx::query_as::<_, ServiceOrder>(
            "SELECT * FROM service_orders WHERE company_id = $1 AND id = $2",
        )
        .bind(company_id)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(order)
    }

    async fn insert_order(&self, company_id: Uuid, draft: &OrderDraft) -> Result<ServiceOrder, AppError> {
        let mut tx = begin_scoped(&self.pool, company_id).await?;

        // Numeração sequencial por empresa (UNIQUE company_id, number protege contra corrida)
        let order = sqlx::query_as::<_, ServiceOrder>(
            r#"
            INSERT INTO service_orders (
                company_id, number,
                customer_id, customer_name,
                technician_id, technician_name,
                description, equipment, scheduled_for, price
            )
            VALUES (
                $1,
                (SELECT COALESCE(MAX(number), 0) + 1 FROM service_orders WHERE company_id = $1),
                $2, $3, $4, $5, $6, $7, $8, $9
            )
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(draft.customer_id)
        .bind(&draft.customer_name)
        .bind(draft.technician_id)
        .bind(&draft.technician_name)
        .bind(&draft.description)
        .bind(&draft.equipment)
        .bind(draft.scheduled_for)
        .bind(draft.price)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(order)
    }

    async fn save_order(&self, order: &ServiceOrder) -> Result<ServiceOrder, AppError> {
        let mut tx = begin_scoped(&self.pool, order.company_id).await?;

        let saved = sqlx::query_as::<_, ServiceOrder>(
            r#"
            UPDATE service_orders SET
                technician_id = $3, technician_name = $4,
                description = $5, equipment = $6,
                status = $7, scheduled_for = $8, finished_at = $9,
                price = $10, report = $11,
                updated_at = NOW()
            WHERE company_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(order.company_id)
        .bind(order.id)
        .bind(order.technician_id)
        .bind(&order.technician_name)
        .bind(&order.description)
        .bind(&order.equipment)
        .bind(order.status)
        .bind(order.scheduled_for)
        .bind(order.finished_at)
        .bind(order.price)
        .bind(&order.report)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::OrderNotFound)?;

        tx.commit().await?;
        Ok(saved)
    }

    async fn delete_order(&self, company_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let mut tx = begin_scoped(&self.pool, company_id).await?;

        let result = sqlx::query("DELETE FROM service_orders WHERE company_id = $1 AND id = $2")
            .bind(company_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::OrderNotFound);
        }

        tx.commit().await?;
        Ok(())
    }
}

// src/db/crm_repo.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::{db_utils::begin_scoped, error::AppError},
    db::store::{CustomerStore, PgStore},
    models::crm::{Customer, CustomerInput},
};

#[async_trait]
impl CustomerStore for PgStore {
    async fn list_customers(&self, company_id: Uuid) -> Result<Vec<Customer>, AppError> {
        let mut tx = begin_scoped(&self.pool, company_id).await?;

        let customers = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers WHERE company_id = $1 ORDER BY full_name ASC",
        )
        .bind(company_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(customers)
    }

    async fn find_customer(&self, company_id: Uuid, id: Uuid) -> Result<Option<Customer>, AppError> {
        let mut tx = begin_scoped(&self.pool, company_id).await?;

        let customer = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers WHERE company_id = $1 AND id = $2",
        )
        .bind(company_id)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(customer)
    }

    async fn create_customer(&self, company_id: Uuid, input: &CustomerInput) -> Result<Customer, AppError> {
        let mut tx = begin_scoped(&self.pool, company_id).await?;

        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (
                company_id, full_name, document_number, email, phone,
                street, number, district, city, state, zip_code, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(&input.full_name)
        .bind(&input.document_number)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.street)
        .bind(&input.number)
        .bind(&input.district)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.zip_code)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(customer)
    }

    async fn update_customer(
        &self,
        company_id: Uuid,
        id: Uuid,
        input: &CustomerInput,
    ) -> Result<Customer, AppError> {
        // Cliente e ordens mudam juntos: ou tudo, ou nada
        let mut tx = begin_scoped(&self.pool, company_id).await?;

        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers SET
                full_name = $3, document_number = $4, email = $5, phone = $6,
                street = $7, number = $8, district = $9, city = $10,
                state = $11, zip_code = $12, notes = $13,
                updated_at = NOW()
            WHERE company_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(id)
        .bind(&input.full_name)
        .bind(&input.document_number)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.street)
        .bind(&input.number)
        .bind(&input.district)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.zip_code)
        .bind(&input.notes)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::CustomerNotFound)?;

        // Propaga o nome desnormalizado para as ordens de serviço
        let propagated = sqlx::query(
            r#"
            UPDATE service_orders
            SET customer_name = $3, updated_at = NOW()
            WHERE company_id = $1 AND customer_id = $2 AND customer_name <> $3
            "#,
        )
        .bind(company_id)
        .bind(id)
        .bind(&customer.full_name)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;

        if propagated > 0 {
            tracing::info!("🔗 Nome do cliente {} propagado para {} ordens.", id, propagated);
        }

        Ok(customer)
    }

    async fn delete_customer(&self, company_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let mut tx = begin_scoped(&self.pool, company_id).await?;

        let result = sqlx::query("DELETE FROM customers WHERE company_id = $1 AND id = $2")
            .bind(company_id)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                // Ordens ainda apontam para o cliente
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_foreign_key_violation() {
                        return AppError::CustomerHasOrders;
                    }
                }
                AppError::DatabaseError(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::CustomerNotFound);
        }

        tx.commit().await?;
        Ok(())
    }
}

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::common::error::AppError;

// ---
// Helper RLS: A "Chave" para o Banco de Dados
// ---
/// Abre uma transação com `app.company_id` definido; as policies RLS
/// restringem todas as linhas à empresa informada.
pub(crate) async fn begin_scoped(
    pool: &PgPool,
    company_id: Uuid,
) -> Result<Transaction<'static, Postgres>, AppError> {
    // O operador '?' converte automaticamente sqlx::Error -> AppError::DatabaseError
    let mut tx = pool.begin().await?;

    // `true` = vale só para esta transação
    sqlx::query("SELECT set_config('app.company_id', $1, true)")
        .bind(company_id.to_string())
        .execute(&mut *tx)
        .await?;

    Ok(tx)
}

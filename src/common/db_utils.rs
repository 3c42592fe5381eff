use sqlx::{Postgres, Transaction};

use crate::common::error::AppError;
use crate::config::AppState;
use crate::middleware::auth::AuthenticatedOwner;

// ---
// Helper RLS: A "Chave" para o Banco de Dados
// ---
/// Abre uma transação e define `app.owner_id` (local à transação), usado pelas políticas RLS.
pub(crate) async fn begin_rls_transaction(
    app_state: &AppState,
    owner: &AuthenticatedOwner,
) -> Result<Transaction<'static, Postgres>, AppError> {
    // O operador '?' converte automaticamente sqlx::Error -> AppError::DatabaseError
    let mut tx = app_state.db_pool.begin().await?;

    sqlx::query("SELECT set_config('app.owner_id', $1, true)")
        .bind(owner.0.to_string())
        .execute(&mut *tx)
        .await?;

    Ok(tx)
}

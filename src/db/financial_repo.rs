// src/db/financial_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::financial::{DelinquencyRow, MovementFilter, MovementRow},
};

/// Leituras do relatório financeiro. As tabelas pertencem ao CRUD; aqui só se consulta.
#[derive(Clone, Default)]
pub struct FinancialRepository;

impl FinancialRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  TRANSAÇÕES
    // =========================================================================

    pub async fn fetch_movements<'e, E>(
        &self,
        executor: E,
        filter: &MovementFilter,
    ) -> Result<Vec<MovementRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT id, amount, direction, status, created_at, delinquency_id, grams
            FROM transactions
            WHERE owner_id = $1
              AND created_at >= $2
              AND created_at < $3
              AND ($4::transaction_status IS NULL OR status = $4)
            ORDER BY created_at ASC
            "#,
        )
            .bind(filter.owner_id)
            .bind(filter.created_from)
            .bind(filter.created_until)
            .bind(filter.status)
            .fetch_all(executor)
            .await?;

        Ok(rows)
    }

    pub async fn count_movements<'e, E>(
        &self,
        executor: E,
        filter: &MovementFilter,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM transactions
            WHERE owner_id = $1
              AND created_at >= $2
              AND created_at < $3
              AND ($4::transaction_status IS NULL OR status = $4)
            "#,
        )
            .bind(filter.owner_id)
            .bind(filter.created_from)
            .bind(filter.created_until)
            .bind(filter.status)
            .fetch_one(executor)
            .await?;

        Ok(count)
    }

    // =========================================================================
    //  INADIMPLÊNCIAS
    // =========================================================================

    // Todas, não só as do período: o saldo devedor atual não depende do filtro de datas.
    pub async fn fetch_delinquencies<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
    ) -> Result<Vec<DelinquencyRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, DelinquencyRow>(
            r#"
            SELECT id, customer_id, amount, amount_paid, payed, created_at
            FROM delinquencies
            WHERE owner_id = $1
            ORDER BY created_at ASC
            "#,
        )
            .bind(owner_id)
            .fetch_all(executor)
            .await?;

        Ok(rows)
    }

    // =========================================================================
    //  CLIENTES
    // =========================================================================

    pub async fn count_active_customers<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM customers WHERE owner_id = $1 AND active = true",
        )
            .bind(owner_id)
            .fetch_one(executor)
            .await?;

        Ok(count)
    }
}

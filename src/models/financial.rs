// src/models/financial.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use thiserror::Error;
use validator::Validate;

// --- Erros de validação dos dados do relatório ---

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregationError {
    #[error("Período inválido: data final {end} anterior à inicial {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Registro inválido: {kind} {id} sem o campo '{field}'")]
    InvalidRecord {
        kind: &'static str,
        id: Uuid,
        field: &'static str,
    },
}

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "transaction_direction", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    In,  // Entrada
    Out, // Saída
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "transaction_status")]
pub enum MovementStatus {
    #[sqlx(rename = "PENDING")]
    #[serde(rename = "PENDING")]
    Pending,
    #[sqlx(rename = "CANCELED")]
    #[serde(rename = "CANCELED")]
    Canceled,
    // O banco grava "PAYED" (sic)
    #[sqlx(rename = "PAYED")]
    #[serde(rename = "PAYED")]
    Paid,
}

// --- Linhas cruas do banco ---
// As colunas podem vir nulas; a conversão para o registro de domínio valida.

#[derive(Debug, Clone, FromRow)]
pub struct MovementRow {
    pub id: Uuid,
    pub amount: Option<Decimal>,
    pub direction: Option<Direction>,
    pub status: Option<MovementStatus>,
    pub created_at: Option<DateTime<Utc>>,
    pub delinquency_id: Option<Uuid>,
    pub grams: Option<Decimal>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DelinquencyRow {
    pub id: Uuid,
    pub customer_id: Option<Uuid>,
    pub amount: Option<Decimal>,
    pub amount_paid: Option<Decimal>,
    pub payed: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
}

// --- Registros validados (entrada do agregador) ---

/// Fluxo de dinheiro numa direção, opcionalmente vinculado a uma inadimplência.
#[derive(Debug, Clone, PartialEq)]
pub struct Movement {
    pub id: Uuid,
    pub amount: Decimal,
    pub direction: Direction,
    pub status: MovementStatus,
    pub created_at: DateTime<Utc>,
    pub delinquency_id: Option<Uuid>,
    pub grams: Option<Decimal>,
}

/// Valor devido por um cliente.
#[derive(Debug, Clone, PartialEq)]
pub struct Delinquency {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub amount: Decimal,
    pub amount_paid: Decimal,
    pub paid: bool,
    pub created_at: DateTime<Utc>,
}

impl Movement {
    pub fn is_paid(&self) -> bool {
        self.status == MovementStatus::Paid
    }

    /// Pagamento destinado a quitar uma inadimplência (não conta como entrada comum).
    pub fn is_delinquency_payment(&self) -> bool {
        self.is_paid() && self.delinquency_id.is_some()
    }
}

impl Delinquency {
    /// Quanto ainda falta pagar (pode ser negativo se houve pagamento a maior).
    pub fn outstanding(&self) -> Decimal {
        self.amount - self.amount_paid
    }
}

fn required<T>(value: Option<T>, kind: &'static str, id: Uuid, field: &'static str) -> Result<T, AggregationError> {
    value.ok_or(AggregationError::InvalidRecord { kind, id, field })
}

fn non_negative(value: Decimal, kind: &'static str, id: Uuid, field: &'static str) -> Result<Decimal, AggregationError> {
    if value < Decimal::ZERO {
        return Err(AggregationError::InvalidRecord { kind, id, field });
    }
    Ok(value)
}

impl TryFrom<MovementRow> for Movement {
    type Error = AggregationError;

    fn try_from(row: MovementRow) -> Result<Self, Self::Error> {
        const KIND: &str = "transaction";
        let id = row.id;

        let amount = non_negative(required(row.amount, KIND, id, "amount")?, KIND, id, "amount")?;
        let grams = match row.grams {
            Some(g) => Some(non_negative(g, KIND, id, "grams")?),
            None => None,
        };

        Ok(Movement {
            id,
            amount,
            direction: required(row.direction, KIND, id, "direction")?,
            status: required(row.status, KIND, id, "status")?,
            created_at: required(row.created_at, KIND, id, "created_at")?,
            delinquency_id: row.delinquency_id,
            grams,
        })
    }
}

impl TryFrom<DelinquencyRow> for Delinquency {
    type Error = AggregationError;

    fn try_from(row: DelinquencyRow) -> Result<Self, Self::Error> {
        const KIND: &str = "delinquency";
        let id = row.id;

        let amount = non_negative(required(row.amount, KIND, id, "amount")?, KIND, id, "amount")?;
        let amount_paid = non_negative(required(row.amount_paid, KIND, id, "amount_paid")?, KIND, id, "amount_paid")?;

        Ok(Delinquency {
            id,
            customer_id: required(row.customer_id, KIND, id, "customer_id")?,
            amount,
            amount_paid,
            // Sem flag gravada o registro é tratado como em aberto
            paid: row.payed.unwrap_or(false),
            created_at: required(row.created_at, KIND, id, "created_at")?,
        })
    }
}

// --- Filtros tipados ---

/// Filtro das consultas de transações. Substitui o dicionário livre de filtros.
#[derive(Debug, Clone)]
pub struct MovementFilter {
    pub owner_id: Uuid,
    pub created_from: DateTime<Utc>,
    pub created_until: DateTime<Utc>, // exclusivo
    pub status: Option<MovementStatus>,
}

impl MovementFilter {
    pub fn with_status(&self, status: MovementStatus) -> Self {
        Self { status: Some(status), ..self.clone() }
    }
}

// --- Relatório ---

/// Totais de um dia do período.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyBucket {
    #[schema(value_type = String, format = Date, example = "2024-01-10")]
    pub date: NaiveDate,
    #[schema(example = "100.00")]
    pub inflow: Decimal,
    pub outflow: Decimal,
    pub delinquency_created: Decimal,
    pub delinquency_paid: Decimal,
}

impl DailyBucket {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            inflow: Decimal::ZERO,
            outflow: Decimal::ZERO,
            delinquency_created: Decimal::ZERO,
            delinquency_paid: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PeriodReport {
    pub daily_buckets: Vec<DailyBucket>,
    pub period_inflow: Decimal,
    pub period_outflow: Decimal,
    pub period_delinquency_created: Decimal,
    pub period_delinquency_paid: Decimal,
    // Posição de caixa do período (entradas - saídas)
    pub net_cash_flow: Decimal,
    pub total_weight_in_period: Decimal,
    pub current_delinquency_balance: Decimal,
    pub delinquent_customer_count: usize,
}

/// Resposta do `GET /api/financial`: o relatório do período mais os contadores simples.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialReport {
    #[schema(value_type = String, format = Date, example = "2024-01-01")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2024-01-15")]
    pub end_date: NaiveDate,
    #[serde(flatten)]
    pub period: PeriodReport,
    pub total_transactions: i64,
    pub pending_transactions: i64,
    pub paid_transactions: i64,
    pub active_customers: i64,
}

// --- Query string ---

#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FinancialQuery {
    /// Início do período (yyyy-MM-dd)
    #[validate(length(equal = 10, message = "invalid_date"))]
    #[param(example = "2024-01-01")]
    pub start_date: Option<String>,

    /// Fim do período (yyyy-MM-dd)
    #[validate(length(equal = 10, message = "invalid_date"))]
    #[param(example = "2024-01-15")]
    pub end_date: Option<String>,
}

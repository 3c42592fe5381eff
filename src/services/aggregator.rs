// src/services/aggregator.rs

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::financial::{DailyBucket, Delinquency, Direction, Movement, PeriodReport};

pub use crate::models::financial::AggregationError;

/// Agrupa transações e inadimplências por dia, no fuso informado.
///
/// Não guarda estado entre chamadas: cada relatório monta o próprio mapa de dias
/// e o próprio conjunto de vínculos já pesados.
#[derive(Debug, Clone, Copy)]
pub struct PeriodAggregator {
    offset: FixedOffset,
}

impl Default for PeriodAggregator {
    fn default() -> Self {
        Self::utc()
    }
}

impl PeriodAggregator {
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    pub fn with_offset(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    pub fn aggregate(
        &self,
        movements: &[Movement],
        delinquencies: &[Delinquency],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PeriodReport, AggregationError> {
        if end_date < start_date {
            return Err(AggregationError::InvalidRange { start: start_date, end: end_date });
        }

        // 1. Um balde zerado para cada dia do intervalo (inclusivo)
        let mut buckets: BTreeMap<NaiveDate, DailyBucket> = start_date
            .iter_days()
            .take_while(|day| *day <= end_date)
            .map(|day| (day, DailyBucket::empty(day)))
            .collect();

        // 2. Entradas, saídas e pagamentos de inadimplência
        for movement in movements {
            let Some(bucket) = buckets.get_mut(&self.local_date(movement.created_at)) else {
                continue;
            };
            if !movement.is_paid() {
                continue;
            }
            if movement.is_delinquency_payment() {
                bucket.delinquency_paid += movement.amount;
                continue;
            }
            match movement.direction {
                Direction::In => bucket.inflow += movement.amount,
                Direction::Out => bucket.outflow += movement.amount,
            }
        }

        // 3. Peso: uma vez por inadimplência vinculada
        let mut weighed_links: HashSet<Uuid> = HashSet::new();
        let mut total_weight_in_period = Decimal::ZERO;
        for movement in movements.iter().filter(|m| m.is_paid()) {
            let Some(grams) = movement.grams else { continue };
            if let Some(link) = movement.delinquency_id {
                if !weighed_links.insert(link) {
                    continue;
                }
            }
            total_weight_in_period += grams;
        }

        // 4. Inadimplências criadas no período, pagas depois ou não
        for delinquency in delinquencies {
            if let Some(bucket) = buckets.get_mut(&self.local_date(delinquency.created_at)) {
                bucket.delinquency_created += delinquency.amount;
            }
        }

        // 5. Totais do período (o BTreeMap já está em ordem crescente)
        let daily_buckets: Vec<DailyBucket> = buckets.into_values().collect();
        let period_inflow: Decimal = daily_buckets.iter().map(|b| b.inflow).sum();
        let period_outflow: Decimal = daily_buckets.iter().map(|b| b.outflow).sum();
        let period_delinquency_created: Decimal = daily_buckets.iter().map(|b| b.delinquency_created).sum();
        let period_delinquency_paid: Decimal = daily_buckets.iter().map(|b| b.delinquency_paid).sum();

        // 6. Saldo devedor atual, independente do período
        let mut current_delinquency_balance = Decimal::ZERO;
        let mut delinquent_customers: HashSet<Uuid> = HashSet::new();
        for delinquency in delinquencies.iter().filter(|d| !d.paid) {
            let outstanding = delinquency.outstanding();
            if outstanding > Decimal::ZERO {
                current_delinquency_balance += outstanding;
                delinquent_customers.insert(delinquency.customer_id);
            }
        }

        Ok(PeriodReport {
            daily_buckets,
            period_inflow,
            period_outflow,
            period_delinquency_created,
            period_delinquency_paid,
            net_cash_flow: period_inflow - period_outflow,
            total_weight_in_period,
            current_delinquency_balance,
            delinquent_customer_count: delinquent_customers.len(),
        })
    }
}

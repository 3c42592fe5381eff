// src/services/financial_service.rs

use chrono::{DateTime, Days, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::FinancialRepository,
    models::financial::{
        Delinquency, DelinquencyRow, FinancialQuery, FinancialReport, Movement, MovementFilter,
        MovementRow, MovementStatus,
    },
    services::aggregator::{AggregationError, PeriodAggregator},
};

const DATE_FORMAT: &str = "%Y-%m-%d";

// Só aceita yyyy-MM-dd exato: sem espaços e com mês/dia de dois dígitos
fn parse_date(field: &'static str, raw: &str) -> Result<NaiveDate, AppError> {
    let invalid = || AppError::InvalidDate { field, value: raw.to_string() };

    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| invalid())?;
    if date.format(DATE_FORMAT).to_string() != raw {
        return Err(invalid());
    }
    Ok(date)
}

/// Resolve o período pedido na query string.
///
/// Sem datas: a janela de `window_days` dias terminando em `today`. Só com o início:
/// vai até `today`. Só com o fim: a janela termina nele.
pub fn resolve_range(
    query: &FinancialQuery,
    today: NaiveDate,
    window_days: i64,
    max_range_days: i64,
) -> Result<(NaiveDate, NaiveDate), AppError> {
    let start = query.start_date.as_deref().map(|raw| parse_date("start_date", raw)).transpose()?;
    let end = query.end_date.as_deref().map(|raw| parse_date("end_date", raw)).transpose()?;

    let window = Duration::days(window_days - 1);
    let (start, end) = match (start, end) {
        (Some(start), Some(end)) => (start, end),
        (Some(start), None) => (start, today),
        (None, Some(end)) => (end - window, end),
        (None, None) => (today - window, today),
    };

    if end < start {
        return Err(AggregationError::InvalidRange { start, end }.into());
    }

    let days = (end - start).num_days() + 1;
    if days > max_range_days {
        return Err(AppError::RangeTooLong { days, max: max_range_days });
    }

    Ok((start, end))
}

/// Instantes UTC que cobrem os dias `[start, end]` no fuso informado (fim exclusivo).
pub fn day_bounds(
    start: NaiveDate,
    end: NaiveDate,
    offset: FixedOffset,
) -> Result<(DateTime<Utc>, DateTime<Utc>), AppError> {
    let shift = Duration::seconds(i64::from(offset.local_minus_utc()));
    let after_end = end
        .checked_add_days(Days::new(1))
        .ok_or_else(|| anyhow::anyhow!("Data final fora do calendário: {}", end))?;

    let from = (start.and_time(NaiveTime::MIN) - shift).and_utc();
    let until = (after_end.and_time(NaiveTime::MIN) - shift).and_utc();
    Ok((from, until))
}

#[derive(Clone)]
pub struct FinancialService {
    repo: FinancialRepository,
    aggregator: PeriodAggregator,
}

impl FinancialService {
    pub fn new(repo: FinancialRepository, aggregator: PeriodAggregator) -> Self {
        Self { repo, aggregator }
    }

    pub fn report_offset(&self) -> FixedOffset {
        self.aggregator.offset()
    }

    /// Filtro do período: os mesmos limites (no fuso do relatório) valem para as
    /// transações lidas e para os contadores.
    pub fn period_filter(
        &self,
        owner_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<MovementFilter, AppError> {
        let (created_from, created_until) = day_bounds(start_date, end_date, self.report_offset())?;
        Ok(MovementFilter { owner_id, created_from, created_until, status: None })
    }

    /// Monta o relatório do período a partir de um snapshot lido na conexão informada.
    ///
    /// A conexão deve estar numa transação com o RLS configurado
    /// (ver `common::db_utils::begin_rls_transaction`).
    pub async fn get_report(
        &self,
        conn: &mut PgConnection,
        owner_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<FinancialReport, AppError> {
        let filter = self.period_filter(owner_id, start_date, end_date)?;

        let movement_rows = self.repo.fetch_movements(&mut *conn, &filter).await?;
        let delinquency_rows = self.repo.fetch_delinquencies(&mut *conn, owner_id).await?;

        let counters = ReportCounters {
            total_transactions: self.repo.count_movements(&mut *conn, &filter).await?,
            pending_transactions: self
                .repo
                .count_movements(&mut *conn, &filter.with_status(MovementStatus::Pending))
                .await?,
            paid_transactions: self
                .repo
                .count_movements(&mut *conn, &filter.with_status(MovementStatus::Paid))
                .await?,
            active_customers: self.repo.count_active_customers(&mut *conn, owner_id).await?,
        };

        tracing::info!(
            %owner_id,
            %start_date,
            %end_date,
            movements = movement_rows.len(),
            delinquencies = delinquency_rows.len(),
            "📊 Relatório financeiro gerado"
        );

        self.assemble(movement_rows, delinquency_rows, start_date, end_date, counters)
    }

    /// Valida as linhas lidas e agrega no fuso do relatório.
    pub fn assemble(
        &self,
        movement_rows: Vec<MovementRow>,
        delinquency_rows: Vec<DelinquencyRow>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        counters: ReportCounters,
    ) -> Result<FinancialReport, AppError> {
        let movements = movement_rows
            .into_iter()
            .map(Movement::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let delinquencies = delinquency_rows
            .into_iter()
            .map(Delinquency::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let period = self.aggregator.aggregate(&movements, &delinquencies, start_date, end_date)?;

        Ok(FinancialReport {
            start_date,
            end_date,
            period,
            total_transactions: counters.total_transactions,
            pending_transactions: counters.pending_transactions,
            paid_transactions: counters.paid_transactions,
            active_customers: counters.active_customers,
        })
    }
}

/// Contadores simples, calculados por consultas de contagem fora do agregador.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportCounters {
    pub total_transactions: i64,
    pub pending_transactions: i64,
    pub paid_transactions: i64,
    pub active_customers: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn query(start: Option<&str>, end: Option<&str>) -> FinancialQuery {
        FinancialQuery {
            start_date: start.map(str::to_string),
            end_date: end.map(str::to_string),
        }
    }

    const TODAY: &str = "2024-03-20";

    #[test]
    fn no_dates_means_trailing_window_ending_today() {
        let (start, end) = resolve_range(&query(None, None), date(TODAY), 15, 366).unwrap();
        assert_eq!(start, date("2024-03-06"));
        assert_eq!(end, date(TODAY));
        assert_eq!((end - start).num_days() + 1, 15);
    }

    #[test]
    fn explicit_dates_are_kept() {
        let range = resolve_range(&query(Some("2024-01-10"), Some("2024-01-10")), date(TODAY), 15, 366).unwrap();
        assert_eq!(range, (date("2024-01-10"), date("2024-01-10")));
    }

    #[test]
    fn only_start_runs_until_today() {
        let range = resolve_range(&query(Some("2024-03-01"), None), date(TODAY), 15, 366).unwrap();
        assert_eq!(range, (date("2024-03-01"), date(TODAY)));
    }

    #[test]
    fn only_end_takes_the_window_before_it() {
        let range = resolve_range(&query(None, Some("2024-02-15")), date(TODAY), 15, 366).unwrap();
        assert_eq!(range, (date("2024-02-01"), date("2024-02-15")));
    }

    #[test]
    fn malformed_date_is_rejected() {
        let err = resolve_range(&query(Some("10/01/2024"), None), date(TODAY), 15, 366).unwrap_err();
        assert!(matches!(err, AppError::InvalidDate { field: "start_date", .. }));

        let err = resolve_range(&query(None, Some("2024-02-30")), date(TODAY), 15, 366).unwrap_err();
        assert!(matches!(err, AppError::InvalidDate { field: "end_date", .. }));

        let err = resolve_range(&query(Some("2024-01-5 "), None), date(TODAY), 15, 366).unwrap_err();
        assert!(matches!(err, AppError::InvalidDate { field: "start_date", .. }));

        let err = resolve_range(&query(None, Some(" 2024-1-07")), date(TODAY), 15, 366).unwrap_err();
        assert!(matches!(err, AppError::InvalidDate { field: "end_date", .. }));
    }

    #[test]
    fn end_before_start_is_an_error() {
        let err = resolve_range(&query(Some("2024-01-10"), Some("2024-01-01")), date(TODAY), 15, 366).unwrap_err();
        assert!(matches!(err, AppError::Aggregation(AggregationError::InvalidRange { .. })));
    }

    #[test]
    fn start_in_the_future_without_end_is_an_error() {
        let err = resolve_range(&query(Some("2024-04-01"), None), date(TODAY), 15, 366).unwrap_err();
        assert!(matches!(err, AppError::Aggregation(AggregationError::InvalidRange { .. })));
    }

    #[test]
    fn overly_long_range_is_rejected() {
        let err = resolve_range(&query(Some("2020-01-01"), Some("2024-01-01")), date(TODAY), 15, 366).unwrap_err();
        assert!(matches!(err, AppError::RangeTooLong { max: 366, .. }));
    }

    #[test]
    fn day_bounds_shift_local_midnight_to_utc() {
        let brasilia = FixedOffset::west_opt(3 * 3600).unwrap();
        let (from, until) = day_bounds(date("2024-01-10"), date("2024-01-11"), brasilia).unwrap();

        assert_eq!(from, Utc.with_ymd_and_hms(2024, 1, 10, 3, 0, 0).unwrap());
        assert_eq!(until, Utc.with_ymd_and_hms(2024, 1, 12, 3, 0, 0).unwrap());
    }

    fn brasilia_service() -> FinancialService {
        let offset = FixedOffset::west_opt(3 * 3600).unwrap();
        FinancialService::new(FinancialRepository::new(), PeriodAggregator::with_offset(offset))
    }

    fn paid_inflow(id: u128, created_at: DateTime<Utc>, amount: i64) -> MovementRow {
        MovementRow {
            id: Uuid::from_u128(id),
            amount: Some(rust_decimal::Decimal::new(amount, 0)),
            direction: Some(crate::models::financial::Direction::In),
            status: Some(MovementStatus::Paid),
            created_at: Some(created_at),
            delinquency_id: None,
            grams: None,
        }
    }

    #[test]
    fn period_filter_uses_the_report_offset_for_both_ends() {
        let service = brasilia_service();
        let owner = Uuid::from_u128(42);
        let filter = service.period_filter(owner, date("2024-01-10"), date("2024-01-11")).unwrap();

        assert_eq!(filter.owner_id, owner);
        assert_eq!(filter.status, None);
        assert_eq!(
            (filter.created_from, filter.created_until),
            day_bounds(date("2024-01-10"), date("2024-01-11"), service.report_offset()).unwrap()
        );

        // Os contadores por status herdam os mesmos limites
        let pending = filter.with_status(MovementStatus::Pending);
        assert_eq!(pending.status, Some(MovementStatus::Pending));
        assert_eq!((pending.created_from, pending.created_until), (filter.created_from, filter.created_until));
        assert_eq!(pending.owner_id, owner);
    }

    #[test]
    fn rows_at_the_filter_edges_land_in_first_and_last_buckets() {
        let service = brasilia_service();
        let (start, end) = (date("2024-01-10"), date("2024-01-11"));
        let filter = service.period_filter(Uuid::nil(), start, end).unwrap();

        let rows = vec![
            paid_inflow(1, filter.created_from, 10),
            paid_inflow(2, filter.created_until - Duration::seconds(1), 20),
        ];
        let counters = ReportCounters { total_transactions: 2, paid_transactions: 2, ..Default::default() };
        let report = service.assemble(rows, Vec::new(), start, end, counters).unwrap();

        assert_eq!(report.period.daily_buckets[0].inflow, rust_decimal::Decimal::new(10, 0));
        assert_eq!(report.period.daily_buckets[1].inflow, rust_decimal::Decimal::new(20, 0));
        assert_eq!(report.total_transactions, 2);
        assert_eq!(report.paid_transactions, 2);
        assert_eq!(report.pending_transactions, 0);
        assert_eq!((report.start_date, report.end_date), (start, end));
    }

    #[test]
    fn incomplete_row_fails_the_whole_report() {
        let service = brasilia_service();
        let mut row = paid_inflow(1, Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap(), 10);
        row.amount = None;

        let err = service
            .assemble(vec![row], Vec::new(), date("2024-01-10"), date("2024-01-10"), ReportCounters::default())
            .unwrap_err();
        assert!(matches!(err, AppError::Aggregation(AggregationError::InvalidRecord { field: "amount", .. })));
    }
}

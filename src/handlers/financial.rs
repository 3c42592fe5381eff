// src/handlers/financial.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    common::{
        db_utils::begin_rls_transaction,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{auth::AuthenticatedOwner, i18n::Locale},
    models::financial::{FinancialQuery, FinancialReport},
    services::financial_service::resolve_range,
};

// GET /api/financial
#[utoipa::path(
    get,
    path = "/api/financial",
    tag = "Financial",
    params(FinancialQuery),
    responses(
        (status = 200, description = "Relatório do período: baldes diários, totais e inadimplência atual", body = FinancialReport),
        (status = 400, description = "Datas inválidas ou período inválido"),
        (status = 401, description = "Não autorizado"),
        (status = 422, description = "Registros incompletos no banco")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_financial_report(
    State(app_state): State<AppState>,
    locale: Locale,
    owner: AuthenticatedOwner,
    Query(query): Query<FinancialQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    query.validate().map_err(|e| to_api(AppError::ValidationError(e)))?;

    // "Hoje" no fuso do relatório, não no do servidor
    let service = &app_state.financial_service;
    let today = Utc::now().with_timezone(&service.report_offset()).date_naive();
    let (start_date, end_date) = resolve_range(
        &query,
        today,
        app_state.config.report_window_days,
        app_state.config.report_max_range_days,
    )
    .map_err(to_api)?;

    let mut tx = begin_rls_transaction(&app_state, &owner).await.map_err(to_api)?;

    let report = service
        .get_report(&mut *tx, owner.0, start_date, end_date)
        .await
        .map_err(to_api)?;

    // Só leitura, mas fecha a transação de forma limpa
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(report)))
}

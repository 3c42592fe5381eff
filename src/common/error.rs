use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{
    common::i18n::I18nStore,
    middleware::i18n::Locale,
    models::financial::AggregationError,
};

// Erros internos da aplicação. Viram `ApiError` (já traduzidos) na borda HTTP.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Data inválida em '{field}': {value}")]
    InvalidDate { field: &'static str, value: String },

    #[error("Período de {days} dias excede o máximo de {max}")]
    RangeTooLong { days: i64, max: i64 },

    #[error(transparent)]
    Aggregation(#[from] AggregationError),

    #[error("Token inválido")]
    InvalidToken,

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

/// Erro pronto para ser enviado ao cliente.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl ApiError {
    fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self { status, error: error.into(), details: None }
    }

    fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidDate { .. }
            | AppError::RangeTooLong { .. }
            | AppError::Aggregation(AggregationError::InvalidRange { .. }) => StatusCode::BAD_REQUEST,
            // Registro incompleto vem do banco, não do cliente
            AppError::Aggregation(AggregationError::InvalidRecord { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidToken | AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message_key(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_error",
            AppError::InvalidDate { .. } => "invalid_date",
            AppError::RangeTooLong { .. } => "range_too_long",
            AppError::Aggregation(AggregationError::InvalidRange { .. }) => "invalid_range",
            AppError::Aggregation(AggregationError::InvalidRecord { .. }) => "invalid_record",
            AppError::InvalidToken | AppError::JwtError(_) => "invalid_token",
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => "internal_error",
        }
    }

    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status();
        let message = store.translate(&locale.0, self.message_key());

        match self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<Value> = field_errors
                        .iter()
                        .map(|e| {
                            let key = e.message.as_deref().unwrap_or(&e.code);
                            Value::String(store.translate(&locale.0, key).to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), Value::Array(messages));
                }
                ApiError::new(status, message).with_details(Value::Object(details))
            }
            AppError::InvalidDate { field, value } => {
                ApiError::new(status, message).with_details(json!({ "field": field, "value": value }))
            }
            AppError::RangeTooLong { days, max } => {
                ApiError::new(status, message).with_details(json!({ "days": days, "maxDays": max }))
            }
            AppError::Aggregation(AggregationError::InvalidRange { start, end }) => {
                ApiError::new(status, message).with_details(json!({ "startDate": start, "endDate": end }))
            }
            AppError::Aggregation(AggregationError::InvalidRecord { .. }) => {
                tracing::warn!("Registro financeiro inválido: {}", self);
                ApiError::new(status, message)
            }
            AppError::InvalidToken => ApiError::new(status, message),
            AppError::JwtError(e) => {
                tracing::debug!("Token rejeitado: {}", e);
                ApiError::new(status, message)
            }
            // DatabaseError e InternalServerError: detalhe só no log
            _ => {
                tracing::error!("Erro Interno do Servidor: {}", self);
                ApiError::new(status, message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Health ---
        handlers::health::health_check,

        // --- Financial ---
        handlers::financial::get_financial_report,
    ),
    components(
        schemas(
            // --- FINANCIAL ---
            models::financial::Direction,
            models::financial::MovementStatus,
            models::financial::DailyBucket,
            models::financial::PeriodReport,
            models::financial::FinancialReport,
        )
    ),
    tags(
        (name = "Health", description = "Situação do serviço"),
        (name = "Financial", description = "Relatório financeiro e inadimplência")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

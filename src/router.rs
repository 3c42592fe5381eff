// src/router.rs

use axum::{middleware as axum_middleware, routing::get, Router};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn create_router(app_state: AppState) -> Router {
    // Rotas protegidas pelo token
    let financial_routes = Router::new()
        .route("/api/financial", get(handlers::financial::get_financial_report))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .route("/api/health", get(handlers::health::health_check))
        .merge(financial_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}

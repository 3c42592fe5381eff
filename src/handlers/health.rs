// src/handlers/health.rs

// GET /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Serviço no ar", body = String)
    )
)]
pub async fn health_check() -> &'static str {
    "OK"
}

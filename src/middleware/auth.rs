use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeaderRejection,
    TypedHeader,
};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
};

/// Dono dos dados da requisição, vindo do `sub` do token.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedOwner(pub Uuid);

// O middleware em si
pub async fn auth_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let reject = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let TypedHeader(Authorization(bearer)) = bearer.map_err(|_| reject(AppError::InvalidToken))?;
    let owner_id = app_state.token_validator.validate(bearer.token()).map_err(reject)?;

    // Insere o dono nos "extensions" da requisição
    request.extensions_mut().insert(AuthenticatedOwner(owner_id));
    Ok(next.run(request).await)
}

// Extrator para obter o dono autenticado diretamente nos handlers
impl<S> FromRequestParts<S> for AuthenticatedOwner
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(owner) = parts.extensions.get::<AuthenticatedOwner>() {
            return Ok(*owner);
        }

        // Rota montada sem o `auth_guard`
        let app_state = AppState::from_ref(state);
        let Ok(locale) = Locale::from_request_parts(parts, state).await;
        Err(AppError::InvalidToken.to_api_error(&locale, &app_state.i18n_store))
    }
}

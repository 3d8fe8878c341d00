// src/middleware/auth.rs

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
};

// O middleware em si: valida o Bearer token e injeta a identidade nas
// extensions da requisição. Sem token válido, nada abaixo dele executa.
// Quem lê a identidade dali são os extractors (TenantContext e o
// guardião de permissões).
pub async fn auth_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(TypedHeader(Authorization(bearer))) = bearer else {
        return Err(AppError::InvalidToken.to_api_error(&locale, &app_state.i18n_store));
    };

    let user = app_state
        .auth_service
        .validate_token(bearer.token())
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // Insere a identidade nos "extensions" da requisição
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

// src/middleware/tenancy.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::common::error::ApiError;
use crate::models::auth::CurrentUser;

// O extrator de tenant. O tenant vem sempre das claims do token já
// validado pelo auth_guard; nunca de cabeçalho ou querystring, para que
// um cliente não consiga apontar para dados de outro tenant.
#[derive(Debug, Clone)]
pub struct TenantContext(pub Uuid);

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    // ApiError como rejeição, pois ele já implementa IntoResponse
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .map(|user| TenantContext(user.tenant_id))
            .ok_or_else(ApiError::unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::Role;
    use axum::extract::Request;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn o_tenant_vem_das_claims() {
        let tenant_id = Uuid::new_v4();
        let mut request = Request::new(axum::body::Body::empty());
        request.extensions_mut().insert(CurrentUser {
            user_id: Uuid::new_v4(),
            tenant_id,
            role: Role::Manager,
        });
        let mut parts = request.into_parts().0;

        let tenant = TenantContext::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(tenant.0, tenant_id);
    }

    #[tokio::test]
    async fn sem_identidade_rejeita_com_401() {
        let mut parts = Request::new(axum::body::Body::empty()).into_parts().0;
        let rejection = TenantContext::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert_eq!(rejection.status, StatusCode::UNAUTHORIZED);
    }
}

// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::auth::{CurrentUser, Role},
};

/// 1. O Trait que define o que é uma Permissão.
/// O papel vem das claims do token, então a checagem é uma função pura
/// de Role, sem ida ao banco.
pub trait PermissionDef: Send + Sync + 'static {
    fn slug() -> &'static str;
    fn granted_to(role: Role) -> bool;
}

/// 2. O Extractor (Guardião)
pub struct RequirePermission<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let locale = Locale::from_headers(&parts.headers);

        // A. Extrai a identidade deixada pelo auth_guard
        let user = parts.extensions.get::<CurrentUser>().ok_or_else(|| {
            AppError::InvalidToken.to_api_error(&locale, &app_state.i18n_store)
        })?;

        // B. Confere o papel contra a permissão exigida
        if !T::granted_to(user.role) {
            return Err(AppError::PermissionDenied {
                permission: T::slug(),
            }
            .to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

/// Leitura do módulo financeiro: qualquer papel autenticado.
pub struct PermFinanceRead;
impl PermissionDef for PermFinanceRead {
    fn slug() -> &'static str {
        "finance:read"
    }
    fn granted_to(_role: Role) -> bool {
        true
    }
}

/// Escrita do módulo financeiro: Admin e Manager.
pub struct PermFinanceWrite;
impl PermissionDef for PermFinanceWrite {
    fn slug() -> &'static str {
        "finance:write"
    }
    fn granted_to(role: Role) -> bool {
        matches!(role, Role::Admin | Role::Manager)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leitura_vale_para_todos_os_papeis() {
        assert!(PermFinanceRead::granted_to(Role::Admin));
        assert!(PermFinanceRead::granted_to(Role::Manager));
        assert!(PermFinanceRead::granted_to(Role::Contributor));
    }

    #[test]
    fn escrita_exclui_contributor() {
        assert!(PermFinanceWrite::granted_to(Role::Admin));
        assert!(PermFinanceWrite::granted_to(Role::Manager));
        assert!(!PermFinanceWrite::granted_to(Role::Contributor));
    }
}

// src/models/auth.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Papéis reconhecidos pelo backend. A atribuição de papel acontece no
/// serviço de identidade que emite o token; aqui o papel é apenas lido
/// das claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Contributor,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,    // Subject (ID do usuário)
    pub tenant: Uuid, // Tenant ao qual o token dá acesso
    pub role: Role,   // Papel do usuário dentro do tenant
    pub exp: usize,   // Expiration time (quando o token expira)
    pub iat: usize,   // Issued At (quando o token foi criado)
}

/// Identidade autenticada da requisição, derivada de um token válido.
/// Inserida nas extensions pelo auth_guard e lida pelos extractors.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub role: Role,
}

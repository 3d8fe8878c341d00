// src/services/auth.rs

use jsonwebtoken::{DecodingKey, Validation, decode};

use crate::{
    common::error::AppError,
    models::auth::{Claims, CurrentUser},
};

/// Validação dos tokens de acesso. A emissão acontece no serviço de
/// identidade, que compartilha o segredo; este backend só decodifica e
/// extrai o contexto (usuário, tenant e papel).
#[derive(Clone)]
pub struct AuthService {
    jwt_secret: String,
}

impl AuthService {
    pub fn new(jwt_secret: String) -> Self {
        Self { jwt_secret }
    }

    /// Decodifica e valida o token (assinatura e expiração). Qualquer
    /// defeito vira o mesmo InvalidToken: o cliente não precisa saber se
    /// o token expirou ou foi adulterado.
    pub fn validate_token(&self, token: &str) -> Result<CurrentUser, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        let claims = token_data.claims;
        Ok(CurrentUser {
            user_id: claims.sub,
            tenant_id: claims.tenant,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::Role;
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use uuid::Uuid;

    const SECRET: &str = "segredo-de-teste";

    fn mint_token(secret: &str, offset_secs: i64, role: Role) -> (String, Uuid, Uuid) {
        let user_id = Uuid::new_v4();
        let tenant_id = Uuid::new_v4();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            tenant: tenant_id,
            role,
            exp: (now + offset_secs) as usize,
            iat: now as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_ref()),
        )
        .unwrap();
        (token, user_id, tenant_id)
    }

    #[test]
    fn token_valido_devolve_o_contexto_das_claims() {
        let service = AuthService::new(SECRET.to_string());
        let (token, user_id, tenant_id) = mint_token(SECRET, 3600, Role::Manager);

        let user = service.validate_token(&token).unwrap();
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.tenant_id, tenant_id);
        assert_eq!(user.role, Role::Manager);
    }

    #[test]
    fn token_expirado_reprova() {
        let service = AuthService::new(SECRET.to_string());
        // Uma hora no passado, bem além da tolerância do validador.
        let (token, _, _) = mint_token(SECRET, -3600, Role::Admin);

        assert!(matches!(
            service.validate_token(&token),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn token_com_assinatura_errada_reprova() {
        let service = AuthService::new(SECRET.to_string());
        let (token, _, _) = mint_token("outro-segredo", 3600, Role::Admin);

        assert!(matches!(
            service.validate_token(&token),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn lixo_nao_passa() {
        let service = AuthService::new(SECRET.to_string());
        assert!(service.validate_token("nem.um.jwt").is_err());
    }
}

// src/common/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::collections::HashMap;
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// Erro interno das camadas de serviço e repositório, com `thiserror`
// para melhor ergonomia. A tradução para HTTP acontece em `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // --- Regras de rateio ---
    #[error("Cada rateio deve informar exatamente um entre valor e percentual")]
    AllocationValueRequired,

    #[error("Percentual de rateio fora do intervalo de 0 a 100")]
    AllocationPercentageOutOfRange,

    #[error("A soma dos rateios difere do valor total da fatura")]
    AllocationSumMismatch,

    #[error("Projetos repetidos no conjunto de rateios")]
    AllocationDuplicateProject,

    #[error("Conjunto de rateios vazio")]
    AllocationSetEmpty,

    #[error("Valor monetário deve ser maior que zero")]
    AmountNotPositive,

    // --- Referências e registros ---
    #[error("Empresa não encontrada")]
    CompanyNotFound,

    #[error("Projeto não encontrado")]
    ProjectNotFound,

    #[error("Fatura não encontrada")]
    ExpenseNotFound,

    #[error("Pagamento não encontrado")]
    PaymentNotFound,

    #[error("Venda não encontrada")]
    SaleNotFound,

    #[error("Fatura {invoice_number} possui {count} pagamento(s) vinculado(s)")]
    ExpenseHasPayments { invoice_number: String, count: i64 },

    // --- Autenticação e autorização ---
    #[error("Token inválido")]
    InvalidToken,

    #[error("Permissão '{permission}' necessária")]
    PermissionDenied { permission: &'static str },

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado.
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    /// Traduz o erro interno para a resposta HTTP, já na língua pedida
    /// pelo cliente. Erros 5xx são logados aqui, com o detalhe interno
    /// que nunca vaza para o corpo da resposta.
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let lang = locale.0.as_str();

        let simple = |status: StatusCode, code: &'static str| ApiError {
            status,
            code,
            message: store.message(lang, code).to_string(),
            details: None,
        };

        match self {
            AppError::ValidationError(errors) => {
                let mut details = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| {
                            e.message.as_ref().map(|m| store.message(lang, m).to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                ApiError {
                    status: StatusCode::BAD_REQUEST,
                    code: "validation_failed",
                    message: store.message(lang, "validation_failed").to_string(),
                    details: Some(details),
                }
            }

            AppError::AllocationValueRequired => {
                simple(StatusCode::BAD_REQUEST, "allocation_value_required")
            }
            AppError::AllocationPercentageOutOfRange => {
                simple(StatusCode::BAD_REQUEST, "allocation_percentage_out_of_range")
            }
            AppError::AllocationSumMismatch => {
                simple(StatusCode::BAD_REQUEST, "allocation_sum_mismatch")
            }
            AppError::AllocationDuplicateProject => {
                simple(StatusCode::BAD_REQUEST, "allocation_duplicate_project")
            }
            AppError::AllocationSetEmpty => simple(StatusCode::BAD_REQUEST, "allocation_set_empty"),
            AppError::AmountNotPositive => simple(StatusCode::BAD_REQUEST, "amount_not_positive"),

            AppError::CompanyNotFound => simple(StatusCode::NOT_FOUND, "company_not_found"),
            AppError::ProjectNotFound => simple(StatusCode::NOT_FOUND, "project_not_found"),
            AppError::ExpenseNotFound => simple(StatusCode::NOT_FOUND, "expense_not_found"),
            AppError::PaymentNotFound => simple(StatusCode::NOT_FOUND, "payment_not_found"),
            AppError::SaleNotFound => simple(StatusCode::NOT_FOUND, "sale_not_found"),

            AppError::ExpenseHasPayments {
                invoice_number,
                count,
            } => ApiError {
                status: StatusCode::CONFLICT,
                code: "expense_has_payments",
                message: store.format(
                    lang,
                    "expense_has_payments",
                    &[
                        ("invoice", invoice_number.clone()),
                        ("count", count.to_string()),
                    ],
                ),
                details: None,
            },

            AppError::InvalidToken => simple(StatusCode::UNAUTHORIZED, "invalid_token"),

            AppError::PermissionDenied { permission } => ApiError {
                status: StatusCode::FORBIDDEN,
                code: "permission_denied",
                message: store.format(
                    lang,
                    "permission_denied",
                    &[("permission", (*permission).to_string())],
                ),
                details: None,
            },

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` registra a mensagem detalhada que o `thiserror` nos deu.
            e @ (AppError::DatabaseError(_) | AppError::InternalServerError(_)) => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                simple(StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        }
    }
}

/// Erro já pronto para sair pela borda HTTP: status, código estável para
/// os clientes e mensagem localizada.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub details: Option<HashMap<String, Vec<String>>>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Resposta de guarda para rotas que dependem do auth_guard mas foram
    /// alcançadas sem identidade nas extensions.
    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "invalid_token",
            "Invalid or missing authentication token",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut error = json!({
            "code": self.code,
            "message": self.message,
        });
        if let Some(details) = self.details {
            error["details"] = json!(details);
        }
        (self.status, Json(json!({ "error": error }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locale(lang: &str) -> Locale {
        Locale(lang.to_string())
    }

    #[test]
    fn rateio_invalido_vira_400_com_codigo_estavel() {
        let store = I18nStore::new();
        let api = AppError::AllocationSumMismatch.to_api_error(&locale("en"), &store);

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.code, "allocation_sum_mismatch");
        assert_eq!(api.message, "Sum of allocations must equal total amount");
    }

    #[test]
    fn nao_encontrado_vira_404() {
        let store = I18nStore::new();
        for err in [
            AppError::CompanyNotFound,
            AppError::ProjectNotFound,
            AppError::ExpenseNotFound,
            AppError::PaymentNotFound,
            AppError::SaleNotFound,
        ] {
            assert_eq!(
                err.to_api_error(&locale("en"), &store).status,
                StatusCode::NOT_FOUND
            );
        }
    }

    #[test]
    fn fatura_com_pagamentos_vira_409_com_parametros_na_mensagem() {
        let store = I18nStore::new();
        let err = AppError::ExpenseHasPayments {
            invoice_number: "NF-001".to_string(),
            count: 2,
        };
        let api = err.to_api_error(&locale("en"), &store);

        assert_eq!(api.status, StatusCode::CONFLICT);
        assert!(api.message.contains("NF-001"));
        assert!(api.message.contains('2'));
    }

    #[test]
    fn erro_de_banco_vira_500_opaco() {
        let store = I18nStore::new();
        let api = AppError::DatabaseError(sqlx::Error::PoolTimedOut)
            .to_api_error(&locale("en"), &store);

        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.code, "internal_error");
    }

    #[test]
    fn mensagens_seguem_a_lingua_do_cliente() {
        let store = I18nStore::new();
        let api = AppError::ExpenseNotFound.to_api_error(&locale("pt"), &store);
        assert_eq!(api.message, "Fatura não encontrada");
    }

    #[tokio::test]
    async fn corpo_da_resposta_embrulha_o_erro() {
        let api = ApiError::new(StatusCode::NOT_FOUND, "expense_not_found", "Invoice not found");
        let response = api.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["error"]["code"], "expense_not_found");
        assert_eq!(body["error"]["message"], "Invoice not found");
        assert!(body["error"].get("details").is_none());
    }
}

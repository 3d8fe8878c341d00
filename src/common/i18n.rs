// src/common/i18n.rs

/// Catálogo de mensagens da API. Inglês é a língua padrão do contrato;
/// português cobre os clientes internos. Chaves estáveis em snake_case,
/// placeholders no formato {nome}.
///
/// Fallback em duas etapas: língua pedida, depois inglês, depois a
/// própria chave (nunca devolvemos vazio).
const MESSAGES: &[(&str, &str, &str)] = &[
    // --- Validação de payload ---
    ("en", "validation_failed", "One or more fields are invalid"),
    ("pt", "validation_failed", "Um ou mais campos são inválidos"),
    ("en", "required", "This field is required"),
    ("pt", "required", "Este campo é obrigatório"),
    (
        "en",
        "invalid_currency_code",
        "Currency code must have exactly 3 letters (ISO 4217)",
    ),
    (
        "pt",
        "invalid_currency_code",
        "O código de moeda deve ter exatamente 3 letras (ISO 4217)",
    ),
    // --- Regras de rateio ---
    (
        "en",
        "allocation_value_required",
        "Each allocation must provide exactly one of allocatedAmount or allocatedPercentage",
    ),
    (
        "pt",
        "allocation_value_required",
        "Cada rateio deve informar exatamente um entre allocatedAmount e allocatedPercentage",
    ),
    (
        "en",
        "allocation_percentage_out_of_range",
        "Allocation percentage must be between 0 and 100",
    ),
    (
        "pt",
        "allocation_percentage_out_of_range",
        "O percentual de rateio deve estar entre 0 e 100",
    ),
    (
        "en",
        "allocation_sum_mismatch",
        "Sum of allocations must equal total amount",
    ),
    (
        "pt",
        "allocation_sum_mismatch",
        "A soma dos rateios deve ser igual ao valor total",
    ),
    (
        "en",
        "allocation_duplicate_project",
        "Duplicate project IDs in allocations",
    ),
    (
        "pt",
        "allocation_duplicate_project",
        "Há projetos repetidos no conjunto de rateios",
    ),
    (
        "en",
        "allocation_set_empty",
        "At least one allocation is required",
    ),
    ("pt", "allocation_set_empty", "Informe pelo menos um rateio"),
    (
        "en",
        "amount_not_positive",
        "Amount must be greater than zero",
    ),
    ("pt", "amount_not_positive", "O valor deve ser maior que zero"),
    // --- Registros ---
    ("en", "company_not_found", "Company not found"),
    ("pt", "company_not_found", "Empresa não encontrada"),
    ("en", "project_not_found", "Project not found"),
    ("pt", "project_not_found", "Projeto não encontrado"),
    ("en", "expense_not_found", "Invoice not found"),
    ("pt", "expense_not_found", "Fatura não encontrada"),
    ("en", "payment_not_found", "Payment not found"),
    ("pt", "payment_not_found", "Pagamento não encontrado"),
    ("en", "sale_not_found", "Sale not found"),
    ("pt", "sale_not_found", "Venda não encontrada"),
    (
        "en",
        "expense_has_payments",
        "Cannot delete invoice {invoice}: {count} payment(s) are linked to it",
    ),
    (
        "pt",
        "expense_has_payments",
        "Não é possível excluir a fatura {invoice}: existem {count} pagamento(s) vinculados",
    ),
    // --- Autenticação e autorização ---
    ("en", "invalid_token", "Invalid or missing authentication token"),
    ("pt", "invalid_token", "Token de autenticação inválido ou ausente"),
    (
        "en",
        "permission_denied",
        "The '{permission}' permission is required for this action",
    ),
    (
        "pt",
        "permission_denied",
        "A permissão '{permission}' é necessária para esta ação",
    ),
    // --- Genéricos ---
    ("en", "internal_error", "An unexpected error occurred"),
    ("pt", "internal_error", "Ocorreu um erro inesperado"),
];

#[derive(Debug, Clone, Default)]
pub struct I18nStore;

impl I18nStore {
    pub fn new() -> Self {
        Self
    }

    /// Resolve a mensagem para a língua pedida, caindo para o inglês e,
    /// em último caso, para a própria chave.
    pub fn message<'a>(&self, locale: &str, key: &'a str) -> &'a str {
        lookup(locale, key)
            .or_else(|| lookup("en", key))
            .unwrap_or(key)
    }

    /// Igual a `message`, substituindo placeholders {nome} pelos parâmetros.
    pub fn format(&self, locale: &str, key: &str, params: &[(&str, String)]) -> String {
        let mut text = self.message(locale, key).to_string();
        for (name, value) in params {
            text = text.replace(&format!("{{{name}}}"), value);
        }
        text
    }
}

fn lookup(locale: &str, key: &str) -> Option<&'static str> {
    MESSAGES
        .iter()
        .find(|(lang, k, _)| *lang == locale && *k == key)
        .map(|(_, _, text)| *text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_na_lingua_pedida() {
        let store = I18nStore::new();
        assert_eq!(
            store.message("pt", "expense_not_found"),
            "Fatura não encontrada"
        );
    }

    #[test]
    fn cai_para_ingles_quando_a_lingua_nao_existe() {
        let store = I18nStore::new();
        assert_eq!(store.message("de", "expense_not_found"), "Invoice not found");
    }

    #[test]
    fn cai_para_a_chave_quando_nao_catalogada() {
        let store = I18nStore::new();
        assert_eq!(store.message("en", "chave_inexistente"), "chave_inexistente");
    }

    #[test]
    fn format_substitui_placeholders() {
        let store = I18nStore::new();
        let text = store.format(
            "en",
            "expense_has_payments",
            &[
                ("invoice", "NF-001".to_string()),
                ("count", "3".to_string()),
            ],
        );
        assert_eq!(
            text,
            "Cannot delete invoice NF-001: 3 payment(s) are linked to it"
        );
    }
}

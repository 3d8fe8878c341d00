// src/services/allocation.rs
//
// Motor de rateio: valida e normaliza o conjunto de alocações de uma
// fatura contra o valor total, antes de qualquer escrita no banco.
// Tudo aqui é puro; quem fala com o banco é o serviço de faturas.

use rust_decimal::Decimal;
use std::collections::HashSet;
use uuid::Uuid;

use crate::common::error::AppError;

/// Valor de rateio vindo do cliente: valor fixo OU percentual do total,
/// nunca ambos, nunca nenhum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AllocationValue {
    Amount(Decimal),
    Percentage(Decimal),
}

#[derive(Debug, Clone)]
pub struct AllocationRequest {
    pub project_id: Uuid,
    pub value: AllocationValue,
}

impl AllocationRequest {
    /// Constrói a partir do par de campos opcionais do payload (regra XOR).
    pub fn from_parts(
        project_id: Uuid,
        amount: Option<Decimal>,
        percentage: Option<Decimal>,
    ) -> Result<Self, AppError> {
        let value = match (amount, percentage) {
            (Some(amount), None) => AllocationValue::Amount(amount),
            (None, Some(percentage)) => AllocationValue::Percentage(percentage),
            _ => return Err(AppError::AllocationValueRequired),
        };
        Ok(Self { project_id, value })
    }
}

/// Alocação pronta para persistência: o valor efetivo está sempre
/// calculado; o percentual original é preservado quando foi ele que veio
/// do cliente.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedAllocation {
    pub project_id: Uuid,
    pub amount: Decimal,
    pub percentage: Option<Decimal>,
}

/// Normaliza uma alocação contra o total da fatura. Percentuais usam o
/// total vigente no momento do cálculo; se o total mudar depois, os
/// rateios precisam ser reenviados.
pub fn normalize(total: Decimal, request: &AllocationRequest) -> Result<NormalizedAllocation, AppError> {
    match request.value {
        AllocationValue::Amount(amount) => Ok(NormalizedAllocation {
            project_id: request.project_id,
            amount,
            percentage: None,
        }),
        AllocationValue::Percentage(percentage) => {
            if percentage < Decimal::ZERO || percentage > Decimal::ONE_HUNDRED {
                return Err(AppError::AllocationPercentageOutOfRange);
            }
            Ok(NormalizedAllocation {
                project_id: request.project_id,
                amount: total * percentage / Decimal::ONE_HUNDRED,
                percentage: Some(percentage),
            })
        }
    }
}

/// Valida e normaliza o conjunto completo de rateios de uma fatura.
/// Regras: conjunto não vazio, projetos sem repetição e soma dos valores
/// efetivos igual ao total. A folga de 0.01 absorve arredondamento de
/// clientes que calculam em ponto flutuante; qualquer diferença igual ou
/// maior que um centavo reprova.
pub fn normalize_set(
    total: Decimal,
    requests: &[AllocationRequest],
) -> Result<Vec<NormalizedAllocation>, AppError> {
    if requests.is_empty() {
        return Err(AppError::AllocationSetEmpty);
    }

    let mut seen = HashSet::new();
    for request in requests {
        if !seen.insert(request.project_id) {
            return Err(AppError::AllocationDuplicateProject);
        }
    }

    let normalized: Vec<NormalizedAllocation> = requests
        .iter()
        .map(|request| normalize(total, request))
        .collect::<Result<_, _>>()?;

    let sum: Decimal = normalized.iter().map(|a| a.amount).sum();
    if (total - sum).abs() >= Decimal::new(1, 2) {
        return Err(AppError::AllocationSumMismatch);
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(project_id: Uuid, value: i64) -> AllocationRequest {
        AllocationRequest {
            project_id,
            value: AllocationValue::Amount(Decimal::from(value)),
        }
    }

    fn percentage(project_id: Uuid, value: i64) -> AllocationRequest {
        AllocationRequest {
            project_id,
            value: AllocationValue::Percentage(Decimal::from(value)),
        }
    }

    #[test]
    fn from_parts_exige_exatamente_um_valor() {
        let project = Uuid::new_v4();

        assert!(AllocationRequest::from_parts(project, Some(Decimal::TEN), None).is_ok());
        assert!(AllocationRequest::from_parts(project, None, Some(Decimal::TEN)).is_ok());

        assert!(matches!(
            AllocationRequest::from_parts(project, None, None),
            Err(AppError::AllocationValueRequired)
        ));
        assert!(matches!(
            AllocationRequest::from_parts(project, Some(Decimal::TEN), Some(Decimal::TEN)),
            Err(AppError::AllocationValueRequired)
        ));
    }

    #[test]
    fn percentual_converte_contra_o_total() {
        let total = Decimal::from(1000);
        let request = percentage(Uuid::new_v4(), 60);

        let normalized = normalize(total, &request).unwrap();
        assert_eq!(normalized.amount, Decimal::from(600));
        assert_eq!(normalized.percentage, Some(Decimal::from(60)));
    }

    #[test]
    fn valor_fixo_nao_guarda_percentual() {
        let normalized = normalize(Decimal::from(1000), &amount(Uuid::new_v4(), 400)).unwrap();
        assert_eq!(normalized.amount, Decimal::from(400));
        assert_eq!(normalized.percentage, None);
    }

    #[test]
    fn percentual_fora_do_intervalo_reprova() {
        let total = Decimal::from(1000);

        let above = AllocationRequest {
            project_id: Uuid::new_v4(),
            value: AllocationValue::Percentage(Decimal::new(1005, 1)), // 100.5
        };
        assert!(matches!(
            normalize(total, &above),
            Err(AppError::AllocationPercentageOutOfRange)
        ));

        let below = percentage(Uuid::new_v4(), -1);
        assert!(matches!(
            normalize(total, &below),
            Err(AppError::AllocationPercentageOutOfRange)
        ));

        // Os extremos 0 e 100 são válidos.
        assert!(normalize(total, &percentage(Uuid::new_v4(), 0)).is_ok());
        assert!(normalize(total, &percentage(Uuid::new_v4(), 100)).is_ok());
    }

    #[test]
    fn conjunto_misto_60_por_cento_e_400_fecha_o_total() {
        let total = Decimal::from(1000);
        let requests = vec![percentage(Uuid::new_v4(), 60), amount(Uuid::new_v4(), 400)];

        let normalized = normalize_set(total, &requests).unwrap();
        assert_eq!(normalized.len(), 2);
        assert_eq!(normalized[0].amount, Decimal::from(600));
        assert_eq!(normalized[1].amount, Decimal::from(400));
    }

    #[test]
    fn soma_diferente_do_total_reprova() {
        let total = Decimal::from(1000);
        let requests = vec![amount(Uuid::new_v4(), 700), amount(Uuid::new_v4(), 400)];

        assert!(matches!(
            normalize_set(total, &requests),
            Err(AppError::AllocationSumMismatch)
        ));
    }

    #[test]
    fn folga_de_arredondamento_menor_que_um_centavo_passa() {
        let total = Decimal::from(1000);

        // 999.995: diferença de 0.005, abaixo da folga.
        let ok = vec![
            amount(Uuid::new_v4(), 500),
            AllocationRequest {
                project_id: Uuid::new_v4(),
                value: AllocationValue::Amount(Decimal::new(499_995, 3)),
            },
        ];
        assert!(normalize_set(total, &ok).is_ok());

        // 999.99: diferença de exatamente 0.01, reprova.
        let limit = vec![
            amount(Uuid::new_v4(), 500),
            AllocationRequest {
                project_id: Uuid::new_v4(),
                value: AllocationValue::Amount(Decimal::new(499_99, 2)),
            },
        ];
        assert!(matches!(
            normalize_set(total, &limit),
            Err(AppError::AllocationSumMismatch)
        ));
    }

    #[test]
    fn projeto_repetido_reprova_antes_da_soma() {
        let project = Uuid::new_v4();
        let total = Decimal::from(1000);
        let requests = vec![amount(project, 600), amount(project, 400)];

        assert!(matches!(
            normalize_set(total, &requests),
            Err(AppError::AllocationDuplicateProject)
        ));
    }

    #[test]
    fn conjunto_vazio_reprova() {
        assert!(matches!(
            normalize_set(Decimal::from(1000), &[]),
            Err(AppError::AllocationSetEmpty)
        ));
    }

    #[test]
    fn percentuais_somando_100_fecham_qualquer_total() {
        let total = Decimal::new(123_457, 2); // 1234.57
        let requests = vec![
            percentage(Uuid::new_v4(), 25),
            percentage(Uuid::new_v4(), 25),
            percentage(Uuid::new_v4(), 50),
        ];

        let normalized = normalize_set(total, &requests).unwrap();
        let sum: Decimal = normalized.iter().map(|a| a.amount).sum();
        assert_eq!(sum, total);
    }
}

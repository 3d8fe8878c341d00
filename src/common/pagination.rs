// src/common/pagination.rs

use serde::Serialize;
use utoipa::ToSchema;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Normaliza os parâmetros de página vindos da query string.
/// Página mínima 1; tamanho entre 1 e MAX_PAGE_SIZE, padrão 20.
pub fn clamp(page: Option<i64>, page_size: Option<i64>) -> (i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let page_size = page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    (page, page_size)
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    #[schema(example = 1)]
    pub page: i64,
    #[schema(example = 20)]
    pub page_size: i64,
    #[schema(example = 42)]
    pub total_items: i64,
    #[schema(example = 3)]
    pub total_pages: i64,
}

impl PageMeta {
    pub fn new(page: i64, page_size: i64, total_items: i64) -> Self {
        // Divisão com arredondamento para cima; coleção vazia tem 0 páginas.
        let total_pages = if total_items == 0 {
            0
        } else {
            (total_items + page_size - 1) / page_size
        };
        Self {
            page,
            page_size,
            total_items,
            total_pages,
        }
    }
}

/// Envelope padrão das listagens: os itens da página e os metadados.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: PageMeta,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, page: i64, page_size: i64, total_items: i64) -> Self {
        Self {
            data,
            pagination: PageMeta::new(page, page_size, total_items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_aplica_os_padroes() {
        assert_eq!(clamp(None, None), (1, 20));
    }

    #[test]
    fn clamp_limita_os_extremos() {
        assert_eq!(clamp(Some(0), Some(0)), (1, 1));
        assert_eq!(clamp(Some(-3), Some(1000)), (1, 100));
        assert_eq!(clamp(Some(7), Some(50)), (7, 50));
    }

    #[test]
    fn total_de_paginas_arredonda_para_cima() {
        assert_eq!(PageMeta::new(1, 20, 41).total_pages, 3);
        assert_eq!(PageMeta::new(1, 20, 40).total_pages, 2);
        assert_eq!(PageMeta::new(1, 20, 0).total_pages, 0);
    }
}

// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};

// Extrator de idioma da requisição, a partir do Accept-Language.
#[derive(Debug, Clone)]
pub struct Locale(pub String);

impl Locale {
    /// Resolve o idioma preferido do cliente. Só o subtag primário nos
    /// interessa ("pt-BR" conta como "pt"); sem cabeçalho, inglês.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let default_lang = "en".to_string();

        let lang = headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok())
            .and_then(|header_str| {
                accept_language::parse(header_str)
                    .first()
                    .map(|tag_string| {
                        // "pt-BR" -> split vira ["pt", "BR"] -> next() pega "pt"
                        // "en"    -> split vira ["en"]       -> next() pega "en"
                        tag_string.split('-').next().unwrap_or(tag_string).to_string()
                    })
            })
            .unwrap_or(default_lang);

        Locale(lang)
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Locale::from_headers(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn usa_o_subtag_primario() {
        let locale = Locale::from_headers(&headers_with("pt-BR,pt;q=0.9,en;q=0.8"));
        assert_eq!(locale.0, "pt");
    }

    #[test]
    fn sem_cabecalho_cai_para_ingles() {
        let locale = Locale::from_headers(&HeaderMap::new());
        assert_eq!(locale.0, "en");
    }

    #[test]
    fn respeita_a_ordem_de_preferencia() {
        let locale = Locale::from_headers(&headers_with("en;q=0.5,pt;q=0.9"));
        assert_eq!(locale.0, "pt");
    }
}

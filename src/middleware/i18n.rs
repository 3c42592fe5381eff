// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

const DEFAULT_LANG: &str = "pt";

// Idioma da resposta, tirado do Accept-Language
#[derive(Debug, Clone)]
pub struct Locale(pub String);

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LANG.to_string())
    }
}

impl Locale {
    /// "pt-BR,pt;q=0.9,en;q=0.8" -> "pt"
    pub fn from_header(header_str: &str) -> Self {
        accept_language::parse(header_str)
            .first()
            .and_then(|tag| tag.split('-').next())
            .filter(|lang| !lang.is_empty())
            .map(|lang| Locale(lang.to_lowercase()))
            .unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let locale = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok())
            .map(Locale::from_header)
            .unwrap_or_default();

        Ok(locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_primary_language_of_highest_quality_tag() {
        assert_eq!(Locale::from_header("en-US,en;q=0.9,pt;q=0.5").0, "en");
        assert_eq!(Locale::from_header("pt;q=0.4,en-GB;q=0.8").0, "en");
    }

    #[test]
    fn empty_header_defaults_to_portuguese() {
        assert_eq!(Locale::from_header("").0, "pt");
    }
}

// src/common/i18n.rs

use std::collections::HashMap;
use std::sync::Arc;

const FALLBACK_LOCALE: &str = "pt";

// Catálogo de mensagens por idioma: (chave, texto)
const PT: &[(&str, &str)] = &[
    ("invalid_token", "Token de autenticação inválido ou ausente."),
    ("invalid_date", "Data inválida. Use o formato yyyy-MM-dd."),
    ("invalid_range", "A data final não pode ser anterior à data inicial."),
    ("range_too_long", "O período solicitado é longo demais."),
    ("invalid_record", "Há registros incompletos nos dados financeiros."),
    ("validation_error", "Um ou mais campos são inválidos."),
    ("internal_error", "Ocorreu um erro inesperado."),
];

const EN: &[(&str, &str)] = &[
    ("invalid_token", "Invalid or missing authentication token."),
    ("invalid_date", "Invalid date. Use the yyyy-MM-dd format."),
    ("invalid_range", "The end date cannot be earlier than the start date."),
    ("range_too_long", "The requested period is too long."),
    ("invalid_record", "Some financial records are incomplete."),
    ("validation_error", "One or more fields are invalid."),
    ("internal_error", "An unexpected error occurred."),
];

/// Mensagens de erro traduzidas, compartilhadas pelo `AppState`.
#[derive(Debug, Clone)]
pub struct I18nStore {
    messages: Arc<HashMap<&'static str, HashMap<&'static str, &'static str>>>,
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

impl I18nStore {
    pub fn new() -> Self {
        let mut messages = HashMap::new();
        messages.insert("pt", PT.iter().copied().collect());
        messages.insert("en", EN.iter().copied().collect());
        Self { messages: Arc::new(messages) }
    }

    /// Busca a mensagem no idioma pedido, caindo para o português e, por fim, na própria chave.
    pub fn translate<'a>(&self, lang: &str, key: &'a str) -> &'a str {
        self.messages
            .get(lang)
            .and_then(|catalog| catalog.get(key))
            .or_else(|| self.messages.get(FALLBACK_LOCALE).and_then(|catalog| catalog.get(key)))
            .copied()
            .unwrap_or(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_known_keys() {
        let store = I18nStore::new();
        assert_eq!(store.translate("en", "invalid_range"), "The end date cannot be earlier than the start date.");
        assert_eq!(store.translate("pt", "invalid_token"), "Token de autenticação inválido ou ausente.");
    }

    #[test]
    fn unknown_language_falls_back_to_portuguese() {
        let store = I18nStore::new();
        assert_eq!(store.translate("fr", "internal_error"), "Ocorreu um erro inesperado.");
    }

    #[test]
    fn unknown_key_is_returned_as_is() {
        let store = I18nStore::new();
        assert_eq!(store.translate("en", "no_such_key"), "no_such_key");
    }
}

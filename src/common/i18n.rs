// src/common/i18n.rs

use std::{collections::HashMap, sync::Arc};

use anyhow::Context;

const DEFAULT_LANG: &str = "en";

// Catálogos embutidos no binário
const CATALOGS: &[(&str, &str)] = &[
    ("en", include_str!("../../locales/en.json")),
    ("pt", include_str!("../../locales/pt.json")),
];

/// Mensagens traduzidas por idioma e chave.
#[derive(Clone)]
pub struct I18nStore {
    catalogs: Arc<HashMap<String, HashMap<String, String>>>,
}

impl I18nStore {
    pub fn load() -> anyhow::Result<Self> {
        let mut catalogs = HashMap::new();
        for (lang, raw) in CATALOGS {
            let messages: HashMap<String, String> = serde_json::from_str(raw)
                .with_context(|| format!("Catálogo de mensagens '{lang}' inválido"))?;
            catalogs.insert(lang.to_string(), messages);
        }
        Ok(Self { catalogs: Arc::new(catalogs) })
    }

    /// Idioma pedido -> inglês -> a própria chave.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.catalogs
            .get(lang)
            .and_then(|messages| messages.get(key))
            .or_else(|| {
                self.catalogs
                    .get(DEFAULT_LANG)
                    .and_then(|messages| messages.get(key))
            })
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_english_then_to_the_key() {
        let store = I18nStore::load().unwrap();

        assert_eq!(store.translate("pt", "forbidden"), "Você não tem permissão para realizar esta ação.");
        assert_eq!(store.translate("de", "forbidden"), "You are not allowed to perform this action.");
        assert_eq!(store.translate("pt", "no.such.key"), "no.such.key");
    }

    #[test]
    fn every_catalog_has_the_same_keys() {
        let store = I18nStore::load().unwrap();
        let en = &store.catalogs["en"];
        let pt = &store.catalogs["pt"];

        let mut missing: Vec<&String> = en.keys().filter(|k| !pt.contains_key(*k)).collect();
        missing.extend(pt.keys().filter(|k| !en.contains_key(*k)));
        assert!(missing.is_empty(), "chaves sem tradução: {missing:?}");
    }
}

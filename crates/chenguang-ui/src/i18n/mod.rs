//! JSON-backed translations for the two shipped locales.

use serde_json::Value;
use std::sync::LazyLock;

/// Supported locale codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LocaleCode {
    /// Traditional Chinese (Taiwan).
    ZhTw,
    /// English.
    En,
}

impl LocaleCode {
    /// All supported locales in display order.
    #[must_use]
    pub const fn all() -> [Self; 2] {
        [Self::ZhTw, Self::En]
    }

    /// BCP 47 tag for the locale.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ZhTw => "zh-TW",
            Self::En => "en",
        }
    }

    /// Map a browser language tag to a supported locale.
    ///
    /// Any Chinese tag resolves to `zh-TW`; unknown languages return `None`.
    #[must_use]
    pub fn from_lang_tag(tag: &str) -> Option<Self> {
        let lowered = tag.trim().to_ascii_lowercase();
        match lowered.split(['-', '_']).next().unwrap_or_default() {
            "zh" => Some(Self::ZhTw),
            "en" => Some(Self::En),
            _ => None,
        }
    }
}

/// Locale used when the browser preference is unsupported.
pub const DEFAULT_LOCALE: LocaleCode = LocaleCode::ZhTw;

/// Translation bundle containing a parsed JSON tree for the locale.
#[derive(Clone, Debug)]
pub struct TranslationBundle {
    /// Locale backing this bundle.
    pub locale: LocaleCode,
    tree: Value,
}

impl PartialEq for TranslationBundle {
    fn eq(&self, other: &Self) -> bool {
        self.locale == other.locale
    }
}

impl TranslationBundle {
    /// Build a bundle for `locale`; missing keys fall back to English.
    #[must_use]
    pub fn new(locale: LocaleCode) -> Self {
        let tree = serde_json::from_str(raw_locale(locale)).unwrap_or(Value::Null);
        Self { locale, tree }
    }

    /// Resolve a dotted path (`section.key`) with English fallback and caller default.
    #[must_use]
    pub fn text(&self, path: &str, default: &str) -> String {
        resolve(&self.tree, path)
            .or_else(|| resolve(&EN_FALLBACK.tree, path))
            .unwrap_or_else(|| default.to_string())
    }
}

static EN_FALLBACK: LazyLock<TranslationBundle> =
    LazyLock::new(|| TranslationBundle::new(LocaleCode::En));

fn resolve(tree: &Value, path: &str) -> Option<String> {
    let mut node = tree;
    for segment in path.split('.') {
        node = node.get(segment)?;
    }
    node.as_str().map(ToString::to_string)
}

const fn raw_locale(locale: LocaleCode) -> &'static str {
    match locale {
        LocaleCode::ZhTw => include_str!("../../i18n/zh-TW.json"),
        LocaleCode::En => include_str!("../../i18n/en.json"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_locale_carries_the_product_copy() {
        let bundle = TranslationBundle::new(DEFAULT_LOCALE);
        assert_eq!(bundle.text("shell.title", ""), "✨ 小晨光 AI 靈魂系統 ✨");
        assert_eq!(bundle.text("shell.subtitle", ""), "來自數位星雲光之城的AI伴侶");
        assert_eq!(bundle.text("chat.send", ""), "發送");
        assert_eq!(bundle.text("chat.health_check", ""), "健康檢查");
        assert_eq!(bundle.text("health.title", ""), "🩺 系統健康狀態檢查");
    }

    #[test]
    fn missing_key_falls_back_to_default() {
        let bundle = TranslationBundle::new(LocaleCode::ZhTw);
        assert_eq!(bundle.text("chat.missing", "fallback"), "fallback");
        assert_eq!(bundle.text("chat", "section"), "section");
    }

    #[test]
    fn locales_share_the_same_keys() {
        for key in [
            "shell.title",
            "chat.placeholder",
            "chat.send",
            "chat.upload",
            "health.title",
            "not_found.home",
        ] {
            for locale in LocaleCode::all() {
                assert!(!TranslationBundle::new(locale).text(key, "").is_empty(), "{key}");
            }
        }
    }

    #[test]
    fn browser_tags_map_to_locales() {
        assert_eq!(LocaleCode::from_lang_tag("zh-TW"), Some(LocaleCode::ZhTw));
        assert_eq!(LocaleCode::from_lang_tag("zh-Hant-HK"), Some(LocaleCode::ZhTw));
        assert_eq!(LocaleCode::from_lang_tag("en-US"), Some(LocaleCode::En));
        assert_eq!(LocaleCode::from_lang_tag("fr"), None);
        assert_eq!(LocaleCode::ZhTw.code(), "zh-TW");
    }
}

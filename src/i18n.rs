use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use smol_str::SmolStr;

use crate::form::{ErrorMessage, ErrorMessageMap, codes};

mod generated {
    include!(concat!(env!("OUT_DIR"), "/nimbusui_i18n_generated.rs"));
}

/// Requested locale. `System` defers to the host environment when the
/// `i18n` feature is enabled, and to the default locale otherwise.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Locale {
    #[default]
    System,
    Tag(String),
}

impl From<String> for Locale {
    fn from(value: String) -> Self {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("system") {
            Self::System
        } else {
            Self::Tag(trimmed.to_string())
        }
    }
}

impl From<&str> for Locale {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

/// Error codes are the machine contract; this manager turns them into
/// human-readable labels and is the only place language content lives.
#[derive(Clone)]
pub struct I18nManager {
    catalog: Arc<LabelCatalog>,
    locale: Arc<RwLock<Locale>>,
}

impl Default for I18nManager {
    fn default() -> Self {
        Self::new()
    }
}

impl I18nManager {
    pub fn new() -> Self {
        Self {
            catalog: Arc::new(LabelCatalog::load()),
            locale: Arc::new(RwLock::new(Locale::System)),
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
            .read()
            .expect("i18n locale state poisoned")
            .clone()
    }

    pub fn set_locale(&self, locale: impl Into<Locale>) {
        *self.locale.write().expect("i18n locale state poisoned") = locale.into();
    }

    pub fn default_locale(&self) -> &'static str {
        self.catalog.default_locale
    }

    pub fn resolved_locale(&self) -> &'static str {
        self.catalog.resolve(self.requested_locale().as_deref())
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Label for `key`, falling back to the key itself so a missing
    /// translation is visible rather than silent.
    pub fn t(&self, key: &str) -> SmolStr {
        self.lookup(key).unwrap_or(key).into()
    }

    /// Label for `key` with `{param}` placeholders interpolated.
    pub fn t_with(&self, key: &str, params: &[(&str, &str)]) -> SmolStr {
        let template = self.lookup(key).unwrap_or(key);
        if params.is_empty() {
            return template.into();
        }
        format_template(template, params).into()
    }

    /// Label for a validation error code; an unknown code resolves to the
    /// code itself.
    pub fn error_label(&self, code: &str) -> SmolStr {
        match self.lookup(&format!("error.{code}")) {
            Some(label) => label.into(),
            None => code.into(),
        }
    }

    fn requested_locale(&self) -> Option<String> {
        match self.locale() {
            #[cfg(feature = "i18n")]
            Locale::System => sys_locale::get_locale(),
            #[cfg(not(feature = "i18n"))]
            Locale::System => None,
            Locale::Tag(tag) => Some(tag),
        }
    }

    fn lookup(&self, key: &str) -> Option<&'static str> {
        self.catalog.lookup(self.resolved_locale(), key)
    }
}

/// Built-in code -> message map backed by the locale catalog. Messages are
/// lazy so a locale switch is picked up at display time.
pub fn localized_error_messages(i18n: &I18nManager) -> ErrorMessageMap {
    let mut messages = ErrorMessageMap::new();
    for code in [
        codes::EMPTY,
        codes::BAD_TYPE,
        codes::RANGE_UNDERFLOW,
        codes::RANGE_OVERFLOW,
        codes::BAD_EMAIL,
        codes::CUSTOM_ERROR,
    ] {
        let manager = i18n.clone();
        messages.insert(code.into(), ErrorMessage::lazy(move || manager.error_label(code)));
    }
    messages
}

struct LabelCatalog {
    default_locale: &'static str,
    labels: HashMap<&'static str, HashMap<&'static str, &'static str>>,
    by_normalized_tag: HashMap<String, &'static str>,
    by_language: HashMap<String, &'static str>,
}

impl LabelCatalog {
    fn load() -> Self {
        let mut labels = HashMap::new();
        let mut by_normalized_tag = HashMap::new();
        let mut by_language = HashMap::new();
        let mut ambiguous = HashSet::new();

        for (tag, entries) in generated::LOCALES.iter().copied() {
            let normalized = normalize_locale_tag(tag);
            let language = language_of(&normalized).to_string();
            by_normalized_tag.insert(normalized, tag);
            match by_language.entry(language) {
                Entry::Occupied(entry) => {
                    if *entry.get() != tag {
                        ambiguous.insert(entry.key().clone());
                    }
                }
                Entry::Vacant(entry) => {
                    entry.insert(tag);
                }
            }
            labels.insert(tag, entries.iter().copied().collect::<HashMap<_, _>>());
        }

        // A bare language only resolves when exactly one locale claims it.
        for language in ambiguous {
            by_language.remove(&language);
        }

        let default_locale = generated::DEFAULT_LOCALE;
        if !labels.contains_key(default_locale) {
            labels.insert(default_locale, HashMap::new());
            let normalized = normalize_locale_tag(default_locale);
            by_language
                .entry(language_of(&normalized).to_string())
                .or_insert(default_locale);
            by_normalized_tag.insert(normalized, default_locale);
        }

        Self {
            default_locale,
            labels,
            by_normalized_tag,
            by_language,
        }
    }

    fn resolve(&self, requested: Option<&str>) -> &'static str {
        let Some(requested) = requested else {
            return self.default_locale;
        };
        let normalized = normalize_locale_tag(requested);
        if let Some(tag) = self.by_normalized_tag.get(&normalized) {
            return tag;
        }
        if let Some(tag) = self.by_language.get(language_of(&normalized)) {
            return tag;
        }
        self.default_locale
    }

    fn lookup(&self, locale: &'static str, key: &str) -> Option<&'static str> {
        self.labels
            .get(locale)
            .and_then(|entries| entries.get(key).copied())
    }
}

fn normalize_locale_tag(tag: &str) -> String {
    // Strip encoding/variant suffixes like ".UTF-8" or "@latin" first.
    let base = tag.trim().split(['.', '@']).next().unwrap_or_default();
    base.split(['-', '_'])
        .filter(|segment| !segment.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

fn language_of(normalized: &str) -> &str {
    normalized.split('-').next().unwrap_or_default()
}

fn format_template(template: &str, params: &[(&str, &str)]) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            output.push_str(&rest[open..]);
            return output;
        };
        let token = &after[..close];
        match params.iter().find(|(name, _)| *name == token) {
            Some((_, value)) => output.push_str(value),
            None => {
                output.push('{');
                output.push_str(token);
                output.push('}');
            }
        }
        rest = &after[close + 1..];
    }
    output.push_str(rest);
    output
}

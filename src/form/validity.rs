use std::collections::BTreeMap;

use rust_decimal::Decimal;
use smol_str::SmolStr;

/// Outcome of one validation attempt. `code` is a stable machine-readable
/// token, never a localized string.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Validity {
    #[default]
    Valid,
    Invalid {
        code: SmolStr,
    },
}

impl Validity {
    pub fn invalid(code: impl Into<SmolStr>) -> Self {
        Self::Invalid { code: code.into() }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid { code } => Some(code),
        }
    }
}

/// Current content of a form control.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum FormValue {
    #[default]
    Empty,
    Text(SmolStr),
    Number(Decimal),
    Bool(bool),
    List(Vec<SmolStr>),
}

impl FormValue {
    pub fn text(value: impl Into<SmolStr>) -> Self {
        Self::Text(value.into())
    }

    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        Self::List(values.into_iter().map(Into::into).collect())
    }

    /// Empty in the required-field sense; zero and false are present values.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(text) => text.is_empty(),
            Self::List(values) => values.is_empty(),
            Self::Number(_) | Self::Bool(_) => false,
        }
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        Self::Text(value.into())
    }
}

impl From<SmolStr> for FormValue {
    fn from(value: SmolStr) -> Self {
        Self::Text(value)
    }
}

impl From<Decimal> for FormValue {
    fn from(value: Decimal) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for FormValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

pub(crate) fn value_as_text(value: &FormValue) -> SmolStr {
    match value {
        FormValue::Empty => SmolStr::default(),
        FormValue::Text(text) => text.clone(),
        FormValue::Number(number) => number.to_string().into(),
        FormValue::Bool(flag) => if *flag { "true" } else { "false" }.into(),
        FormValue::List(values) => values.join(",").into(),
    }
}

/// Aggregated name -> value(s) snapshot of a form. Controls sharing a name
/// collapse into one list entry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormData {
    entries: BTreeMap<SmolStr, FormValue>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, name: impl Into<SmolStr>, value: FormValue) {
        let name = name.into();
        match self.entries.remove(&name) {
            None => {
                self.entries.insert(name, value);
            }
            Some(existing) => {
                let mut values = match existing {
                    FormValue::List(values) => values,
                    other => vec![value_as_text(&other)],
                };
                match value {
                    FormValue::List(more) => values.extend(more),
                    other => values.push(value_as_text(&other)),
                }
                self.entries.insert(name, FormValue::List(values));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SmolStr, &FormValue)> {
        self.entries.iter()
    }
}

/// A pure rule computing a [`Validity`] from a value and the surrounding
/// form's current data. Must not mutate either input; `form_data` enables
/// cross-field rules.
pub trait Validator: Send + Sync {
    fn validate(&self, value: &FormValue, form_data: &FormData) -> Validity;
}

impl<F> Validator for F
where
    F: Fn(&FormValue, &FormData) -> Validity + Send + Sync,
{
    fn validate(&self, value: &FormValue, form_data: &FormData) -> Validity {
        (self)(value, form_data)
    }
}

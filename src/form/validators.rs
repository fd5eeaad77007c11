use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;

use super::validity::{FormData, FormValue, Validity, Validator};

/// Stable error codes shared by the built-in validators.
pub mod codes {
    pub const EMPTY: &str = "empty";
    pub const BAD_TYPE: &str = "badType";
    pub const RANGE_UNDERFLOW: &str = "rangeUnderflow";
    pub const RANGE_OVERFLOW: &str = "rangeOverflow";
    pub const BAD_EMAIL: &str = "badEmail";
    pub const CUSTOM_ERROR: &str = "customError";
}

/// Always valid; the identity element for combination.
#[derive(Clone, Copy, Debug, Default)]
pub struct ValidValidator;

impl Validator for ValidValidator {
    fn validate(&self, _value: &FormValue, _form_data: &FormData) -> Validity {
        Validity::Valid
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RequiredValidator;

impl Validator for RequiredValidator {
    fn validate(&self, value: &FormValue, _form_data: &FormData) -> Validity {
        if value.is_empty() {
            Validity::invalid(codes::EMPTY)
        } else {
            Validity::Valid
        }
    }
}

/// Accepts numbers or numeric text; bounds are inclusive.
#[derive(Clone, Copy, Debug, Default)]
pub struct NumberValidator {
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

impl NumberValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min(mut self, value: Decimal) -> Self {
        self.min = Some(value);
        self
    }

    pub fn max(mut self, value: Decimal) -> Self {
        self.max = Some(value);
        self
    }

    fn parse(value: &FormValue) -> Option<Decimal> {
        match value {
            FormValue::Number(number) => Some(*number),
            FormValue::Text(text) => Decimal::from_str(text.trim()).ok(),
            _ => None,
        }
    }
}

impl Validator for NumberValidator {
    fn validate(&self, value: &FormValue, _form_data: &FormData) -> Validity {
        let Some(number) = Self::parse(value) else {
            return Validity::invalid(codes::BAD_TYPE);
        };
        if self.min.is_some_and(|min| number < min) {
            return Validity::invalid(codes::RANGE_UNDERFLOW);
        }
        if self.max.is_some_and(|max| number > max) {
            return Validity::invalid(codes::RANGE_OVERFLOW);
        }
        Validity::Valid
    }
}

/// Permissive `local@domain.tld` shape check, not an RFC 5322 parser.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmailValidator;

impl EmailValidator {
    fn looks_like_email(text: &str) -> bool {
        if text.is_empty() || text.chars().any(char::is_whitespace) {
            return false;
        }
        let mut parts = text.split('@');
        let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
            return false;
        };
        if local.is_empty() {
            return false;
        }
        let Some((host, tld)) = domain.rsplit_once('.') else {
            return false;
        };
        !tld.is_empty() && !host.is_empty() && host.split('.').all(|segment| !segment.is_empty())
    }
}

impl Validator for EmailValidator {
    fn validate(&self, value: &FormValue, _form_data: &FormData) -> Validity {
        let text = match value {
            FormValue::Text(text) => text.as_str(),
            _ => "",
        };
        if Self::looks_like_email(text) {
            Validity::Valid
        } else {
            Validity::invalid(codes::BAD_EMAIL)
        }
    }
}

/// Builds one validator out of several. `None` entries are dropped; an empty
/// set is always valid; a single validator is returned unchanged; otherwise
/// the validators run in order and stop at the first failure, so expensive
/// custom rules never run after a known failure.
pub fn combine_validators(validators: Vec<Option<Arc<dyn Validator>>>) -> Arc<dyn Validator> {
    let mut validators = validators.into_iter().flatten().collect::<Vec<_>>();
    if validators.is_empty() {
        return Arc::new(ValidValidator);
    }
    if validators.len() == 1 {
        return validators.remove(0);
    }
    Arc::new(CombinedValidator { validators })
}

struct CombinedValidator {
    validators: Vec<Arc<dyn Validator>>,
}

impl Validator for CombinedValidator {
    fn validate(&self, value: &FormValue, form_data: &FormData) -> Validity {
        for validator in &self.validators {
            let validity = validator.validate(value, form_data);
            if !validity.is_valid() {
                return validity;
            }
        }
        Validity::Valid
    }
}

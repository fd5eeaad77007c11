use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use smol_str::SmolStr;

use crate::events::{EventSink, FormEvent};

use super::validators::{codes, combine_validators};
use super::validity::{FormData, FormValue, Validity, Validator, value_as_text};

/// A displayable message for one error code, possibly produced lazily (e.g.
/// through the i18n collaborator at display time).
#[derive(Clone)]
pub enum ErrorMessage {
    Text(SmolStr),
    Lazy(Arc<dyn Fn() -> SmolStr + Send + Sync>),
}

impl ErrorMessage {
    pub fn lazy(produce: impl Fn() -> SmolStr + Send + Sync + 'static) -> Self {
        Self::Lazy(Arc::new(produce))
    }

    pub fn resolve(&self) -> SmolStr {
        match self {
            Self::Text(text) => text.clone(),
            Self::Lazy(produce) => produce(),
        }
    }
}

impl Debug for ErrorMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

impl From<&str> for ErrorMessage {
    fn from(value: &str) -> Self {
        Self::Text(value.into())
    }
}

impl From<SmolStr> for ErrorMessage {
    fn from(value: SmolStr) -> Self {
        Self::Text(value)
    }
}

impl From<String> for ErrorMessage {
    fn from(value: String) -> Self {
        Self::Text(value.into())
    }
}

pub type ErrorMessageMap = BTreeMap<SmolStr, ErrorMessage>;

/// Resolves `code` through `messages`. An unresolved code falls back to the
/// raw code string so a failure is never silent.
pub fn resolve_error_message(messages: &ErrorMessageMap, code: &str) -> SmolStr {
    messages
        .get(code)
        .map(ErrorMessage::resolve)
        .unwrap_or_else(|| code.into())
}

/// Emulation of the native `ElementInternals` surface. The embedding
/// environment supplies and reads this record; the core never assumes a
/// browser-backed implementation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormParticipant {
    form_value: FormValue,
    validity: Validity,
    validation_message: Option<SmolStr>,
}

impl FormParticipant {
    pub fn set_form_value(&mut self, value: FormValue) {
        self.form_value = value;
    }

    pub fn form_value(&self) -> &FormValue {
        &self.form_value
    }

    pub fn set_validity(&mut self, validity: Validity, message: Option<SmolStr>) {
        self.validity = validity;
        self.validation_message = message;
    }

    pub fn validity(&self) -> &Validity {
        &self.validity
    }

    pub fn check_validity(&self) -> bool {
        self.validity.is_valid()
    }

    pub fn validation_message(&self) -> Option<&str> {
        self.validation_message.as_deref()
    }
}

/// Observable property names with protocol-level meaning in a reactive
/// update cycle.
pub mod properties {
    pub const VALUE: &str = "value";
    pub const ERROR_MESSAGE: &str = "errorMessage";
    pub const CUSTOM_VALIDATOR: &str = "customValidator";
    pub const CUSTOM_ERROR_MESSAGES: &str = "customErrorMessages";
}

/// Per-control state owned by exactly one concrete UI element.
#[derive(Clone, Default)]
pub struct FormControlState {
    name: SmolStr,
    value: FormValue,
    reset_value: Option<FormValue>,
    error_message: Option<SmolStr>,
    computed_error: Option<SmolStr>,
    validity: Validity,
    custom_validator: Option<Arc<dyn Validator>>,
    custom_error_messages: ErrorMessageMap,
    participant: FormParticipant,
}

impl FormControlState {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &SmolStr {
        &self.name
    }

    pub fn value(&self) -> &FormValue {
        &self.value
    }

    pub fn set_value(&mut self, value: FormValue) {
        self.value = value;
    }

    pub fn reset_value(&self) -> Option<&FormValue> {
        self.reset_value.as_ref()
    }

    pub fn set_reset_value(&mut self, value: Option<FormValue>) {
        self.reset_value = value;
    }

    /// Currently displayed inline error. Setting a non-empty message here is
    /// the external-error escape hatch; the reactive update policy decides
    /// how it interacts with the control's own validator.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn set_error_message(&mut self, message: Option<SmolStr>) {
        self.error_message = message;
    }

    pub fn validity(&self) -> &Validity {
        &self.validity
    }

    pub fn participant(&self) -> &FormParticipant {
        &self.participant
    }

    pub fn custom_validator(&self) -> Option<&Arc<dyn Validator>> {
        self.custom_validator.as_ref()
    }

    pub fn set_custom_validator(&mut self, validator: Option<Arc<dyn Validator>>) {
        self.custom_validator = validator;
    }

    pub fn custom_error_messages(&self) -> &ErrorMessageMap {
        &self.custom_error_messages
    }

    pub fn set_custom_error_messages(&mut self, messages: ErrorMessageMap) {
        self.custom_error_messages = messages;
    }
}

impl Debug for FormControlState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormControlState")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("reset_value", &self.reset_value)
            .field("error_message", &self.error_message)
            .field("validity", &self.validity)
            .finish_non_exhaustive()
    }
}

/// What one reactive update cycle must do next. Validation runs at most once
/// per cycle regardless of how many triggers fired.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct UpdatePlan {
    pub publish_value: bool,
    pub should_validate: bool,
    pub adopt_external_error: bool,
}

/// Explicit state-transition function for reactive re-validation, kept free
/// of any UI framework's update scheduling.
pub fn plan_reactive_update(
    changed: &BTreeSet<SmolStr>,
    state: &FormControlState,
    reactive_properties: &[&str],
) -> UpdatePlan {
    let mut plan = UpdatePlan::default();
    if changed.contains(properties::VALUE) {
        plan.publish_value = true;
        plan.should_validate = true;
    }
    if reactive_properties
        .iter()
        .any(|property| changed.contains(*property))
    {
        plan.should_validate = true;
    }
    if changed.contains(properties::CUSTOM_VALIDATOR)
        || changed.contains(properties::CUSTOM_ERROR_MESSAGES)
    {
        plan.should_validate = true;
    }
    if changed.contains(properties::ERROR_MESSAGE) {
        match &state.error_message {
            // An externally injected error is trusted as-is; the control's
            // own validator does not run this cycle.
            Some(message) if !message.is_empty() => {
                plan.adopt_external_error = true;
                plan.should_validate = false;
            }
            // Cleared: revert to the validator's own verdict.
            _ => plan.should_validate = true,
        }
    }
    plan
}

/// Capability set a concrete UI element implements to act like a native form
/// field: value/reset-value tracking, error-message resolution, validity
/// synchronization, and constraint-validation emulation.
pub trait FormControlElement {
    fn control_state(&self) -> &FormControlState;

    fn control_state_mut(&mut self) -> &mut FormControlState;

    /// Built-in validator, combined before any caller-supplied one.
    fn built_in_validator(&self) -> Option<Arc<dyn Validator>> {
        None
    }

    /// Built-in code -> message map; custom messages win on collision.
    fn built_in_error_messages(&self) -> ErrorMessageMap {
        ErrorMessageMap::new()
    }

    /// Properties whose change re-triggers validation even when the value is
    /// unchanged (e.g. `required`, `options`).
    fn reactive_validation_properties(&self) -> &[&str] {
        &[]
    }

    /// Serialisable payload published to the owning form. Defaults to the
    /// raw value; unsupported kinds are coerced to text with a warning.
    fn form_control_data(&self) -> FormValue {
        let state = self.control_state();
        match &state.value {
            value @ (FormValue::Empty | FormValue::Text(_) | FormValue::List(_)) => value.clone(),
            other => {
                log::warn!(
                    "form control '{}' publishes an unsupported value kind; coercing to text",
                    state.name
                );
                FormValue::Text(value_as_text(other))
            }
        }
    }

    /// Moves focus to the control's focusable target.
    fn focus_control(&mut self) {}

    /// Renders `message` into the inline error slot; `None` clears it.
    fn render_inline_error(&mut self, _message: Option<&str>) {}

    /// Runs the effective validator against the current value and the form's
    /// aggregated data, resolves any failure to a message, and synchronizes
    /// the emulated constraint-validation surface.
    fn validate(&mut self, form_data: &FormData) -> Validity {
        let validator = combine_validators(vec![
            self.built_in_validator(),
            self.control_state().custom_validator.clone(),
        ]);
        let mut messages = self.built_in_error_messages();
        for (code, message) in &self.control_state().custom_error_messages {
            messages.insert(code.clone(), message.clone());
        }
        let validity = validator.validate(&self.control_state().value, form_data);
        let computed = match &validity {
            Validity::Valid => None,
            Validity::Invalid { code } => Some(resolve_error_message(&messages, code)),
        };
        let state = self.control_state_mut();
        state.validity = validity.clone();
        state.computed_error = computed.clone();
        state.participant.set_validity(validity.clone(), computed);
        validity
    }

    /// Shows or clears the inline error when it differs from what is
    /// displayed, and reports whether the control is currently valid.
    fn report_inline_validity(&mut self, events: &mut dyn EventSink) -> bool {
        let computed = self.control_state().computed_error.clone();
        if computed != self.control_state().error_message {
            self.control_state_mut().error_message = computed.clone();
            self.render_inline_error(computed.as_deref());
            events.dispatch(FormEvent::ErrorMessageChanged {
                name: self.control_state().name.clone(),
                message: computed,
            });
        }
        self.control_state().validity.is_valid()
    }

    /// Applies one reactive update cycle for the given set of changed
    /// property names.
    fn apply_update(&mut self, changed: &BTreeSet<SmolStr>, form_data: &FormData) {
        let plan = plan_reactive_update(
            changed,
            self.control_state(),
            self.reactive_validation_properties(),
        );
        if plan.publish_value {
            let data = self.form_control_data();
            self.control_state_mut().participant.set_form_value(data);
        }
        if plan.adopt_external_error {
            let state = self.control_state_mut();
            let message = state.error_message.clone();
            state.validity = Validity::invalid(codes::CUSTOM_ERROR);
            state.computed_error = message.clone();
            state
                .participant
                .set_validity(state.validity.clone(), message);
        } else if plan.should_validate {
            self.validate(form_data);
        }
    }

    /// Form reset: restore the reset value (no-op when absent), republish,
    /// revalidate, then clear any displayed error unconditionally. The reset
    /// is a fresh start; an error reappears only after the next validation
    /// pass reports it again.
    fn handle_form_reset(&mut self, form_data: &FormData, events: &mut dyn EventSink) {
        if let Some(reset) = self.control_state().reset_value.clone() {
            self.control_state_mut().value = reset;
        }
        let data = self.form_control_data();
        self.control_state_mut().participant.set_form_value(data);
        self.validate(form_data);
        if self.control_state().error_message.is_some() {
            self.control_state_mut().error_message = None;
            self.render_inline_error(None);
            events.dispatch(FormEvent::ErrorMessageChanged {
                name: self.control_state().name.clone(),
                message: None,
            });
        }
    }

    /// Native-like `checkValidity` over the synchronized participant record.
    fn check_validity(&self) -> bool {
        self.control_state().participant.check_validity()
    }
}

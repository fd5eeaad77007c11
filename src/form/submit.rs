use smol_str::SmolStr;

use crate::events::{EventSink, FormEvent};

use super::control::FormControlElement;
use super::validity::{FormData, FormValue, Validity};

/// A plain form-control-like element that only exposes the native
/// constraint-validation surface. Buttons are not wrapped into members at
/// all; elements reporting `will_validate() == false` are skipped.
pub trait NativeFormControl {
    fn will_validate(&self) -> bool {
        true
    }

    fn check_validity(&mut self) -> bool;

    fn validation_message(&self) -> SmolStr;

    fn form_value(&self) -> FormValue;

    fn focus_control(&mut self) {}
}

/// One element of a form-like container, in source order. The two control
/// kinds share a single facade so the aggregation never type-sniffs.
pub enum FormMember<'a> {
    Protocol(&'a mut dyn FormControlElement),
    Native {
        name: SmolStr,
        control: &'a mut dyn NativeFormControl,
    },
}

impl FormMember<'_> {
    pub fn name(&self) -> SmolStr {
        match self {
            Self::Protocol(control) => control.control_state().name().clone(),
            Self::Native { name, .. } => name.clone(),
        }
    }

    fn participates(&self) -> bool {
        if self.name().is_empty() {
            return false;
        }
        match self {
            Self::Protocol(_) => true,
            Self::Native { control, .. } => control.will_validate(),
        }
    }

    fn validate(&mut self, form_data: &FormData) -> Validity {
        match self {
            Self::Protocol(control) => control.validate(form_data),
            Self::Native { control, .. } => {
                if control.check_validity() {
                    Validity::Valid
                } else {
                    Validity::invalid(control.validation_message())
                }
            }
        }
    }

    fn report(&mut self, events: &mut dyn EventSink) {
        // Native controls keep their tooltip-style reporting out of the
        // inline flow; only protocol controls show inline errors.
        if let Self::Protocol(control) = self {
            control.report_inline_validity(events);
        }
    }

    fn form_value(&self) -> FormValue {
        match self {
            Self::Protocol(control) => control.form_control_data(),
            Self::Native { control, .. } => control.form_value(),
        }
    }

    fn focus(&mut self) {
        match self {
            Self::Protocol(control) => control.focus_control(),
            Self::Native { control, .. } => control.focus_control(),
        }
    }
}

/// Per-control outcome of one submit attempt.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldValidity {
    pub name: SmolStr,
    pub validity: Validity,
}

/// Ordered per-control results of one submit attempt; transient output, not
/// persisted anywhere.
pub type FormValidityReport = Vec<FieldValidity>;

/// Terminal outcome of a submit pass; exactly one of the two is produced.
#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    Valid(FormData),
    Invalid(FormValidityReport),
}

impl SubmitOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

/// Aggregated name -> value(s) map over every named participant.
pub fn collect_form_data(members: &[FormMember<'_>]) -> FormData {
    let mut data = FormData::new();
    for member in members {
        if !member.participates() {
            continue;
        }
        data.append(member.name(), member.form_value());
    }
    data
}

/// Submit-time aggregation: validates and reports every participant, then
/// emits exactly one terminal outcome. Source order decides both the
/// failure-list order and which invalid control receives focus.
pub fn submit_form(members: &mut [FormMember<'_>], events: &mut dyn EventSink) -> SubmitOutcome {
    // Cross-field rules read sibling values, so snapshot the data up front
    // and validate every control even if it was valid a moment ago.
    let form_data = collect_form_data(members);

    let mut report = FormValidityReport::new();
    for member in members.iter_mut() {
        if !member.participates() {
            continue;
        }
        let validity = member.validate(&form_data);
        report.push(FieldValidity {
            name: member.name(),
            validity,
        });
    }

    // Reporting runs for every participant regardless of outcome, so stale
    // errors on now-valid controls are cleared.
    for member in members.iter_mut() {
        if !member.participates() {
            continue;
        }
        member.report(events);
    }

    if report.iter().all(|field| field.validity.is_valid()) {
        let data = collect_form_data(members);
        events.dispatch(FormEvent::FormValid(data.clone()));
        return SubmitOutcome::Valid(data);
    }

    let mut index = 0;
    for member in members.iter_mut() {
        if !member.participates() {
            continue;
        }
        if !report[index].validity.is_valid() {
            member.focus();
            break;
        }
        index += 1;
    }

    events.dispatch(FormEvent::FormInvalid(report.clone()));
    SubmitOutcome::Invalid(report)
}

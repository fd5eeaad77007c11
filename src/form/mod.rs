mod control;
mod submit;
mod validators;
mod validity;


pub use control::{
    ErrorMessage, ErrorMessageMap, FormControlElement, FormControlState, FormParticipant,
    UpdatePlan, plan_reactive_update, properties, resolve_error_message,
};
pub use submit::{
    FieldValidity, FormMember, FormValidityReport, NativeFormControl, SubmitOutcome,
    collect_form_data, submit_form,
};
pub use validators::{
    EmailValidator, NumberValidator, RequiredValidator, ValidValidator, codes, combine_validators,
};
pub use validity::{FormData, FormValue, Validator, Validity};

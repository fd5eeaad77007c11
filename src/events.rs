use smol_str::SmolStr;

use crate::form::{FormData, FormValidityReport};

/// Payloads surfaced to application code. The embedding environment decides
/// how these become user-visible notifications (custom events, callbacks,
/// message passing); the core only produces them.
#[derive(Clone, Debug, PartialEq)]
pub enum FormEvent {
    /// Every participant validated successfully; carries the aggregated
    /// name -> value(s) map.
    FormValid(FormData),
    /// At least one participant failed; carries the ordered per-control
    /// results.
    FormInvalid(FormValidityReport),
    /// A control's displayed inline error changed; `None` means cleared.
    ErrorMessageChanged {
        name: SmolStr,
        message: Option<SmolStr>,
    },
    /// A range selection was committed; carries the enabled values of the
    /// committed span.
    RangeSelected { name: SmolStr, values: Vec<SmolStr> },
}

/// Capability standing in for the event-dispatch helper.
pub trait EventSink {
    fn dispatch(&mut self, event: FormEvent);
}

impl<F> EventSink for F
where
    F: FnMut(FormEvent),
{
    fn dispatch(&mut self, event: FormEvent) {
        (self)(event)
    }
}

impl EventSink for Vec<FormEvent> {
    fn dispatch(&mut self, event: FormEvent) {
        self.push(event);
    }
}

/// Sink for embeddings that do not observe form events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn dispatch(&mut self, _event: FormEvent) {}
}

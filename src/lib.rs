pub mod components;
pub mod events;
pub mod form;
pub mod i18n;

pub use events::{EventSink, FormEvent, NullEventSink};

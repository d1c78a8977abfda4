//! Capture harness for `tracing` events in unit tests.
//!
//! Installs a recording subscriber for the duration of a closure so tests can
//! assert on the level, message and structured fields of what was logged.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use tracing::{
    Event,
    Level,
    Metadata,
    Subscriber,
    field::{Field, Visit},
    span::{Attributes, Id, Record},
};

#[derive(Clone, Default)]
struct RecordingSubscriber {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl RecordingSubscriber {
    fn take_events(&self) -> Vec<RecordedEvent> {
        let mut guard = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *guard)
    }
}

/// A single captured event.
#[derive(Debug)]
pub(crate) struct RecordedEvent {
    level: Level,
    fields: HashMap<String, String>,
    message: Option<String>,
}

impl RecordedEvent {
    pub(crate) const fn level(&self) -> Level { self.level }

    /// Captured field rendered as text; `%value` fields use `Display`.
    pub(crate) fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub(crate) fn message(&self) -> Option<&str> { self.message.as_deref() }
}

#[derive(Default)]
struct FieldRecorder {
    fields: HashMap<String, String>,
    message: Option<String>,
}

impl FieldRecorder {
    fn record_value(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = Some(value);
        } else {
            self.fields.insert(field.name().to_owned(), value);
        }
    }
}

impl Visit for FieldRecorder {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record_value(field, format!("{value:?}"));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_value(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record_value(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record_value(field, value.to_string());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_value(field, value.to_owned());
    }
}

impl Subscriber for RecordingSubscriber {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool { true }

    fn new_span(&self, _attrs: &Attributes<'_>) -> Id { Id::from_u64(1) }

    fn record(&self, _span: &Id, _values: &Record<'_>) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let mut recorder = FieldRecorder::default();
        event.record(&mut recorder);
        let record = RecordedEvent {
            level: *event.metadata().level(),
            fields: recorder.fields,
            message: recorder.message,
        };
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

/// Capture every event emitted while `f` runs on this thread.
pub(crate) fn capture_events(f: impl FnOnce()) -> Vec<RecordedEvent> {
    let subscriber = RecordingSubscriber::default();
    let dispatch = tracing::Dispatch::new(subscriber.clone());
    tracing::dispatcher::with_default(&dispatch, f);
    subscriber.take_events()
}

/// Capture exactly one event emitted while `f` runs.
///
/// # Panics
/// Panics if `f` emits no events or more than one.
pub(crate) fn capture_single_event(f: impl FnOnce()) -> RecordedEvent {
    let mut events = capture_events(f);
    assert_eq!(events.len(), 1, "expected exactly one tracing event");
    events.remove(0)
}

//! Analytics events.
//!
//! The game reports a handful of named events with free-form parameters.
//! Delivery is best effort: a sink never returns an error to the caller.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::Value;

/// A named analytics event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    /// Event name, e.g. `game_over`.
    pub name: String,
    /// Free-form parameters.
    pub params: BTreeMap<String, Value>,
}

impl Event {
    /// Event with no parameters.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: BTreeMap::new(),
        }
    }

    /// Add a parameter.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// Receives analytics events.
pub trait EventSink: Send {
    /// Deliver one event.
    fn emit(&mut self, event: Event);
}

/// Forwards events to `tracing` under the `stitch::analytics` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, event: Event) {
        let params = serde_json::to_string(&event.params).unwrap_or_default();
        tracing::info!(target: "stitch::analytics", name = %event.name, %params, "event");
    }
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: Event) {}
}

/// Keeps events in memory; clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<Event>>>,
}

impl MemorySink {
    /// Empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Names of recorded events in order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.name).collect()
    }
}

impl EventSink for MemorySink {
    fn emit(&mut self, event: Event) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_builder() {
        let event = Event::new("game_over").with("winner", "red").with("turns", 12);
        assert_eq!(event.params["winner"], Value::from("red"));
        assert_eq!(event.params["turns"], Value::from(12));
    }

    #[test]
    fn test_memory_sink_shares_buffer() {
        let sink = MemorySink::new();
        let mut writer = sink.clone();
        writer.emit(Event::new("a"));
        writer.emit(Event::new("b"));
        assert_eq!(sink.names(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_null_and_tracing_sinks_accept_events() {
        NullSink.emit(Event::new("ignored"));
        TracingSink.emit(Event::new("logged").with("k", true));
    }
}

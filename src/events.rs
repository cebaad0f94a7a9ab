//! Typed event hooks for panels and plots.

use std::collections::HashMap;

use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    LayoutChanged,
    StateChanged,
    DataRequested,
    DataRendered,
    ElementClicked,
    PanelRemoved,
}

#[derive(Clone, Debug)]
pub struct Event {
    pub kind: EventKind,
    /// Originating panel, when the event is panel-scoped.
    pub panel_id: Option<String>,
    pub data: Value,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            panel_id: None,
            data: Value::Null,
        }
    }

    pub fn from_panel(kind: EventKind, panel_id: impl Into<String>) -> Self {
        Self {
            kind,
            panel_id: Some(panel_id.into()),
            data: Value::Null,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

pub type Handler = Box<dyn FnMut(&Event) + Send>;

/// Handle returned by `subscribe`; pass back to `unsubscribe` to detach.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Subscription {
    kind: EventKind,
    id: u64,
}

/// Event hook registry. Emission is synchronous: every handler runs to
/// completion before `emit` returns, matching the single-threaded event
/// loop the engine assumes.
#[derive(Default)]
pub struct EventBus {
    handlers: HashMap<EventKind, Vec<(u64, Handler)>>,
    next_id: u64,
}

impl EventBus {
    pub fn subscribe(
        &mut self,
        kind: EventKind,
        handler: impl FnMut(&Event) + Send + 'static,
    ) -> Subscription {
        let id = self.next_id;
        self.next_id += 1;
        self.handlers
            .entry(kind)
            .or_default()
            .push((id, Box::new(handler)));
        Subscription { kind, id }
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let Some(handlers) = self.handlers.get_mut(&subscription.kind) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(id, _)| *id != subscription.id);
        handlers.len() != before
    }

    pub fn emit(&mut self, event: &Event) {
        if let Some(handlers) = self.handlers.get_mut(&event.kind) {
            for (_, handler) in handlers.iter_mut() {
                handler(event);
            }
        }
    }

    pub fn has_subscribers(&self, kind: EventKind) -> bool {
        self.handlers.get(&kind).is_some_and(|h| !h.is_empty())
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<_, _> = self
            .handlers
            .iter()
            .map(|(kind, handlers)| (kind, handlers.len()))
            .collect();
        f.debug_struct("EventBus").field("handlers", &counts).finish()
    }
}

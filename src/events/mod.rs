//! Step lifecycle events
//!
//! External reporters observe execution through exactly five events per
//! step. The success path emits `started → after → passed → finished`;
//! the failure path emits `started → failed → finished` (`after` and
//! `passed` never fire on failure). Delivery is synchronous with respect
//! to the emitting task, in listener registration order.

use crate::core::SharedStep;
use crate::error::StepError;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// The five step lifecycle event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    StepStarted,
    StepAfter,
    StepPassed,
    StepFailed,
    StepFinished,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::StepStarted,
        EventKind::StepAfter,
        EventKind::StepPassed,
        EventKind::StepFailed,
        EventKind::StepFinished,
    ];

    /// The dotted event name reporters key off.
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::StepStarted => "step.started",
            EventKind::StepAfter => "step.after",
            EventKind::StepPassed => "step.passed",
            EventKind::StepFailed => "step.failed",
            EventKind::StepFinished => "step.finished",
        }
    }
}

/// A lifecycle event and its payload.
#[derive(Clone)]
pub enum StepEvent {
    Started(SharedStep),
    After(SharedStep),
    Passed(SharedStep),
    Failed(SharedStep, Arc<StepError>),
    Finished(SharedStep),
}

impl StepEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            StepEvent::Started(_) => EventKind::StepStarted,
            StepEvent::After(_) => EventKind::StepAfter,
            StepEvent::Passed(_) => EventKind::StepPassed,
            StepEvent::Failed(_, _) => EventKind::StepFailed,
            StepEvent::Finished(_) => EventKind::StepFinished,
        }
    }

    /// The step this event is about.
    pub fn step(&self) -> &SharedStep {
        match self {
            StepEvent::Started(step)
            | StepEvent::After(step)
            | StepEvent::Passed(step)
            | StepEvent::Failed(step, _)
            | StepEvent::Finished(step) => step,
        }
    }

    /// The error payload, present only for `step.failed`.
    pub fn error(&self) -> Option<&StepError> {
        match self {
            StepEvent::Failed(_, err) => Some(err),
            _ => None,
        }
    }
}

/// Type for event listeners
pub type Listener = Box<dyn Fn(&StepEvent) + Send + Sync>;

/// Publish/subscribe channel for step lifecycle events.
///
/// Listeners are registered at setup time and fired synchronously, in
/// registration order, from the emitting task. The bus does not catch
/// listener panics; they propagate to the emitting context.
#[derive(Default)]
pub struct EventBus {
    listeners: RwLock<HashMap<EventKind, Vec<Listener>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for one event kind.
    pub fn on<F>(&self, kind: EventKind, listener: F)
    where
        F: Fn(&StepEvent) + Send + Sync + 'static,
    {
        if let Ok(mut listeners) = self.listeners.write() {
            listeners.entry(kind).or_default().push(Box::new(listener));
        }
    }

    /// Deliver an event to every listener registered for its kind.
    pub fn emit(&self, event: &StepEvent) {
        let Ok(listeners) = self.listeners.read() else {
            return;
        };
        if let Some(registered) = listeners.get(&event.kind()) {
            for listener in registered {
                listener(event);
            }
        }
    }
}

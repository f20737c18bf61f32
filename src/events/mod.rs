//! Event types for session execution.
//!
//! Events are emitted while a session runs to notify subscribers about
//! node steps, pauses for input, completion and failures.

mod node;
mod session;

pub use node::*;
pub use session::*;

use crate::{runtime::SessionId, workflow::node::NodeId};

/// Generic event wrapper.
#[derive(Debug, Clone)]
pub struct Event<T> {
    inner: T,
}

/// Top-level event type.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowEvent {
    /// Session-level events (started, awaiting input, finished, failed).
    Session(SessionEvent),
    /// Node-level events (entered, resumed, succeeded, rejected, error).
    Node(NodeEvent),
}

/// Event message containing session and node context.
#[derive(Debug, Clone)]
pub struct Message {
    /// Session that generated this event.
    pub sid: SessionId,
    /// Node the session was at (empty before the first step).
    pub nid: NodeId,
    /// The actual event data.
    pub event: FlowEvent,
}

impl<T> std::ops::Deref for Event<T>
where
    T: std::fmt::Debug + Clone,
{
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T> Event<T>
where
    T: std::fmt::Debug + Clone,
{
    pub fn new(inner: &T) -> Self {
        Self {
            inner: inner.clone(),
        }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl FlowEvent {
    pub fn is_finished(&self) -> bool {
        matches!(self, FlowEvent::Session(SessionEvent::Finished(_)))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, FlowEvent::Session(SessionEvent::Failed(_)))
    }

    pub fn is_input_required(&self) -> bool {
        matches!(self, FlowEvent::Session(SessionEvent::AwaitingInput(_)))
    }

    pub fn str(&self) -> &str {
        match self {
            FlowEvent::Session(e) => e.str(),
            FlowEvent::Node(e) => e.str(),
        }
    }
}

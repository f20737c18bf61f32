//! # Convoflow
//!
//! Convoflow runs conversational flows: directed graphs of typed steps
//! (message, prompt, choice, branch, delay, simulated external call, ...)
//! authored in a visual editor and executed against a live participant,
//! one step at a time.
//!
//! ## Core Features
//!
//! - **Suspend / resume driver**: execution pauses exactly where a human answer is needed
//! - **Typed branching**: conditional, choice and request outcomes are resolved to direct edges at load time
//! - **Fail-open interpolation**: `{{name}}` placeholders resolved against session variables
//! - **Loop guard**: consecutive autonomous steps are capped so authoring mistakes cannot spin forever
//! - **Event channel**: glob-filtered lifecycle events for logging and inspection
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use convoflow::{EngineBuilder, FlowModel, UserInput};
//!
//! let engine = EngineBuilder::new().build()?;
//! let flow = FlowModel::from_json(json_str)?;
//! engine.deploy(&flow)?;
//!
//! let sid = engine.create_session(&flow.id, "participant-1")?;
//! let turn = engine.start(&sid).await?;
//! if turn.requires_input() {
//!     let turn = engine.resume(&sid, Some(UserInput::text("Ada"))).await?;
//! }
//! ```

mod builder;
mod common;
mod config;
mod engine;
mod error;
mod events;
mod model;
mod runtime;
mod utils;
mod workflow;

use std::sync::{Arc, RwLock};

pub use builder::EngineBuilder;
pub use common::Vars;
pub use config::Config;
pub use engine::Engine;
pub use error::{ConvoflowError, ErrorKind};
pub use events::{ErrorReason, Event, FlowEvent, Message, NodeEvent, SessionEvent};
pub use model::*;
pub use runtime::{
    Channel, ChannelEvent, ChannelOptions, ExecutionOutcome, HistoryEntry, Session, SessionHandle, SessionId, SessionState, Turn,
};
pub use workflow::{
    Flow,
    actions::ActionType,
    edge::{Links, SourceHandle},
    input::{ChoiceSelection, FileDescriptor, UserInput},
    node::{Node, NodeId},
    output::{ChoiceOption, NodeOutput},
    template::{interpolate, interpolate_json},
};

/// Result type alias for Convoflow operations.
pub type Result<T> = std::result::Result<T, ConvoflowError>;

/// Thread-safe shared lock wrapper using Arc<RwLock<T>>.
pub(crate) type ShareLock<T> = Arc<RwLock<T>>;

mod channel;
mod context;
mod history;
mod outcome;
mod session;

pub use channel::{Channel, ChannelEvent, ChannelOptions};
pub use context::Context;
pub use history::HistoryEntry;
pub use outcome::{ExecutionOutcome, Turn};
pub use session::{Session, SessionHandle, SessionId, SessionState};

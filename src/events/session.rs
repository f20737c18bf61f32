use crate::events::ErrorReason;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Started(i64),
    AwaitingInput(i64),
    Finished(i64),
    Failed(ErrorReason),
}

impl SessionEvent {
    pub fn str(&self) -> &str {
        match self {
            SessionEvent::Started(_) => "Started",
            SessionEvent::AwaitingInput(_) => "AwaitingInput",
            SessionEvent::Finished(_) => "Finished",
            SessionEvent::Failed(_) => "Failed",
        }
    }
}

use std::fmt;

use crate::ErrorKind;

#[derive(Debug, Clone, PartialEq)]
pub enum NodeEvent {
    Entered(i64),
    Resumed(i64),
    Succeeded(i64),
    /// The answer was refused; the node is still waiting.
    Rejected(ErrorReason),
    Error(ErrorReason),
}

impl NodeEvent {
    pub fn str(&self) -> &str {
        match self {
            NodeEvent::Entered(_) => "Entered",
            NodeEvent::Resumed(_) => "Resumed",
            NodeEvent::Succeeded(_) => "Succeeded",
            NodeEvent::Rejected(_) => "Rejected",
            NodeEvent::Error(_) => "Error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorReason {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorReason {
    pub fn new(
        kind: ErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorReason {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_reason_display() {
        let reason = ErrorReason::new(ErrorKind::LoopGuardTripped, "too many steps");
        assert_eq!(reason.to_string(), "loop_guard_tripped: too many steps");
        assert_eq!(NodeEvent::Error(reason).str(), "Error");
    }
}

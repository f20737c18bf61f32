use serde::{Deserialize, Serialize};

use crate::{
    ErrorKind,
    workflow::{node::NodeId, output::NodeOutput},
};

/// Result of one executed step, as handed to the presentation layer.
///
/// Constructors keep the flags consistent: a finished outcome and one that
/// requires input never carry a next node.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOutcome {
    /// node that produced the outcome
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,
    pub success: bool,
    pub next_node_id: Option<NodeId>,
    pub requires_input: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<NodeOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    pub finished: bool,
}

impl ExecutionOutcome {
    fn base(node_id: Option<&str>) -> Self {
        Self {
            node_id: node_id.map(str::to_string),
            success: true,
            next_node_id: None,
            requires_input: false,
            output: None,
            error: None,
            error_kind: None,
            finished: false,
        }
    }

    /// Step succeeded and execution moves on to `next`.
    pub fn advanced(
        node_id: &str,
        next: NodeId,
        output: Option<NodeOutput>,
    ) -> Self {
        Self {
            next_node_id: Some(next),
            output,
            ..Self::base(Some(node_id))
        }
    }

    /// Step succeeded and the node waits for the participant.
    pub fn awaiting(
        node_id: &str,
        output: Option<NodeOutput>,
    ) -> Self {
        Self {
            requires_input: true,
            output,
            ..Self::base(Some(node_id))
        }
    }

    /// Step succeeded and the conversation is over.
    pub fn finished(
        node_id: &str,
        output: Option<NodeOutput>,
    ) -> Self {
        Self {
            finished: true,
            output,
            ..Self::base(Some(node_id))
        }
    }

    pub fn failed(
        node_id: Option<&str>,
        kind: ErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            error_kind: Some(kind),
            ..Self::base(node_id)
        }
    }

    /// A refused answer; the node is still waiting.
    pub fn rejected(
        node_id: &str,
        kind: ErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            requires_input: true,
            ..Self::failed(Some(node_id), kind, message)
        }
    }
}

/// Outcomes produced by one inbound call, in execution order.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Turn {
    steps: Vec<ExecutionOutcome>,
}

impl Turn {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(
        &mut self,
        outcome: ExecutionOutcome,
    ) {
        self.steps.push(outcome);
    }

    pub fn steps(&self) -> &[ExecutionOutcome] {
        &self.steps
    }

    /// Outcome that decides what the presentation layer does next.
    pub fn last(&self) -> Option<&ExecutionOutcome> {
        self.steps.last()
    }

    pub fn requires_input(&self) -> bool {
        self.last().is_some_and(|o| o.requires_input)
    }

    pub fn finished(&self) -> bool {
        self.last().is_some_and(|o| o.finished)
    }

    pub fn success(&self) -> bool {
        self.last().is_some_and(|o| o.success)
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.last().and_then(|o| o.error_kind)
    }

    /// Every rendered payload of the turn, in order.
    pub fn outputs(&self) -> Vec<&NodeOutput> {
        self.steps.iter().filter_map(|o| o.output.as_ref()).collect()
    }

    /// Texts of the rendered payloads, for chat-style display.
    pub fn texts(&self) -> Vec<&str> {
        self.outputs().into_iter().filter_map(NodeOutput::text).collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_outcome_flags() {
        let done = ExecutionOutcome::finished("end", None);
        assert!(done.finished && done.next_node_id.is_none());

        let waiting = ExecutionOutcome::awaiting("ask", None);
        assert!(waiting.requires_input && waiting.next_node_id.is_none());

        let rejected = ExecutionOutcome::rejected("ask", ErrorKind::MissingRequiredField, "required");
        assert!(!rejected.success && rejected.requires_input);
        assert_eq!(rejected.error_kind, Some(ErrorKind::MissingRequiredField));
    }

    #[test]
    fn test_outcome_wire_format() {
        let outcome = ExecutionOutcome::advanced("s", "n2".to_string(), None);
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"nodeId": "s", "success": true, "nextNodeId": "n2", "requiresInput": false, "finished": false})
        );

        let failed = ExecutionOutcome::failed(None, ErrorKind::NoStartNode, "no start node");
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value["errorKind"], json!("no_start_node"));
        assert_eq!(value["nextNodeId"], json!(null));
    }

    #[test]
    fn test_turn_accessors() {
        let mut turn = Turn::new();
        assert!(!turn.success());

        turn.push(ExecutionOutcome::advanced(
            "m",
            "ask".to_string(),
            Some(NodeOutput::Message {
                message: "Hi".to_string(),
                avatar: None,
                typing_delay: 1000,
            }),
        ));
        turn.push(ExecutionOutcome::awaiting("ask", None));

        assert!(turn.requires_input());
        assert!(!turn.finished());
        assert_eq!(turn.texts(), vec!["Hi"]);
        assert_eq!(turn.steps().len(), 2);
    }
}

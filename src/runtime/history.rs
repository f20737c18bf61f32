use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    utils,
    workflow::{node::NodeId, output::NodeOutput},
};

/// One audit record: a node entry, or an answer given to a waiting node.
///
/// History is append-only and never read to make control-flow decisions.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub node_id: NodeId,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_input: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_output: Option<NodeOutput>,
}

impl HistoryEntry {
    pub fn entered(node_id: &str) -> Self {
        Self {
            node_id: node_id.to_string(),
            timestamp: utils::time::now(),
            user_input: None,
            node_output: None,
        }
    }

    pub fn answered(
        node_id: &str,
        user_input: Value,
    ) -> Self {
        Self {
            user_input: Some(user_input),
            ..Self::entered(node_id)
        }
    }

    pub fn is_answer(&self) -> bool {
        self.user_input.is_some()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_history_entry_serializes_camel_case() {
        let mut entry = HistoryEntry::answered("ask", json!("Ada"));
        entry.node_output = Some(NodeOutput::UserInputResponse { value: json!("Ada") });

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["nodeId"], json!("ask"));
        assert_eq!(value["userInput"], json!("Ada"));
        assert_eq!(value["nodeOutput"]["type"], json!("user-input-response"));
        assert!(value.get("timestamp").is_some());
        assert!(entry.is_answer());
        assert!(!HistoryEntry::entered("n").is_answer());
    }
}

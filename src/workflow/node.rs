use std::fmt;

use serde_json::Value;

use crate::{
    ConvoflowError, Result,
    model::{NodeModel, Position},
    workflow::{
        actions::{self, Action, ActionType},
        edge::Links,
    },
};

/// node id
pub type NodeId = String;

/// Compiled flow node.
///
/// The handler is built once when the flow is deployed. A node whose type
/// tag is unknown, or whose data the handler rejects, still compiles: the
/// failure is kept and reported when a session enters the node.
pub struct Node {
    /// node id
    pub id: NodeId,
    /// type tag as authored, e.g. `message` or `text`
    pub type_tag: String,
    /// handler kind resolved from the tag, if known
    pub uses: Option<ActionType>,
    /// raw configuration payload
    pub data: Value,
    /// editor position, never read by execution
    pub position: Option<Position>,
    /// outgoing connections resolved for this node's type
    pub links: Links,
    action: std::result::Result<Box<dyn Action>, ConvoflowError>,
}

impl fmt::Debug for Node {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("type_tag", &self.type_tag)
            .field("uses", &self.uses)
            .field("links", &self.links)
            .finish()
    }
}

impl Node {
    pub fn new(model: &NodeModel) -> Self {
        let uses = model.node_type.parse::<ActionType>().ok();
        let data = match &model.data {
            Value::Null => Value::Object(Default::default()),
            data => data.clone(),
        };
        let action = match uses {
            Some(uses) => actions::create_action(uses, data.clone()),
            None => Err(ConvoflowError::UnsupportedNode(model.node_type.clone())),
        };

        Self {
            id: model.id.clone(),
            type_tag: model.node_type.clone(),
            uses,
            data,
            position: model.position,
            links: Links::Next(None),
            action,
        }
    }

    /// The node's handler, or the error that prevented building it.
    pub fn action(&self) -> Result<&dyn Action> {
        match &self.action {
            Ok(action) => Ok(action.as_ref()),
            Err(e) => Err(e.clone()),
        }
    }

    /// Number of options a choice node declares.
    pub fn option_count(&self) -> usize {
        self.data.get("choices").and_then(Value::as_array).map(Vec::len).unwrap_or(0)
    }

    pub fn is_start(&self) -> bool {
        self.uses == Some(ActionType::Start)
    }

    #[cfg(test)]
    pub(crate) fn set_action(
        &mut self,
        action: Box<dyn Action>,
    ) {
        self.action = Ok(action);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_node_alias_tags() {
        let node = Node::new(&NodeModel::new("n1", "text", json!({"text": "hi"})));
        assert_eq!(node.uses, Some(ActionType::Message));
        assert!(node.action().is_ok());

        let node = Node::new(&NodeModel::new("n2", "input", json!({})));
        assert_eq!(node.uses, Some(ActionType::UserInput));
    }

    #[test]
    fn test_node_unknown_type_compiles() {
        let node = Node::new(&NodeModel::new("n1", "carousel", json!({})));
        assert_eq!(node.uses, None);
        assert_eq!(node.action().err(), Some(ConvoflowError::UnsupportedNode("carousel".to_string())));
    }

    #[test]
    fn test_node_option_count() {
        let node = Node::new(&NodeModel::new("c", "choice", json!({"choices": [{"label": "a"}, {"label": "b"}]})));
        assert_eq!(node.option_count(), 2);

        let node = Node::new(&NodeModel::new("c", "choice", json!({})));
        assert_eq!(node.option_count(), 0);
    }
}

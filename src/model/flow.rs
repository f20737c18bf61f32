use serde::{Deserialize, Serialize};

use crate::{
    ConvoflowError, Result,
    model::{EdgeModel, NodeModel},
};

/// An authored flow as delivered by the editor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowModel {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub nodes: Vec<NodeModel>,
    #[serde(default)]
    pub edges: Vec<EdgeModel>,
}

impl FlowModel {
    pub fn new(
        id: impl Into<String>,
        nodes: Vec<NodeModel>,
        edges: Vec<EdgeModel>,
    ) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            nodes,
            edges,
        }
    }

    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str::<FlowModel>(s).map_err(|e| ConvoflowError::Flow(format!("{}", e)))
    }
}

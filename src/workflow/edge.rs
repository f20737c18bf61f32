//! Flow edge definitions and load-time branch resolution.
//!
//! Edges carry an optional source handle naming which logical output of a
//! branching node they realize (`true`/`false`, `success`/`error`,
//! `choice-N`). When a flow is compiled, every node's outgoing edges are
//! folded into a [`Links`] value shaped after the node type, so the driver
//! never searches edges by string at run time.

use serde::{Deserialize, Serialize};

use crate::{
    model::EdgeModel,
    workflow::{actions::ActionType, node::NodeId},
};

/// Unique identifier for an edge within a flow.
pub type EdgeId = String;

const CHOICE_HANDLE_PREFIX: &str = "choice-";

/// Fixed source handle names used by branching nodes.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FixedHandle {
    /// True branch for conditional nodes.
    True,
    /// False branch for conditional nodes.
    False,
    /// Completed branch for request nodes.
    Success,
    /// Failed branch for request nodes.
    Error,
}

/// Source handle identifying which output of a node an edge leaves from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SourceHandle {
    /// No handle; the node's single output.
    #[default]
    Unnamed,
    /// One of the fixed handles: true, false, success, error.
    Fixed(FixedHandle),
    /// Option `N` of a choice node (`choice-N`).
    Choice(usize),
    /// Any other label the editor produced.
    Named(String),
}

impl SourceHandle {
    pub fn parse(handle: Option<&str>) -> Self {
        let Some(handle) = handle.map(str::trim).filter(|h| !h.is_empty()) else {
            return SourceHandle::Unnamed;
        };

        if let Ok(fixed) = handle.parse::<FixedHandle>() {
            return SourceHandle::Fixed(fixed);
        }

        if let Some(index) = handle.strip_prefix(CHOICE_HANDLE_PREFIX).and_then(|i| i.parse::<usize>().ok()) {
            return SourceHandle::Choice(index);
        }

        SourceHandle::Named(handle.to_string())
    }

    /// Handle label for choice option `index`.
    pub fn choice_label(index: usize) -> String {
        format!("{}{}", CHOICE_HANDLE_PREFIX, index)
    }

    pub fn label(&self) -> String {
        match self {
            SourceHandle::Unnamed => "source".to_string(),
            SourceHandle::Fixed(h) => h.as_ref().to_string(),
            SourceHandle::Choice(i) => Self::choice_label(*i),
            SourceHandle::Named(n) => n.clone(),
        }
    }
}

/// Runtime edge representation connecting two nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Unique edge identifier.
    pub id: EdgeId,
    /// ID of the source node.
    pub source: NodeId,
    /// ID of the target node.
    pub target: NodeId,
    /// Which output handle this edge connects from.
    pub source_handle: SourceHandle,
}

impl From<&EdgeModel> for Edge {
    fn from(model: &EdgeModel) -> Self {
        Self {
            id: model.id.clone(),
            source: model.source.clone(),
            target: model.target.clone(),
            source_handle: SourceHandle::parse(model.source_handle.as_deref()),
        }
    }
}

/// Outgoing connections of one node, resolved for its type.
///
/// `None` in any slot means no edge realizes that output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Links {
    /// Single unconditional successor.
    Next(Option<NodeId>),
    /// Conditional node outputs.
    Conditional {
        on_true: Option<NodeId>,
        on_false: Option<NodeId>,
    },
    /// Choice node outputs, indexed like the configured options.
    Choice {
        by_index: Vec<Option<NodeId>>,
    },
    /// Request node outputs.
    Request {
        on_success: Option<NodeId>,
        on_error: Option<NodeId>,
    },
    /// No outputs.
    Terminal,
}

impl Links {
    /// Fold `outgoing` (in declaration order) into the shape `uses` needs.
    ///
    /// When several edges realize the same output, the first declared wins.
    /// Unknown node types get `Next`, so an unsupported node still reports a
    /// successor in the flow schema.
    pub fn resolve(
        uses: Option<ActionType>,
        option_count: usize,
        outgoing: &[&Edge],
    ) -> Self {
        let by_handle = |handle: SourceHandle| outgoing.iter().find(|e| e.source_handle == handle).map(|e| e.target.clone());

        match uses {
            Some(ActionType::End) => Links::Terminal,
            Some(ActionType::Conditional) => Links::Conditional {
                on_true: by_handle(SourceHandle::Fixed(FixedHandle::True)),
                on_false: by_handle(SourceHandle::Fixed(FixedHandle::False)),
            },
            Some(ActionType::Choice) => Links::Choice {
                by_index: (0..option_count).map(|i| by_handle(SourceHandle::Choice(i))).collect(),
            },
            Some(ActionType::ApiRequest) => Links::Request {
                on_success: by_handle(SourceHandle::Fixed(FixedHandle::Success)),
                on_error: by_handle(SourceHandle::Fixed(FixedHandle::Error)),
            },
            _ => Links::Next(outgoing.first().map(|e| e.target.clone())),
        }
    }

    /// Successor of a non-branching node.
    pub fn next(&self) -> Option<NodeId> {
        match self {
            Links::Next(next) => next.clone(),
            _ => None,
        }
    }

    /// Successor of a conditional node for `result`.
    pub fn branch(
        &self,
        result: bool,
    ) -> Option<NodeId> {
        match self {
            Links::Conditional {
                on_true,
                on_false,
            } => {
                if result {
                    on_true.clone()
                } else {
                    on_false.clone()
                }
            }
            _ => None,
        }
    }

    /// Successor of a choice node for option `index`.
    pub fn choice(
        &self,
        index: usize,
    ) -> Option<NodeId> {
        match self {
            Links::Choice {
                by_index,
            } => by_index.get(index).cloned().flatten(),
            _ => None,
        }
    }

    /// Successor of a request node.
    pub fn request(
        &self,
        succeeded: bool,
    ) -> Option<NodeId> {
        match self {
            Links::Request {
                on_success,
                on_error,
            } => {
                if succeeded {
                    on_success.clone()
                } else {
                    on_error.clone()
                }
            }
            _ => None,
        }
    }

    /// Every resolved target, for reachability checks and the schema dump.
    pub fn targets(&self) -> Vec<(String, NodeId)> {
        let labelled = |label: String, target: &Option<NodeId>| target.clone().map(|t| (label, t));

        match self {
            Links::Next(next) => labelled("source".to_string(), next).into_iter().collect(),
            Links::Conditional {
                on_true,
                on_false,
            } => [labelled("true".to_string(), on_true), labelled("false".to_string(), on_false)].into_iter().flatten().collect(),
            Links::Choice {
                by_index,
            } => by_index.iter().enumerate().filter_map(|(i, t)| labelled(SourceHandle::choice_label(i), t)).collect(),
            Links::Request {
                on_success,
                on_error,
            } => [labelled("success".to_string(), on_success), labelled("error".to_string(), on_error)].into_iter().flatten().collect(),
            Links::Terminal => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(
        id: &str,
        target: &str,
        handle: Option<&str>,
    ) -> Edge {
        Edge {
            id: id.to_string(),
            source: "src".to_string(),
            target: target.to_string(),
            source_handle: SourceHandle::parse(handle),
        }
    }

    #[test]
    fn test_parse_handles() {
        assert_eq!(SourceHandle::parse(None), SourceHandle::Unnamed);
        assert_eq!(SourceHandle::parse(Some("  ")), SourceHandle::Unnamed);
        assert_eq!(SourceHandle::parse(Some("true")), SourceHandle::Fixed(FixedHandle::True));
        assert_eq!(SourceHandle::parse(Some("error")), SourceHandle::Fixed(FixedHandle::Error));
        assert_eq!(SourceHandle::parse(Some("choice-12")), SourceHandle::Choice(12));
        assert_eq!(SourceHandle::parse(Some("choice-x")), SourceHandle::Named("choice-x".to_string()));
        assert_eq!(SourceHandle::Choice(3).label(), "choice-3");
    }

    #[test]
    fn test_resolve_next_takes_first_declared() {
        let a = edge("e1", "a", None);
        let b = edge("e2", "b", Some("true"));
        let links = Links::resolve(Some(ActionType::Message), 0, &[&a, &b]);
        assert_eq!(links.next(), Some("a".to_string()));
    }

    #[test]
    fn test_resolve_conditional_first_match_wins() {
        let f = edge("e1", "no", Some("false"));
        let t1 = edge("e2", "yes", Some("true"));
        let t2 = edge("e3", "also-yes", Some("true"));
        let links = Links::resolve(Some(ActionType::Conditional), 0, &[&f, &t1, &t2]);
        assert_eq!(links.branch(true), Some("yes".to_string()));
        assert_eq!(links.branch(false), Some("no".to_string()));
    }

    #[test]
    fn test_resolve_choice_independent_of_order() {
        let c2 = edge("e1", "third", Some("choice-2"));
        let c0 = edge("e2", "first", Some("choice-0"));
        let c1 = edge("e3", "second", Some("choice-1"));
        let links = Links::resolve(Some(ActionType::Choice), 3, &[&c2, &c0, &c1]);
        assert_eq!(links.choice(0), Some("first".to_string()));
        assert_eq!(links.choice(1), Some("second".to_string()));
        assert_eq!(links.choice(2), Some("third".to_string()));
        assert_eq!(links.choice(3), None);
    }

    #[test]
    fn test_resolve_missing_branch_is_none() {
        let t = edge("e1", "yes", Some("true"));
        let links = Links::resolve(Some(ActionType::Conditional), 0, &[&t]);
        assert_eq!(links.branch(false), None);

        let links = Links::resolve(Some(ActionType::ApiRequest), 0, &[]);
        assert_eq!(links.request(true), None);
    }

    #[test]
    fn test_resolve_end_is_terminal() {
        let a = edge("e1", "a", None);
        assert_eq!(Links::resolve(Some(ActionType::End), 0, &[&a]), Links::Terminal);
    }
}

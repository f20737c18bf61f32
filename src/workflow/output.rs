//! Rendered payloads handed to the presentation layer.
//!
//! Every executed step may produce one [`NodeOutput`]. It serializes with a
//! `type` tag naming the node type that produced it, so a chat client can
//! pick a widget without knowing anything about the graph.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::workflow::node::NodeId;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, strum::AsRefStr)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
#[strum(serialize_all = "kebab-case")]
pub enum NodeOutput {
    Message {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        avatar: Option<Value>,
        typing_delay: u64,
    },
    UserInput {
        placeholder: String,
        required: bool,
        input_type: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        variable_name: Option<String>,
    },
    Choice {
        choices: Vec<ChoiceOption>,
        allow_multiple: bool,
    },
    Conditional {
        condition: bool,
        variable: String,
        operator: String,
        value: Value,
        result: bool,
    },
    Variable {
        operation: String,
        variable: String,
        value: Value,
    },
    Delay {
        duration: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        show_typing_indicator: Option<bool>,
    },
    Image {
        url: String,
        alt_text: String,
        caption: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<Value>,
    },
    Video {
        url: String,
        platform: String,
        autoplay: bool,
        controls: bool,
        muted: bool,
    },
    End {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cta_label: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cta_url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        show_rating: Option<bool>,
    },
    AiResponse {
        response: String,
        model: String,
        prompt: String,
    },
    ApiRequest {
        response: Value,
        method: String,
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        headers: Option<Value>,
    },
    Script {
        result: String,
        language: String,
    },
    Database {
        result: Value,
        query: String,
        operation: String,
    },
    FileUpload {
        prompt: String,
        allowed_types: Vec<String>,
        max_size: f64,
        multiple: bool,
    },
    UserInputResponse {
        value: Value,
    },
    ChoiceResponse {
        choice: ChoiceOption,
    },
    FileUploadResponse {
        file: Value,
    },
}

/// One option of a choice node, pre-bound to its outgoing edge.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceOption {
    pub label: String,
    pub value: Value,
    pub handle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_node_id: Option<NodeId>,
}

impl NodeOutput {
    /// The `type` tag this payload serializes with.
    pub fn kind(&self) -> &str {
        self.as_ref()
    }

    /// Main text of the payload, when it has one.
    pub fn text(&self) -> Option<&str> {
        match self {
            NodeOutput::Message {
                message,
                ..
            }
            | NodeOutput::End {
                message,
                ..
            } => Some(message.as_str()),
            NodeOutput::Delay {
                message,
                ..
            } => message.as_deref(),
            NodeOutput::UserInput {
                placeholder,
                ..
            } => Some(placeholder.as_str()),
            NodeOutput::FileUpload {
                prompt,
                ..
            } => Some(prompt.as_str()),
            NodeOutput::AiResponse {
                response,
                ..
            } => Some(response.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_output_tags() {
        let out = NodeOutput::UserInputResponse {
            value: json!("Ada"),
        };
        assert_eq!(out.kind(), "user-input-response");
        assert_eq!(serde_json::to_value(&out).unwrap(), json!({"type": "user-input-response", "value": "Ada"}));

        let out = NodeOutput::AiResponse {
            response: "r".to_string(),
            model: "m".to_string(),
            prompt: "p".to_string(),
        };
        assert_eq!(out.kind(), "ai-response");
    }

    #[test]
    fn test_output_fields_camel_case() {
        let out = NodeOutput::Message {
            message: "Hi".to_string(),
            avatar: None,
            typing_delay: 1000,
        };
        assert_eq!(serde_json::to_value(&out).unwrap(), json!({"type": "message", "message": "Hi", "typingDelay": 1000}));
        assert_eq!(out.text(), Some("Hi"));
    }

    #[test]
    fn test_output_deserialize() {
        let out: NodeOutput = serde_json::from_value(json!({
            "type": "end",
            "message": "Bye",
            "ctaUrl": "https://example.com"
        }))
        .unwrap();
        assert_eq!(
            out,
            NodeOutput::End {
                message: "Bye".to_string(),
                cta_label: None,
                cta_url: Some("https://example.com".to_string()),
                show_rating: None,
            }
        );
    }
}

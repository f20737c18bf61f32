//! Answers submitted by the participant when a session is awaiting input.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A participant's answer to an interactive node.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum UserInput {
    /// Free text typed into an input field.
    Text(String),
    /// An option picked from a choice node.
    Choice(ChoiceSelection),
    /// A file handed to a file-upload node.
    File(FileDescriptor),
}

/// Selected option of a choice node, identified by position.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChoiceSelection {
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Metadata of an uploaded file. The engine never sees file contents.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    pub name: String,
    /// size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl UserInput {
    pub fn text(s: impl Into<String>) -> Self {
        UserInput::Text(s.into())
    }

    pub fn choice(index: usize) -> Self {
        UserInput::Choice(ChoiceSelection {
            index,
            label: None,
            value: None,
        })
    }

    pub fn file(descriptor: FileDescriptor) -> Self {
        UserInput::File(descriptor)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            UserInput::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// JSON form, as stored in session variables and history.
    pub fn to_value(&self) -> Value {
        match self {
            UserInput::Text(s) => Value::String(s.clone()),
            other => serde_json::to_value(other).unwrap_or(Value::Null),
        }
    }
}

impl From<&str> for UserInput {
    fn from(s: &str) -> Self {
        UserInput::Text(s.to_string())
    }
}

impl From<String> for UserInput {
    fn from(s: String) -> Self {
        UserInput::Text(s)
    }
}

impl FileDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: None,
            mime_type: None,
            url: None,
        }
    }

    pub fn with_mime_type(
        mut self,
        mime_type: impl Into<String>,
    ) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_size(
        mut self,
        size: u64,
    ) -> Self {
        self.size = Some(size);
        self
    }
}

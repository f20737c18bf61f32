use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    Result,
    runtime::Context,
    workflow::{
        actions::{ActionType, lenient},
        edge::Links,
        output::NodeOutput,
    },
};

use super::{Action, ActionOutput, parse_params};

const DEFAULT_MESSAGE: &str = "Message not configured";
const DEFAULT_TYPING_DELAY_MS: u64 = 1000;

/// Bot message. The text is read from `text`, then `message`, then `label`.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MessageAction {
    #[serde(default, deserialize_with = "lenient::text")]
    text: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    message: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    label: Option<String>,
    #[serde(default)]
    avatar: Option<Value>,
    /// milliseconds the client shows a typing indicator
    #[serde(default, deserialize_with = "lenient::millis")]
    typing_delay: Option<u64>,
}

#[async_trait]
impl Action for MessageAction {
    fn create(params: Value) -> Result<Self> {
        parse_params(&Self::schema(), params)
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "text": lenient::text_schema(),
                "message": lenient::text_schema(),
                "label": lenient::text_schema(),
                "typingDelay": lenient::number_schema()
            }
        })
    }

    fn action_type(&self) -> ActionType {
        ActionType::Message
    }

    async fn enter(
        &self,
        ctx: &mut Context,
        links: &Links,
    ) -> Result<ActionOutput> {
        let raw = lenient::non_blank(&self.text)
            .or(lenient::non_blank(&self.message))
            .or(lenient::non_blank(&self.label))
            .unwrap_or(DEFAULT_MESSAGE);

        let output = NodeOutput::Message {
            message: ctx.interpolate(raw),
            avatar: self.avatar.clone().filter(|a| !a.is_null()),
            typing_delay: self.typing_delay.filter(|d| *d > 0).unwrap_or(DEFAULT_TYPING_DELAY_MS),
        };

        Ok(ActionOutput::advance(links.next(), Some(output)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{common::Vars, workflow::actions::test_support};

    async fn render(
        data: Value,
        vars: Vars,
    ) -> NodeOutput {
        let action = MessageAction::create(data).unwrap();
        let mut ctx = test_support::context(vars);
        action.enter(&mut ctx, &Links::Next(None)).await.unwrap().output.unwrap()
    }

    #[tokio::test]
    async fn test_message_field_precedence() {
        let out = render(json!({"text": "", "message": "from message", "label": "Message"}), Vars::new()).await;
        assert_eq!(out.text(), Some("from message"));

        let out = render(json!({"label": "just a label"}), Vars::new()).await;
        assert_eq!(out.text(), Some("just a label"));

        let out = render(json!({}), Vars::new()).await;
        assert_eq!(out.text(), Some("Message not configured"));
    }

    #[tokio::test]
    async fn test_message_interpolates_and_defaults_delay() {
        let out = render(json!({"text": "Hi {{name}}", "typingDelay": "0"}), Vars::new().with("name", "Ada")).await;
        assert_eq!(
            out,
            NodeOutput::Message {
                message: "Hi Ada".to_string(),
                avatar: None,
                typing_delay: 1000,
            }
        );
    }

    #[tokio::test]
    async fn test_message_keeps_typing_delay() {
        let out = render(json!({"text": "x", "typingDelay": 250, "avatar": "bot.png"}), Vars::new()).await;
        assert_eq!(
            out,
            NodeOutput::Message {
                message: "x".to_string(),
                avatar: Some(json!("bot.png")),
                typing_delay: 250,
            }
        );
    }
}

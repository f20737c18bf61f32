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

const DEFAULT_END_MESSAGE: &str = "Conversation finished!";

/// Closes the conversation, optionally with a call to action.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EndAction {
    #[serde(default, deserialize_with = "lenient::text")]
    message: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    cta_label: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    cta_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    show_rating: Option<bool>,
}

#[async_trait]
impl Action for EndAction {
    fn create(params: Value) -> Result<Self> {
        parse_params(&Self::schema(), params)
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "message": lenient::text_schema(),
                "ctaLabel": lenient::text_schema(),
                "ctaUrl": lenient::text_schema(),
                "showRating": lenient::flag_schema()
            }
        })
    }

    fn action_type(&self) -> ActionType {
        ActionType::End
    }

    async fn enter(
        &self,
        ctx: &mut Context,
        _: &Links,
    ) -> Result<ActionOutput> {
        Ok(ActionOutput::terminate(NodeOutput::End {
            message: ctx.interpolate(lenient::non_blank(&self.message).unwrap_or(DEFAULT_END_MESSAGE)),
            cta_label: self.cta_label.clone(),
            cta_url: self.cta_url.clone(),
            show_rating: self.show_rating,
        }))
    }
}

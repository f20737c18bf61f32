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

/// Pause before the next step. The wait is bounded by the delay ceiling.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DelayAction {
    /// milliseconds
    #[serde(default, deserialize_with = "lenient::millis")]
    duration: Option<u64>,
    #[serde(default, deserialize_with = "lenient::text")]
    message: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    show_typing_indicator: Option<bool>,
}

#[async_trait]
impl Action for DelayAction {
    fn create(params: Value) -> Result<Self> {
        parse_params(&Self::schema(), params)
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "duration": lenient::number_schema(),
                "message": lenient::text_schema(),
                "showTypingIndicator": lenient::flag_schema()
            }
        })
    }

    fn action_type(&self) -> ActionType {
        ActionType::Delay
    }

    async fn enter(
        &self,
        ctx: &mut Context,
        links: &Links,
    ) -> Result<ActionOutput> {
        let duration = self.duration.filter(|d| *d > 0).unwrap_or(ctx.config().default_delay_ms);
        tracing::debug!(node_id = %ctx.nid(), duration, waited = ctx.config().clamp_delay(duration), "delay");
        ctx.wait(duration).await;

        let output = NodeOutput::Delay {
            duration,
            message: lenient::non_blank(&self.message).map(|m| ctx.interpolate(m)),
            show_typing_indicator: self.show_typing_indicator,
        };

        Ok(ActionOutput::advance(links.next(), Some(output)))
    }
}

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

const DEFAULT_LANGUAGE: &str = "javascript";

/// Simulated script step. The script body is never evaluated.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ScriptAction {
    #[serde(default, deserialize_with = "lenient::text")]
    language: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    store_result_in: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    result_variable: Option<String>,
}

#[async_trait]
impl Action for ScriptAction {
    fn create(params: Value) -> Result<Self> {
        parse_params(&Self::schema(), params)
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "language": lenient::text_schema(),
                "script": lenient::text_schema(),
                "timeout": lenient::number_schema(),
                "storeResultIn": lenient::text_schema(),
                "resultVariable": lenient::text_schema()
            }
        })
    }

    fn action_type(&self) -> ActionType {
        ActionType::Script
    }

    async fn enter(
        &self,
        ctx: &mut Context,
        links: &Links,
    ) -> Result<ActionOutput> {
        let language = lenient::non_blank(&self.language).unwrap_or(DEFAULT_LANGUAGE).to_string();

        ctx.simulate_latency().await;
        let result = format!("Script {} executed successfully", language);

        if let Some(target) = lenient::non_blank(&self.store_result_in).or(lenient::non_blank(&self.result_variable)) {
            ctx.set_var(target, result.clone());
        }

        Ok(ActionOutput::advance(links.next(), Some(NodeOutput::Script { result, language })))
    }
}

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

const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_PROMPT: &str = "Generate a response";
const PROMPT_PREVIEW_CHARS: usize = 50;

/// Simulated language-model reply. No model is called; the response is a
/// deterministic placeholder built from the model name and prompt.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AiResponseAction {
    #[serde(default, deserialize_with = "lenient::text")]
    prompt_template: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    model: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    store_in: Option<String>,
}

impl AiResponseAction {
    fn simulate(
        model: &str,
        prompt: &str,
    ) -> String {
        let preview: String = prompt.chars().take(PROMPT_PREVIEW_CHARS).collect();
        format!("Simulated AI response ({}) for: \"{}...\"", model, preview)
    }
}

#[async_trait]
impl Action for AiResponseAction {
    fn create(params: Value) -> Result<Self> {
        parse_params(&Self::schema(), params)
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "promptTemplate": lenient::text_schema(),
                "model": lenient::text_schema(),
                "maxTokens": lenient::number_schema(),
                "temperature": lenient::number_schema(),
                "storeIn": lenient::text_schema()
            }
        })
    }

    fn action_type(&self) -> ActionType {
        ActionType::AiResponse
    }

    async fn enter(
        &self,
        ctx: &mut Context,
        links: &Links,
    ) -> Result<ActionOutput> {
        let prompt = ctx.interpolate(lenient::non_blank(&self.prompt_template).unwrap_or(DEFAULT_PROMPT));
        let model = lenient::non_blank(&self.model).unwrap_or(DEFAULT_MODEL).to_string();

        ctx.simulate_latency().await;
        let response = Self::simulate(&model, &prompt);

        if let Some(target) = lenient::non_blank(&self.store_in) {
            ctx.set_var(target, response.clone());
        }

        Ok(ActionOutput::advance(links.next(), Some(NodeOutput::AiResponse { response, model, prompt })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{common::Vars, workflow::actions::test_support};

    #[tokio::test]
    async fn test_simulated_response_is_stored() {
        let action = AiResponseAction::create(json!({"promptTemplate": "Summarize {{topic}}", "storeIn": "answer"})).unwrap();
        let mut ctx = test_support::context(Vars::new().with("topic", "tides"));
        let out = action.enter(&mut ctx, &Links::Next(None)).await.unwrap();

        let expected = "Simulated AI response (gpt-3.5-turbo) for: \"Summarize tides...\"";
        assert_eq!(out.output.as_ref().and_then(|o| o.text()), Some(expected));
        assert_eq!(ctx.vars().get::<String>("answer").as_deref(), Some(expected));
    }

    #[test]
    fn test_prompt_preview_is_truncated() {
        let prompt = "é".repeat(80);
        let response = AiResponseAction::simulate("gpt-4", &prompt);
        assert_eq!(response, format!("Simulated AI response (gpt-4) for: \"{}...\"", "é".repeat(50)));
    }
}

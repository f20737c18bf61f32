use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    ConvoflowError, Result,
    runtime::Context,
    workflow::{
        actions::{Action, ActionOutput, ActionType, lenient, parse_params},
        edge::Links,
        output::NodeOutput,
    },
};

use super::models::ComparisonOperator;

const DEFAULT_OPERATOR: &str = "==";

/// Two-way branch on `variable <operator> value`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ConditionalAction {
    #[serde(default, deserialize_with = "lenient::text")]
    variable: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    operator: Option<String>,
    #[serde(default)]
    value: Option<Value>,
}

#[async_trait]
impl Action for ConditionalAction {
    fn create(params: Value) -> Result<Self> {
        parse_params(&Self::schema(), params)
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "variable": lenient::text_schema(),
                "operator": lenient::text_schema(),
                "value": {}
            }
        })
    }

    fn action_type(&self) -> ActionType {
        ActionType::Conditional
    }

    async fn enter(
        &self,
        ctx: &mut Context,
        links: &Links,
    ) -> Result<ActionOutput> {
        let variable = lenient::non_blank(&self.variable).ok_or_else(|| ConvoflowError::Action("conditional node has no variable".to_string()))?;
        let operator = lenient::non_blank(&self.operator).unwrap_or(DEFAULT_OPERATOR);

        let condition = match operator.parse::<ComparisonOperator>() {
            Ok(op) => op.evaluate(ctx.var(variable), self.value.as_ref()),
            Err(_) => {
                tracing::warn!(node_id = %ctx.nid(), operator, "unknown comparison operator, evaluating to false");
                false
            }
        };

        let output = NodeOutput::Conditional {
            condition,
            variable: variable.to_string(),
            operator: operator.to_string(),
            value: self.value.clone().unwrap_or(Value::Null),
            result: condition,
        };

        Ok(ActionOutput::advance(links.branch(condition), Some(output)))
    }
}

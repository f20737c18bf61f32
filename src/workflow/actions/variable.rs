use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    ConvoflowError, Result,
    runtime::Context,
    workflow::{
        actions::{ActionType, lenient},
        coerce,
        edge::Links,
        output::NodeOutput,
    },
};

use super::{Action, ActionOutput, parse_params};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum VariableOperation {
    Set,
    Get,
    Increment,
    Decrement,
    Append,
    Clear,
}

/// Reads or updates one session variable.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VariableAction {
    #[serde(default, deserialize_with = "lenient::text")]
    operation: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    variable: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    value: Option<String>,
}

impl VariableAction {
    /// Step for increment/decrement; a missing, zero or non-numeric value counts as 1.
    fn step(value: &str) -> f64 {
        let step = coerce::to_number(Some(&Value::String(value.to_string())));
        if step.is_nan() || step == 0.0 { 1.0 } else { step }
    }

    fn current_number(
        ctx: &Context,
        variable: &str,
    ) -> f64 {
        let current = coerce::to_number(ctx.var(variable));
        if current.is_nan() { 0.0 } else { current }
    }
}

#[async_trait]
impl Action for VariableAction {
    fn create(params: Value) -> Result<Self> {
        parse_params(&Self::schema(), params)
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "operation": lenient::text_schema(),
                "variable": lenient::text_schema(),
                "value": lenient::text_schema()
            }
        })
    }

    fn action_type(&self) -> ActionType {
        ActionType::Variable
    }

    async fn enter(
        &self,
        ctx: &mut Context,
        links: &Links,
    ) -> Result<ActionOutput> {
        let variable = lenient::non_blank(&self.variable).ok_or_else(|| ConvoflowError::Action("variable node has no variable name".to_string()))?;
        let operation = lenient::non_blank(&self.operation).unwrap_or(VariableOperation::Set.as_ref());
        let value = ctx.interpolate(self.value.as_deref().unwrap_or_default());

        match operation.parse::<VariableOperation>() {
            Ok(VariableOperation::Set) => ctx.set_var(variable, value),
            Ok(VariableOperation::Get) => {}
            Ok(VariableOperation::Increment) => {
                let next = Self::current_number(ctx, variable) + Self::step(&value);
                ctx.set_var(variable, coerce::number_value(next));
            }
            Ok(VariableOperation::Decrement) => {
                let next = Self::current_number(ctx, variable) - Self::step(&value);
                ctx.set_var(variable, coerce::number_value(next));
            }
            Ok(VariableOperation::Append) => {
                let current = ctx.var(variable).map(coerce::to_text).unwrap_or_default();
                ctx.set_var(variable, format!("{}{}", current, value));
            }
            Ok(VariableOperation::Clear) => ctx.set_var(variable, ""),
            Err(_) => {
                tracing::warn!(node_id = %ctx.nid(), operation, "unknown variable operation, leaving variable unchanged");
            }
        }

        let output = NodeOutput::Variable {
            operation: operation.to_string(),
            variable: variable.to_string(),
            value: ctx.var(variable).cloned().unwrap_or(Value::Null),
        };

        Ok(ActionOutput::advance(links.next(), Some(output)))
    }
}

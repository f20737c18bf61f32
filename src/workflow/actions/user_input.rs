use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    ErrorKind, Result,
    runtime::Context,
    workflow::{
        actions::{ActionType, lenient},
        coerce,
        edge::Links,
        input::UserInput,
        output::NodeOutput,
    },
};

use super::{Action, ActionOutput, parse_params};

const DEFAULT_PLACEHOLDER: &str = "Type your answer:";

static EMAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));
static PHONE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\+?[0-9\s\-().]+$").expect("valid phone pattern"));

/// Kind of field the client renders; decides how the answer is checked.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InputType {
    #[default]
    Text,
    Email,
    Phone,
    Number,
    Password,
}

/// Free-text prompt. Suspends the session until the participant answers.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserInputAction {
    #[serde(default, deserialize_with = "lenient::text")]
    placeholder: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    required: Option<bool>,
    #[serde(default, deserialize_with = "lenient::text")]
    input_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    variable_name: Option<String>,
    /// regex the answer must match
    #[serde(default, deserialize_with = "lenient::text")]
    validation_rule: Option<String>,

    #[serde(skip)]
    rule: Option<Regex>,
}

impl UserInputAction {
    fn input_type(&self) -> InputType {
        lenient::non_blank(&self.input_type).and_then(|t| t.parse().ok()).unwrap_or_default()
    }

    /// Check an answer and convert it to the value that gets stored.
    fn validate(
        &self,
        answer: &str,
    ) -> std::result::Result<Value, (ErrorKind, String)> {
        let trimmed = answer.trim();
        if trimmed.is_empty() {
            if self.required.unwrap_or(false) {
                return Err((ErrorKind::MissingRequiredField, "This field is required".to_string()));
            }
            return Ok(Value::String(answer.to_string()));
        }

        let value = match self.input_type() {
            InputType::Number => match trimmed.parse::<f64>() {
                Ok(n) if n.is_finite() => coerce::number_value(n),
                _ => return Err((ErrorKind::InvalidInput, "Please enter a valid number".to_string())),
            },
            InputType::Email if !EMAIL.is_match(trimmed) => {
                return Err((ErrorKind::InvalidInput, "Please enter a valid email address".to_string()));
            }
            InputType::Phone => {
                let digits = trimmed.chars().filter(char::is_ascii_digit).count();
                if !PHONE.is_match(trimmed) || !(7..=15).contains(&digits) {
                    return Err((ErrorKind::InvalidInput, "Please enter a valid phone number".to_string()));
                }
                Value::String(answer.to_string())
            }
            _ => Value::String(answer.to_string()),
        };

        if self.rule.as_ref().is_some_and(|rule| !rule.is_match(answer)) {
            return Err((ErrorKind::InvalidInput, "The answer does not have the expected format".to_string()));
        }

        Ok(value)
    }
}

#[async_trait]
impl Action for UserInputAction {
    fn create(params: Value) -> Result<Self> {
        let mut action: Self = parse_params(&Self::schema(), params)?;
        action.rule = lenient::non_blank(&action.validation_rule).map(Regex::new).transpose()?;
        Ok(action)
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "placeholder": lenient::text_schema(),
                "required": lenient::flag_schema(),
                "inputType": lenient::text_schema(),
                "variableName": lenient::text_schema(),
                "validationRule": lenient::text_schema()
            }
        })
    }

    fn action_type(&self) -> ActionType {
        ActionType::UserInput
    }

    async fn enter(
        &self,
        ctx: &mut Context,
        _: &Links,
    ) -> Result<ActionOutput> {
        let placeholder = ctx.interpolate(lenient::non_blank(&self.placeholder).unwrap_or(DEFAULT_PLACEHOLDER));

        Ok(ActionOutput::suspend(NodeOutput::UserInput {
            placeholder,
            required: self.required.unwrap_or(false),
            input_type: lenient::non_blank(&self.input_type).unwrap_or(InputType::Text.as_ref()).to_string(),
            variable_name: lenient::non_blank(&self.variable_name).map(str::to_string),
        }))
    }

    async fn resume(
        &self,
        ctx: &mut Context,
        links: &Links,
        input: &UserInput,
    ) -> Result<ActionOutput> {
        let Some(answer) = input.as_text() else {
            return Ok(ActionOutput::reject(ErrorKind::InvalidInput, "Expected a text answer"));
        };

        let value = match self.validate(answer) {
            Ok(value) => value,
            Err((kind, message)) => return Ok(ActionOutput::reject(kind, message)),
        };

        if let Some(name) = lenient::non_blank(&self.variable_name) {
            ctx.set_var(name, value.clone());
        }

        Ok(ActionOutput::advance(links.next(), Some(NodeOutput::UserInputResponse { value })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::Vars,
        workflow::{actions::Step, actions::test_support, input::FileDescriptor},
    };

    fn links() -> Links {
        Links::Next(Some("next".to_string()))
    }

    async fn answer(
        data: Value,
        input: UserInput,
    ) -> (ActionOutput, Vars) {
        let action = UserInputAction::create(data).unwrap();
        let mut ctx = test_support::context(Vars::new());
        let out = action.resume(&mut ctx, &links(), &input).await.unwrap();
        (out, ctx.into_vars())
    }

    #[tokio::test]
    async fn test_enter_suspends_with_prompt() {
        let action = UserInputAction::create(json!({"placeholder": "Name, {{title}}?", "variableName": "name"})).unwrap();
        let mut ctx = test_support::context(Vars::new().with("title", "please"));
        let out = action.enter(&mut ctx, &links()).await.unwrap();

        assert_eq!(out.step, Step::Suspend);
        assert_eq!(
            out.output,
            Some(NodeOutput::UserInput {
                placeholder: "Name, please?".to_string(),
                required: false,
                input_type: "text".to_string(),
                variable_name: Some("name".to_string()),
            })
        );
    }

    #[tokio::test]
    async fn test_resume_binds_variable() {
        let (out, vars) = answer(json!({"variableName": "name"}), UserInput::text("Ada")).await;
        assert_eq!(out.step, Step::Continue(Some("next".to_string())));
        assert_eq!(vars.get::<String>("name").as_deref(), Some("Ada"));
        assert_eq!(out.output, Some(NodeOutput::UserInputResponse { value: json!("Ada") }));
    }

    #[tokio::test]
    async fn test_required_blank_is_rejected_without_write() {
        let (out, vars) = answer(json!({"variableName": "name", "required": true}), UserInput::text("   ")).await;
        assert!(matches!(out.step, Step::Reject(ErrorKind::MissingRequiredField, _)));
        assert!(!vars.contains("name"));
    }

    #[tokio::test]
    async fn test_number_input_is_numeric() {
        let (out, vars) = answer(json!({"variableName": "age", "inputType": "number"}), UserInput::text("36")).await;
        assert_eq!(out.step, Step::Continue(Some("next".to_string())));
        assert_eq!(vars.get_value("age"), Some(&json!(36)));

        let (out, _) = answer(json!({"inputType": "number"}), UserInput::text("thirty")).await;
        assert!(matches!(out.step, Step::Reject(ErrorKind::InvalidInput, _)));
    }

    #[tokio::test]
    async fn test_email_and_phone() {
        let (out, _) = answer(json!({"inputType": "email"}), UserInput::text("ada@example.com")).await;
        assert!(matches!(out.step, Step::Continue(_)));
        let (out, _) = answer(json!({"inputType": "email"}), UserInput::text("ada@")).await;
        assert!(matches!(out.step, Step::Reject(ErrorKind::InvalidInput, _)));

        let (out, _) = answer(json!({"inputType": "phone"}), UserInput::text("+1 (555) 010-9999")).await;
        assert!(matches!(out.step, Step::Continue(_)));
        let (out, _) = answer(json!({"inputType": "phone"}), UserInput::text("12-34")).await;
        assert!(matches!(out.step, Step::Reject(ErrorKind::InvalidInput, _)));
    }

    #[tokio::test]
    async fn test_validation_rule() {
        let data = json!({"validationRule": "^[A-Z]{3}$"});
        let (out, _) = answer(data.clone(), UserInput::text("ABC")).await;
        assert!(matches!(out.step, Step::Continue(_)));
        let (out, _) = answer(data, UserInput::text("abc")).await;
        assert!(matches!(out.step, Step::Reject(ErrorKind::InvalidInput, _)));
    }

    #[test]
    fn test_invalid_rule_fails_create() {
        assert!(UserInputAction::create(json!({"validationRule": "("})).is_err());
    }

    #[tokio::test]
    async fn test_non_text_answer_rejected() {
        let (out, _) = answer(json!({}), UserInput::file(FileDescriptor::new("a.txt"))).await;
        assert!(matches!(out.step, Step::Reject(ErrorKind::InvalidInput, _)));
    }
}

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    ErrorKind, Result,
    runtime::Context,
    workflow::{
        actions::{ActionType, lenient},
        coerce,
        edge::{Links, SourceHandle},
        input::UserInput,
        output::{ChoiceOption, NodeOutput},
    },
};

use super::{Action, ActionOutput, parse_params};

#[derive(Serialize, Deserialize, Debug, Clone)]
struct ChoiceItem {
    #[serde(default, deserialize_with = "lenient::text")]
    label: Option<String>,
    #[serde(default)]
    value: Option<Value>,
}

/// Multiple-choice question. Option `i` leaves through handle `choice-{i}`.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceAction {
    #[serde(default)]
    choices: Option<Vec<ChoiceItem>>,
    #[serde(default, deserialize_with = "lenient::flag")]
    allow_multiple: Option<bool>,
}

impl ChoiceAction {
    fn options(
        &self,
        ctx: &Context,
        links: &Links,
    ) -> Vec<ChoiceOption> {
        self.choices
            .iter()
            .flatten()
            .enumerate()
            .map(|(i, item)| {
                let raw_label = lenient::non_blank(&item.label).map(str::to_string).unwrap_or_else(|| format!("Option {}", i + 1));
                let value = match &item.value {
                    Some(v) if !v.is_null() && v.as_str() != Some("") => v.clone(),
                    _ => Value::String(raw_label.clone()),
                };
                ChoiceOption {
                    label: ctx.interpolate(&raw_label),
                    value,
                    handle: SourceHandle::choice_label(i),
                    next_node_id: links.choice(i),
                }
            })
            .collect()
    }

    /// Position of the option an answer picks, if any.
    fn select(
        options: &[ChoiceOption],
        input: &UserInput,
    ) -> Option<usize> {
        match input {
            UserInput::Choice(selection) => Some(selection.index).filter(|i| *i < options.len()),
            UserInput::Text(text) => {
                let text = text.trim();
                options.iter().position(|o| coerce::to_text(&o.value) == text).or_else(|| options.iter().position(|o| o.label == text))
            }
            UserInput::File(_) => None,
        }
    }
}

#[async_trait]
impl Action for ChoiceAction {
    fn create(params: Value) -> Result<Self> {
        parse_params(&Self::schema(), params)
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "choices": {
                    "type": ["array", "null"],
                    "items": {
                        "type": "object",
                        "properties": {
                            "label": lenient::text_schema(),
                            "value": {}
                        }
                    }
                },
                "allowMultiple": lenient::flag_schema()
            }
        })
    }

    fn action_type(&self) -> ActionType {
        ActionType::Choice
    }

    async fn enter(
        &self,
        ctx: &mut Context,
        links: &Links,
    ) -> Result<ActionOutput> {
        Ok(ActionOutput::suspend(NodeOutput::Choice {
            choices: self.options(ctx, links),
            allow_multiple: self.allow_multiple.unwrap_or(false),
        }))
    }

    async fn resume(
        &self,
        ctx: &mut Context,
        links: &Links,
        input: &UserInput,
    ) -> Result<ActionOutput> {
        let options = self.options(ctx, links);
        let Some(index) = Self::select(&options, input) else {
            return Ok(ActionOutput::reject(ErrorKind::NoMatchingEdge, "The answer matches no option"));
        };

        let choice = options[index].clone();
        let Some(next) = choice.next_node_id.clone() else {
            return Ok(ActionOutput::reject(ErrorKind::NoMatchingEdge, format!("Option '{}' is not connected", choice.label)));
        };

        Ok(ActionOutput::advance(Some(next), Some(NodeOutput::ChoiceResponse { choice })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::Vars,
        workflow::actions::{Step, test_support},
    };

    fn action() -> ChoiceAction {
        ChoiceAction::create(json!({
            "choices": [
                { "label": "Sales", "value": "sales" },
                { "label": "Support" },
                { "label": "" }
            ]
        }))
        .unwrap()
    }

    fn links() -> Links {
        Links::Choice {
            by_index: vec![Some("a".to_string()), Some("b".to_string()), None],
        }
    }

    #[tokio::test]
    async fn test_enter_lists_options() {
        let mut ctx = test_support::context(Vars::new());
        let out = action().enter(&mut ctx, &links()).await.unwrap();
        assert_eq!(out.step, Step::Suspend);

        let Some(NodeOutput::Choice { choices, allow_multiple }) = out.output else {
            panic!("expected choice output");
        };
        assert!(!allow_multiple);
        assert_eq!(choices.len(), 3);
        assert_eq!(choices[1].value, json!("Support"));
        assert_eq!(choices[1].handle, "choice-1");
        assert_eq!(choices[2].label, "Option 3");
        assert_eq!(choices[0].next_node_id.as_deref(), Some("a"));
        assert_eq!(choices[2].next_node_id, None);
    }

    #[tokio::test]
    async fn test_select_by_index_and_text() {
        let mut ctx = test_support::context(Vars::new());

        let out = action().resume(&mut ctx, &links(), &UserInput::choice(1)).await.unwrap();
        assert_eq!(out.step, Step::Continue(Some("b".to_string())));

        let out = action().resume(&mut ctx, &links(), &UserInput::text("sales")).await.unwrap();
        assert_eq!(out.step, Step::Continue(Some("a".to_string())));

        let out = action().resume(&mut ctx, &links(), &UserInput::text("Support")).await.unwrap();
        assert_eq!(out.step, Step::Continue(Some("b".to_string())));
    }

    #[tokio::test]
    async fn test_unmatched_or_unconnected() {
        let mut ctx = test_support::context(Vars::new());

        let out = action().resume(&mut ctx, &links(), &UserInput::choice(7)).await.unwrap();
        assert!(matches!(out.step, Step::Reject(ErrorKind::NoMatchingEdge, _)));

        let out = action().resume(&mut ctx, &links(), &UserInput::choice(2)).await.unwrap();
        assert!(matches!(out.step, Step::Reject(ErrorKind::NoMatchingEdge, _)));

        let out = action().resume(&mut ctx, &links(), &UserInput::text("nobody")).await.unwrap();
        assert!(matches!(out.step, Step::Reject(ErrorKind::NoMatchingEdge, _)));
    }
}

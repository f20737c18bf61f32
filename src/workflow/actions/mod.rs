pub mod ai_response;
pub mod api_request;
pub mod choice;
pub mod conditional;
pub mod database;
pub mod delay;
pub mod end;
pub mod file_upload;
mod lenient;
pub mod media;
pub mod message;
pub mod script;
pub mod start;
pub mod user_input;
pub mod variable;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    ConvoflowError, ErrorKind, Result,
    runtime::Context,
    workflow::{edge::Links, input::UserInput, node::NodeId, output::NodeOutput},
};

pub use ai_response::AiResponseAction;
pub use api_request::ApiRequestAction;
pub use choice::ChoiceAction;
pub use conditional::ConditionalAction;
pub use database::DatabaseAction;
pub use delay::DelayAction;
pub use end::EndAction;
pub use file_upload::FileUploadAction;
pub use media::{ImageAction, VideoAction};
pub use message::MessageAction;
pub use script::ScriptAction;
pub use start::StartAction;
pub use user_input::UserInputAction;
pub use variable::VariableAction;

/// Node type tags understood by the engine.
///
/// `text` and `input` are older editor tags for `message` and `user-input`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ActionType {
    Start,
    #[serde(alias = "text")]
    #[strum(to_string = "message", serialize = "text")]
    Message,
    #[serde(alias = "input")]
    #[strum(to_string = "user-input", serialize = "input")]
    UserInput,
    Choice,
    Conditional,
    Variable,
    Delay,
    Image,
    Video,
    End,
    AiResponse,
    ApiRequest,
    Database,
    Script,
    FileUpload,
}

impl ActionType {
    /// Whether entering a node of this type waits for the participant.
    pub fn is_interactive(&self) -> bool {
        matches!(self, ActionType::UserInput | ActionType::Choice | ActionType::FileUpload)
    }
}

#[async_trait]
pub trait Action: Send + Sync {
    /// Creates a new instance of the action from the node's data.
    ///
    /// # Arguments
    ///
    /// * `params` - The node's [`serde_json::Value`] configuration payload.
    ///
    /// # Returns
    ///
    /// Returns a [`Result`] containing the created action instance.
    fn create(params: Value) -> Result<Self>
    where
        Self: Sized;

    /// Returns the JSON schema the node's data must satisfy.
    fn schema() -> Value
    where
        Self: Sized;

    /// Returns the [`ActionType`] of the action.
    fn action_type(&self) -> ActionType;

    /// Runs when the session enters the node.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The step [`Context`], holding a scratch copy of the variables.
    /// * `links` - The node's resolved outgoing connections.
    async fn enter(
        &self,
        ctx: &mut Context,
        links: &Links,
    ) -> Result<ActionOutput>;

    /// Runs when the participant answers a node that suspended.
    ///
    /// Non-interactive nodes never suspend, so the default refuses input.
    async fn resume(
        &self,
        _ctx: &mut Context,
        _links: &Links,
        _input: &UserInput,
    ) -> Result<ActionOutput> {
        Err(ConvoflowError::Action(format!("{} nodes do not accept input", self.action_type().as_ref())))
    }
}

/// What the driver should do after a handler returns.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Move on; `None` when no edge leaves through the chosen output.
    Continue(Option<NodeId>),
    /// Wait for the participant.
    Suspend,
    /// The conversation is over.
    Terminate,
    /// The answer was refused; the node keeps waiting.
    Reject(ErrorKind, String),
}

/// Output returned by an action's enter or resume method
#[derive(Debug, Clone)]
pub struct ActionOutput {
    pub step: Step,
    pub output: Option<NodeOutput>,
}

impl ActionOutput {
    pub fn advance(
        next: Option<NodeId>,
        output: Option<NodeOutput>,
    ) -> Self {
        Self {
            step: Step::Continue(next),
            output,
        }
    }

    pub fn suspend(output: NodeOutput) -> Self {
        Self {
            step: Step::Suspend,
            output: Some(output),
        }
    }

    pub fn terminate(output: NodeOutput) -> Self {
        Self {
            step: Step::Terminate,
            output: Some(output),
        }
    }

    pub fn reject(
        kind: ErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            step: Step::Reject(kind, message.into()),
            output: None,
        }
    }
}

/// Build the handler for `uses` from the node's data.
pub fn create_action(
    uses: ActionType,
    params: Value,
) -> Result<Box<dyn Action>> {
    let action: Box<dyn Action> = match uses {
        ActionType::Start => Box::new(StartAction::create(params)?),
        ActionType::Message => Box::new(MessageAction::create(params)?),
        ActionType::UserInput => Box::new(UserInputAction::create(params)?),
        ActionType::Choice => Box::new(ChoiceAction::create(params)?),
        ActionType::Conditional => Box::new(ConditionalAction::create(params)?),
        ActionType::Variable => Box::new(VariableAction::create(params)?),
        ActionType::Delay => Box::new(DelayAction::create(params)?),
        ActionType::Image => Box::new(ImageAction::create(params)?),
        ActionType::Video => Box::new(VideoAction::create(params)?),
        ActionType::End => Box::new(EndAction::create(params)?),
        ActionType::AiResponse => Box::new(AiResponseAction::create(params)?),
        ActionType::ApiRequest => Box::new(ApiRequestAction::create(params)?),
        ActionType::Database => Box::new(DatabaseAction::create(params)?),
        ActionType::Script => Box::new(ScriptAction::create(params)?),
        ActionType::FileUpload => Box::new(FileUploadAction::create(params)?),
    };
    Ok(action)
}

/// Validate `params` against `schema` and deserialize it.
pub(crate) fn parse_params<T: serde::de::DeserializeOwned>(
    schema: &Value,
    params: Value,
) -> Result<T> {
    jsonschema::validate(schema, &params)?;
    let action = serde_json::from_value::<T>(params)?;
    Ok(action)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::{Value, json};

    use super::{Action, ActionOutput, ActionType};
    use crate::{Config, Result, common::Vars, runtime::Context, workflow::edge::Links};

    pub fn context(vars: Vars) -> Context {
        Context::new("sid".to_string(), "u1".to_string(), "n1".to_string(), vars, Arc::new(Config::default()))
    }

    /// Handler that panics after touching the variables.
    pub struct PanickingAction;

    #[async_trait]
    impl Action for PanickingAction {
        fn create(_: Value) -> Result<Self> {
            Ok(PanickingAction)
        }

        fn schema() -> Value {
            json!({})
        }

        fn action_type(&self) -> ActionType {
            ActionType::Script
        }

        async fn enter(
            &self,
            ctx: &mut Context,
            _: &Links,
        ) -> Result<ActionOutput> {
            ctx.set_var("a", "overwritten");
            panic!("handler blew up");
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_action_type_tags() {
        assert_eq!("text".parse::<ActionType>().unwrap(), ActionType::Message);
        assert_eq!("input".parse::<ActionType>().unwrap(), ActionType::UserInput);
        assert_eq!("file-upload".parse::<ActionType>().unwrap(), ActionType::FileUpload);
        assert_eq!(ActionType::Message.as_ref(), "message");
        assert_eq!(ActionType::AiResponse.as_ref(), "ai-response");
        assert!("carousel".parse::<ActionType>().is_err());
        assert!(ActionType::Choice.is_interactive());
        assert!(!ActionType::Delay.is_interactive());
    }

    #[test]
    fn test_create_rejects_bad_shape() {
        let err = create_action(ActionType::Delay, json!({"duration": "soon"})).err();
        assert!(matches!(err, Some(ConvoflowError::Node(_))));

        assert!(create_action(ActionType::Delay, json!({"duration": "1500"})).is_ok());
    }

    #[tokio::test]
    async fn test_non_interactive_refuses_input() {
        let action = create_action(ActionType::Start, json!({})).unwrap();
        let mut ctx = test_support::context(crate::common::Vars::new());
        let res = action.resume(&mut ctx, &Links::Next(None), &UserInput::text("x")).await;
        assert!(res.is_err());
    }
}

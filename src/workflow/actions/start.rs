use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    Result,
    runtime::Context,
    workflow::{actions::ActionType, edge::Links},
};

use super::{Action, ActionOutput};

/// Entry point of a flow. Produces no output and follows its first edge.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StartAction;

#[async_trait]
impl Action for StartAction {
    fn create(_: Value) -> Result<Self> {
        Ok(StartAction)
    }

    fn schema() -> Value {
        json!({})
    }

    fn action_type(&self) -> ActionType {
        ActionType::Start
    }

    async fn enter(
        &self,
        _: &mut Context,
        links: &Links,
    ) -> Result<ActionOutput> {
        Ok(ActionOutput::advance(links.next(), None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{common::Vars, workflow::actions::{Step, test_support}};

    #[tokio::test]
    async fn test_start_follows_first_edge() {
        let mut ctx = test_support::context(Vars::new());
        let out = StartAction.enter(&mut ctx, &Links::Next(Some("n2".to_string()))).await.unwrap();
        assert_eq!(out.step, Step::Continue(Some("n2".to_string())));
        assert!(out.output.is_none());
    }
}

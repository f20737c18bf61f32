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

const DEFAULT_OPERATION: &str = "select";

/// Simulated database query returning one canned row.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseAction {
    #[serde(default, deserialize_with = "lenient::text")]
    query: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    operation: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    store_result_in: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    result_variable: Option<String>,
}

#[async_trait]
impl Action for DatabaseAction {
    fn create(params: Value) -> Result<Self> {
        parse_params(&Self::schema(), params)
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": lenient::text_schema(),
                "operation": lenient::text_schema(),
                "dbType": lenient::text_schema(),
                "collection": lenient::text_schema(),
                "storeResultIn": lenient::text_schema(),
                "resultVariable": lenient::text_schema()
            }
        })
    }

    fn action_type(&self) -> ActionType {
        ActionType::Database
    }

    async fn enter(
        &self,
        ctx: &mut Context,
        links: &Links,
    ) -> Result<ActionOutput> {
        let query = ctx.interpolate(self.query.as_deref().unwrap_or_default());
        let operation = lenient::non_blank(&self.operation).unwrap_or(DEFAULT_OPERATION).to_string();

        ctx.simulate_latency().await;
        let result = json!({
            "rows": [{ "id": 1, "name": "Simulated result" }],
            "rowCount": 1
        });

        if let Some(target) = lenient::non_blank(&self.store_result_in).or(lenient::non_blank(&self.result_variable)) {
            ctx.set_var(target, result.clone());
        }

        Ok(ActionOutput::advance(links.next(), Some(NodeOutput::Database { result, query, operation })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{common::Vars, workflow::actions::test_support};

    #[tokio::test]
    async fn test_simulated_rows() {
        let action = DatabaseAction::create(json!({"query": "SELECT * FROM users WHERE id = {{uid}}", "resultVariable": "rows"})).unwrap();
        let mut ctx = test_support::context(Vars::new().with("uid", 3));
        let out = action.enter(&mut ctx, &Links::Next(None)).await.unwrap();

        assert_eq!(ctx.vars().get_value("rows").and_then(|r| r.get("rowCount")), Some(&json!(1)));
        let Some(NodeOutput::Database { query, operation, .. }) = out.output else {
            panic!("expected database output");
        };
        assert_eq!(query, "SELECT * FROM users WHERE id = 3");
        assert_eq!(operation, "select");
    }
}

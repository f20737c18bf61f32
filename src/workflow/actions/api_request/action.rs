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

use super::models::HttpRequestMethod;

/// Simulated HTTP call. Nothing leaves the process: a request with a URL
/// "succeeds" with a canned body, one without a URL fails with a 400.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ApiRequestAction {
    #[serde(default, deserialize_with = "lenient::text")]
    method: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    url: Option<String>,
    #[serde(default)]
    headers: Option<Value>,
    #[serde(default, deserialize_with = "lenient::text")]
    store_response_in: Option<String>,
    /// older editor name for `storeResponseIn`
    #[serde(default, deserialize_with = "lenient::text")]
    response_variable: Option<String>,
}

impl ApiRequestAction {
    fn simulate(
        method: HttpRequestMethod,
        url: &str,
    ) -> Value {
        if url.trim().is_empty() {
            return json!({
                "status": 400,
                "data": { "message": "Simulated request has no URL" }
            });
        }

        json!({
            "status": 200,
            "data": { "message": format!("Simulated response from {} {}", method.as_ref(), url) }
        })
    }
}

#[async_trait]
impl Action for ApiRequestAction {
    fn create(params: Value) -> Result<Self> {
        parse_params(&Self::schema(), params)
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "method": lenient::text_schema(),
                "url": lenient::text_schema(),
                "headers": {
                    "type": ["object", "null"],
                    "additionalProperties": lenient::text_schema()
                },
                "storeResponseIn": lenient::text_schema(),
                "responseVariable": lenient::text_schema()
            }
        })
    }

    fn action_type(&self) -> ActionType {
        ActionType::ApiRequest
    }

    async fn enter(
        &self,
        ctx: &mut Context,
        links: &Links,
    ) -> Result<ActionOutput> {
        let method = match lenient::non_blank(&self.method) {
            Some(m) => m.parse::<HttpRequestMethod>().map_err(|_| ConvoflowError::Action(format!("unsupported HTTP method: {}", m)))?,
            None => HttpRequestMethod::default(),
        };
        let url = ctx.interpolate(self.url.as_deref().unwrap_or_default());
        let headers = self.headers.as_ref().filter(|h| !h.is_null()).map(|h| ctx.interpolate_json(h));

        ctx.simulate_latency().await;
        let response = Self::simulate(method, &url);
        let succeeded = response["status"] == 200;

        if succeeded {
            let target = lenient::non_blank(&self.store_response_in).or(lenient::non_blank(&self.response_variable));
            if let Some(target) = target {
                ctx.set_var(target, response["data"].clone());
            }
        } else {
            tracing::warn!(node_id = %ctx.nid(), method = method.as_ref(), "simulated request failed, taking the error route");
        }

        let output = NodeOutput::ApiRequest {
            response,
            method: method.as_ref().to_string(),
            url,
            headers,
        };

        Ok(ActionOutput::advance(links.request(succeeded), Some(output)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::Vars,
        workflow::actions::{Step, test_support},
    };

    fn links() -> Links {
        Links::Request {
            on_success: Some("ok".to_string()),
            on_error: Some("failed".to_string()),
        }
    }

    #[tokio::test]
    async fn test_success_route_and_store() {
        let action = ApiRequestAction::create(json!({
            "method": "post",
            "url": "https://api.example.com/users/{{uid}}",
            "headers": { "Authorization": "Bearer {{token}}" },
            "responseVariable": "api"
        }))
        .unwrap();
        let mut ctx = test_support::context(Vars::new().with("uid", 9).with("token", "t0k"));
        let out = action.enter(&mut ctx, &links()).await.unwrap();

        assert_eq!(out.step, Step::Continue(Some("ok".to_string())));
        assert_eq!(
            ctx.vars().get_value("api"),
            Some(&json!({"message": "Simulated response from POST https://api.example.com/users/9"}))
        );
        let Some(NodeOutput::ApiRequest { headers, method, .. }) = out.output else {
            panic!("expected api-request output");
        };
        assert_eq!(method, "POST");
        assert_eq!(headers, Some(json!({"Authorization": "Bearer t0k"})));
    }

    #[tokio::test]
    async fn test_empty_url_takes_error_route() {
        let action = ApiRequestAction::create(json!({"url": "{{missing}}", "storeResponseIn": "api"})).unwrap();
        let mut ctx = test_support::context(Vars::new());
        let out = action.enter(&mut ctx, &links()).await.unwrap();

        // an unbound placeholder stays verbatim, so the URL is not empty
        assert_eq!(out.step, Step::Continue(Some("ok".to_string())));

        let action = ApiRequestAction::create(json!({"storeResponseIn": "api"})).unwrap();
        let mut ctx = test_support::context(Vars::new());
        let out = action.enter(&mut ctx, &links()).await.unwrap();
        assert_eq!(out.step, Step::Continue(Some("failed".to_string())));
        assert!(!ctx.vars().contains("api"));
    }

    #[tokio::test]
    async fn test_unknown_method_fails() {
        let action = ApiRequestAction::create(json!({"method": "FETCH", "url": "x"})).unwrap();
        let mut ctx = test_support::context(Vars::new());
        assert!(action.enter(&mut ctx, &links()).await.is_err());
    }
}

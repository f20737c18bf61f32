use std::{sync::Arc, time::Duration};

use serde_json::Value;

use crate::{
    Config,
    common::Vars,
    runtime::SessionId,
    workflow::{node::NodeId, template},
};

/// Everything a handler may see while it runs one step.
///
/// The variables are a scratch copy of the session's; the driver commits
/// them back only when the step succeeds.
pub struct Context {
    sid: SessionId,
    user_id: String,
    nid: NodeId,
    vars: Vars,
    config: Arc<Config>,
}

impl Context {
    pub fn new(
        sid: SessionId,
        user_id: String,
        nid: NodeId,
        vars: Vars,
        config: Arc<Config>,
    ) -> Self {
        Self {
            sid,
            user_id,
            nid,
            vars,
            config,
        }
    }

    pub fn sid(&self) -> &str {
        &self.sid
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn nid(&self) -> &str {
        &self.nid
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn vars(&self) -> &Vars {
        &self.vars
    }

    pub fn var(
        &self,
        name: &str,
    ) -> Option<&Value> {
        self.vars.get_value(name)
    }

    pub fn set_var<V: Into<Value>>(
        &mut self,
        name: &str,
        value: V,
    ) {
        self.vars.set(name, value);
    }

    /// Resolve `{{name}}` placeholders against the session variables.
    pub fn interpolate(
        &self,
        text: &str,
    ) -> String {
        template::interpolate(&self.vars, text)
    }

    pub fn interpolate_json(
        &self,
        value: &Value,
    ) -> Value {
        template::interpolate_json(&self.vars, value)
    }

    /// Wait up to `millis`, bounded by the configured delay ceiling.
    pub async fn wait(
        &self,
        millis: u64,
    ) {
        let millis = self.config.clamp_delay(millis);
        if millis == 0 {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }
    }

    /// Stand-in for the latency of a simulated external call.
    pub async fn simulate_latency(&self) {
        self.wait(self.config.simulated_latency_ms).await;
    }

    pub fn into_vars(self) -> Vars {
        self.vars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(vars: Vars) -> Context {
        Context::new("sid".to_string(), "u1".to_string(), "n1".to_string(), vars, Arc::new(Config::default()))
    }

    #[test]
    fn test_context_scratch_vars() {
        let mut ctx = context(Vars::new().with("name", "Ada"));
        ctx.set_var("age", 36);

        assert_eq!(ctx.interpolate("{{name}} is {{age}}"), "Ada is 36");
        let vars = ctx.into_vars();
        assert_eq!(vars.get::<i64>("age"), Some(36));
    }

    #[tokio::test]
    async fn test_wait_is_clamped() {
        let mut config = Config::default();
        config.delay_ceiling_ms = 5;
        let ctx = Context::new("sid".to_string(), "u1".to_string(), "n1".to_string(), Vars::new(), Arc::new(config));

        let started = std::time::Instant::now();
        ctx.wait(60_000).await;
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}

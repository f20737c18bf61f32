//! Flow engine - the main entry point for Convoflow.
//!
//! The engine hosts many sessions at once:
//! - Deploying flow definitions, compiled once and shared read-only
//! - Creating sessions for a participant and stepping them
//! - Owning the event channel every session publishes to

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    Config, ConvoflowError, FlowModel, Result,
    common::MemCache,
    runtime::{Channel, Session, SessionHandle, SessionId, Turn},
    workflow::{Flow, input::UserInput},
};

/// The main flow engine.
///
/// # Example
///
/// ```rust,ignore
/// let engine = EngineBuilder::new().build()?;
///
/// // Deploy a flow
/// engine.deploy(&flow_model)?;
///
/// // Create and run a session
/// let sid = engine.create_session(&flow_model.id, "participant-1")?;
/// let turn = engine.start(&sid).await?;
/// ```
pub struct Engine {
    config: Arc<Config>,
    /// Event channel shared by every session.
    channel: Arc<Channel>,
    /// Compiled flows by flow id.
    flows: MemCache<String, Arc<Flow>>,
    /// Live sessions by session id.
    sessions: MemCache<SessionId, SessionHandle>,
}

impl Engine {
    pub fn new_with_config(config: Config) -> Self {
        Self::with_channel(config, Arc::new(Channel::new()))
    }

    pub(crate) fn with_channel(
        config: Config,
        channel: Arc<Channel>,
    ) -> Self {
        Self {
            flows: MemCache::new(config.flow_capacity),
            sessions: MemCache::new(config.session_capacity),
            config: Arc::new(config),
            channel,
        }
    }

    /// Compiles a flow definition and makes it available to new sessions.
    ///
    /// Deploying an id again replaces the flow for sessions created
    /// afterwards; running sessions keep the graph they started with.
    pub fn deploy(
        &self,
        model: &FlowModel,
    ) -> Result<Arc<Flow>> {
        if model.id.trim().is_empty() {
            return Err(ConvoflowError::Flow("flow id is required to deploy".to_string()));
        }

        let flow = Arc::new(Flow::try_from(model)?);
        tracing::info!(flow_id = %model.id, nodes = flow.node_count(), edges = flow.edge_count(), "flow deployed");
        self.flows.set(model.id.clone(), flow.clone());

        Ok(flow)
    }

    pub fn flow(
        &self,
        flow_id: &str,
    ) -> Option<Arc<Flow>> {
        self.flows.get(&flow_id.to_string())
    }

    /// Creates an idle session of a deployed flow and returns its id.
    pub fn create_session(
        &self,
        flow_id: &str,
        user_id: &str,
    ) -> Result<SessionId> {
        let flow = self.flow(flow_id).ok_or_else(|| ConvoflowError::Engine(format!("flow {} not deployed", flow_id)))?;

        let session = Session::with_options(flow, user_id, self.config.clone(), self.channel.clone());
        let sid = session.id().to_string();
        if self.sessions.contains(&sid) {
            return Err(ConvoflowError::Session(format!("session {} already exists", sid)));
        }

        tracing::debug!(session_id = %sid, flow_id, user_id, "session created");
        self.sessions.set(sid.clone(), Arc::new(Mutex::new(session)));

        Ok(sid)
    }

    pub fn session(
        &self,
        sid: &str,
    ) -> Option<SessionHandle> {
        self.sessions.get(&sid.to_string())
    }

    pub async fn start(
        &self,
        sid: &str,
    ) -> Result<Turn> {
        let session = self.find(sid)?;
        let mut session = session.lock().await;
        Ok(session.start().await)
    }

    pub async fn resume(
        &self,
        sid: &str,
        input: Option<UserInput>,
    ) -> Result<Turn> {
        let session = self.find(sid)?;
        let mut session = session.lock().await;
        Ok(session.resume(input).await)
    }

    /// Drops a session. Returns whether it existed.
    pub fn discard(
        &self,
        sid: &str,
    ) -> bool {
        let removed = self.sessions.remove(&sid.to_string()).is_some();
        if removed {
            tracing::debug!(session_id = %sid, "session discarded");
        }
        removed
    }

    pub fn config(&self) -> Arc<Config> {
        self.config.clone()
    }

    /// Returns a reference to the event channel.
    pub fn channel(&self) -> Arc<Channel> {
        self.channel.clone()
    }

    fn find(
        &self,
        sid: &str,
    ) -> Result<SessionHandle> {
        self.session(sid).ok_or_else(|| ConvoflowError::Engine(format!("session {} not found", sid)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> FlowModel {
        FlowModel::from_json(
            r#"{
                "id": "hello",
                "nodes": [
                    { "id": "s", "type": "start", "data": {} },
                    { "id": "m", "type": "message", "data": { "text": "Hello" } }
                ],
                "edges": [{ "id": "e1", "source": "s", "target": "m" }]
            }"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_engine_session_lifecycle() {
        let engine = Engine::new_with_config(Config::default());
        engine.deploy(&model()).unwrap();
        assert!(engine.flow("hello").is_some());

        let sid = engine.create_session("hello", "u1").unwrap();
        let turn = engine.start(&sid).await.unwrap();
        assert!(turn.finished());
        assert_eq!(turn.texts(), vec!["Hello"]);

        assert!(engine.discard(&sid));
        assert!(!engine.discard(&sid));
        assert!(engine.start(&sid).await.is_err());
    }

    #[test]
    fn test_unknown_flow() {
        let engine = Engine::new_with_config(Config::default());
        assert!(engine.create_session("missing", "u1").is_err());
    }

    #[test]
    fn test_deploy_requires_id() {
        let engine = Engine::new_with_config(Config::default());
        let mut model = model();
        model.id = " ".to_string();
        assert!(engine.deploy(&model).is_err());
    }
}

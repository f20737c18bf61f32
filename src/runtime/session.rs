//! Traversal driver for one participant's run through a flow.
//!
//! A session moves through `Idle -> Running -> AwaitingInput` and ends in
//! `Finished` or `Errored`. Every inbound call returns a [`Turn`]; nothing
//! that goes wrong while stepping is raised as a Rust error.

use std::{any::Any, panic::AssertUnwindSafe, sync::Arc};

use futures::FutureExt;
use serde::{Deserialize, Serialize};

use crate::{
    Config, ConvoflowError, ErrorKind,
    common::Vars,
    events::{ErrorReason, FlowEvent, Message, NodeEvent, SessionEvent},
    runtime::{Channel, Context, ExecutionOutcome, HistoryEntry, Turn},
    utils,
    workflow::{
        Flow,
        actions::{ActionOutput, Step},
        input::UserInput,
        node::{Node, NodeId},
        output::NodeOutput,
    },
};

pub type SessionId = String;

/// Shared handle the engine gives out. The mutex serializes steps.
pub type SessionHandle = Arc<tokio::sync::Mutex<Session>>;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionState {
    Idle,
    Running,
    AwaitingInput,
    Finished,
    Errored,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Finished | SessionState::Errored)
    }
}

pub struct Session {
    id: SessionId,
    user_id: String,
    flow: Arc<Flow>,
    config: Arc<Config>,
    channel: Arc<Channel>,

    state: SessionState,
    vars: Vars,
    /// node awaiting resumption, or the last node entered while running
    current: Option<NodeId>,
    /// target of an edge not yet followed in manual stepping mode
    pending: Option<NodeId>,
    history: Vec<HistoryEntry>,
}

impl Session {
    pub fn new(
        flow: Arc<Flow>,
        user_id: impl Into<String>,
    ) -> Self {
        Self::with_options(flow, user_id, Arc::new(Config::default()), Arc::new(Channel::new()))
    }

    pub fn with_options(
        flow: Arc<Flow>,
        user_id: impl Into<String>,
        config: Arc<Config>,
        channel: Arc<Channel>,
    ) -> Self {
        Self {
            id: utils::longid(),
            user_id: user_id.into(),
            flow,
            config,
            channel,
            state: SessionState::Idle,
            vars: Vars::new(),
            current: None,
            pending: None,
            history: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn flow(&self) -> &Flow {
        &self.flow
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn current_node_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Snapshot of the session variables.
    pub fn variables(&self) -> Vars {
        self.vars.clone()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Enter the flow's start node and run until input is needed or the
    /// run ends.
    pub async fn start(&mut self) -> Turn {
        let mut turn = Turn::new();
        if self.state != SessionState::Idle {
            turn.push(self.invalid_state("start"));
            return turn;
        }

        let Some(start) = self.flow.start_node().map(|node| node.id.clone()) else {
            tracing::warn!(session_id = %self.id, flow_id = %self.flow.id(), "flow has no start node");
            turn.push(self.fail(None, ErrorKind::NoStartNode, "flow has no start node"));
            return turn;
        };

        tracing::info!(session_id = %self.id, user_id = %self.user_id, flow_id = %self.flow.id(), "session started");
        self.state = SessionState::Running;
        self.emit("", FlowEvent::Session(SessionEvent::Started(utils::time::time_millis())));

        self.drive(start, &mut turn).await;
        turn
    }

    /// Answer the node the session is waiting on.
    ///
    /// `None` is not an answer: it asks the driver to follow a pending edge
    /// and is handled by [`Session::resume_auto`].
    pub async fn resume(
        &mut self,
        input: Option<UserInput>,
    ) -> Turn {
        let Some(input) = input else {
            return self.resume_auto().await;
        };

        let mut turn = Turn::new();
        let Some(nid) = self.current.clone().filter(|_| self.state == SessionState::AwaitingInput) else {
            turn.push(self.invalid_state("resume"));
            return turn;
        };

        self.history.push(HistoryEntry::answered(&nid, input.to_value()));
        self.emit(&nid, FlowEvent::Node(NodeEvent::Resumed(utils::time::time_millis())));

        let flow = self.flow.clone();
        let Some(node) = flow.node(&nid) else {
            turn.push(self.fail(Some(&nid), ErrorKind::NodeNotFound, format!("node '{}' not found", nid)));
            return turn;
        };

        self.state = SessionState::Running;
        let (result, vars) = self.invoke(node, Some(&input)).await;
        let out = match result {
            Ok(out) => out,
            Err((kind, message)) => {
                turn.push(self.fail(Some(&nid), kind, message));
                return turn;
            }
        };

        if let Step::Reject(kind, message) = &out.step {
            tracing::debug!(session_id = %self.id, node_id = %nid, kind = %kind, "answer rejected");
            self.state = SessionState::AwaitingInput;
            self.emit(&nid, FlowEvent::Node(NodeEvent::Rejected(ErrorReason::new(*kind, message.clone()))));
            turn.push(ExecutionOutcome::rejected(&nid, *kind, message.clone()));
            return turn;
        }

        self.commit(&nid, vars, out.output.clone());
        let outcome = self.settle(&nid, out);
        let follow = outcome.next_node_id.clone();
        turn.push(outcome);

        if let Some(next) = follow {
            if self.config.auto_advance {
                self.drive(next, &mut turn).await;
            } else {
                self.pending = Some(next);
            }
        }
        turn
    }

    /// Follow the edge left pending by manual stepping.
    pub async fn resume_auto(&mut self) -> Turn {
        let mut turn = Turn::new();
        let pending = if self.state == SessionState::Running { self.pending.take() } else { None };
        let Some(next) = pending else {
            turn.push(self.invalid_state("auto-advance"));
            return turn;
        };

        self.drive(next, &mut turn).await;
        turn
    }

    /// Enter `first`, then keep following `Continue` edges until the run
    /// stops. The first entry is not counted against the loop guard.
    async fn drive(
        &mut self,
        first: NodeId,
        turn: &mut Turn,
    ) {
        let mut next = first;
        let mut auto_steps = 0;

        loop {
            let outcome = self.enter(&next).await;
            let follow = outcome.next_node_id.clone();
            turn.push(outcome);

            let Some(target) = follow else {
                return;
            };

            if !self.config.auto_advance {
                self.pending = Some(target);
                return;
            }

            if auto_steps >= self.config.max_auto_steps {
                let message = format!("loop guard tripped after {} consecutive autonomous steps", auto_steps);
                tracing::warn!(session_id = %self.id, node_id = %target, max_auto_steps = self.config.max_auto_steps, "infinite loop detected");
                let last = self.current.clone();
                turn.push(self.fail(last.as_deref(), ErrorKind::LoopGuardTripped, message));
                return;
            }

            auto_steps += 1;
            next = target;
        }
    }

    /// Run one node's entry branch and apply the result.
    async fn enter(
        &mut self,
        nid: &str,
    ) -> ExecutionOutcome {
        let flow = self.flow.clone();
        let Some(node) = flow.node(nid) else {
            return self.fail(Some(nid), ErrorKind::NodeNotFound, format!("node '{}' not found", nid));
        };

        tracing::debug!(session_id = %self.id, node_id = %nid, node_type = %node.type_tag, "entering node");
        self.current = Some(nid.to_string());
        self.history.push(HistoryEntry::entered(nid));
        self.emit(nid, FlowEvent::Node(NodeEvent::Entered(utils::time::time_millis())));

        let (result, vars) = self.invoke(node, None).await;
        match result {
            Ok(out) => {
                self.commit(nid, vars, out.output.clone());
                self.settle(nid, out)
            }
            Err((kind, message)) => self.fail(Some(nid), kind, message),
        }
    }

    /// Call the node's handler on a scratch copy of the variables.
    ///
    /// Errors and panics both come back as `(kind, message)`.
    async fn invoke(
        &self,
        node: &Node,
        input: Option<&UserInput>,
    ) -> (std::result::Result<ActionOutput, (ErrorKind, String)>, Vars) {
        let mut ctx = Context::new(self.id.clone(), self.user_id.clone(), node.id.clone(), self.vars.clone(), self.config.clone());

        let result = match node.action() {
            Ok(action) => {
                let call = async {
                    match input {
                        Some(input) => action.resume(&mut ctx, &node.links, input).await,
                        None => action.enter(&mut ctx, &node.links).await,
                    }
                };
                match AssertUnwindSafe(call).catch_unwind().await {
                    Ok(result) => result,
                    Err(panic) => Err(ConvoflowError::Action(format!("handler panicked: {}", panic_message(panic.as_ref())))),
                }
            }
            Err(e) => Err(e),
        };

        let result = result.map_err(|e| {
            let kind = match e {
                ConvoflowError::UnsupportedNode(_) => ErrorKind::UnsupportedNodeType,
                _ => ErrorKind::HandlerException,
            };
            (kind, e.to_string())
        });

        (result, ctx.into_vars())
    }

    /// Keep the variables a successful step produced and record its output.
    fn commit(
        &mut self,
        nid: &str,
        vars: Vars,
        output: Option<NodeOutput>,
    ) {
        self.vars = vars;
        if let Some(entry) = self.history.last_mut() {
            entry.node_output = output;
        }
        self.emit(nid, FlowEvent::Node(NodeEvent::Succeeded(utils::time::time_millis())));
    }

    /// Turn a handler's step into an outcome and move the state machine.
    fn settle(
        &mut self,
        nid: &str,
        out: ActionOutput,
    ) -> ExecutionOutcome {
        match out.step {
            Step::Continue(Some(next)) => ExecutionOutcome::advanced(nid, next, out.output),
            Step::Continue(None) => {
                tracing::warn!(session_id = %self.id, node_id = %nid, "no outgoing edge, finishing session");
                self.finish(nid, out.output)
            }
            Step::Suspend => {
                tracing::debug!(session_id = %self.id, node_id = %nid, "awaiting input");
                self.state = SessionState::AwaitingInput;
                self.current = Some(nid.to_string());
                self.emit(nid, FlowEvent::Session(SessionEvent::AwaitingInput(utils::time::time_millis())));
                ExecutionOutcome::awaiting(nid, out.output)
            }
            Step::Terminate => self.finish(nid, out.output),
            Step::Reject(kind, message) => self.fail(Some(nid), kind, message),
        }
    }

    fn finish(
        &mut self,
        nid: &str,
        output: Option<NodeOutput>,
    ) -> ExecutionOutcome {
        tracing::info!(session_id = %self.id, node_id = %nid, "session finished");
        self.state = SessionState::Finished;
        self.current = None;
        self.pending = None;
        self.emit(nid, FlowEvent::Session(SessionEvent::Finished(utils::time::time_millis())));
        ExecutionOutcome::finished(nid, output)
    }

    fn fail(
        &mut self,
        nid: Option<&str>,
        kind: ErrorKind,
        message: impl Into<String>,
    ) -> ExecutionOutcome {
        let message = message.into();
        tracing::warn!(session_id = %self.id, node_id = nid.unwrap_or_default(), kind = %kind, error = %message, "session failed");

        self.state = SessionState::Errored;
        self.pending = None;

        let reason = ErrorReason::new(kind, message.clone());
        if let Some(nid) = nid {
            self.emit(nid, FlowEvent::Node(NodeEvent::Error(reason.clone())));
        }
        self.emit(nid.unwrap_or_default(), FlowEvent::Session(SessionEvent::Failed(reason)));

        ExecutionOutcome::failed(nid, kind, message)
    }

    fn invalid_state(
        &self,
        operation: &str,
    ) -> ExecutionOutcome {
        tracing::debug!(session_id = %self.id, state = %self.state, operation, "call rejected in current state");
        ExecutionOutcome::failed(
            self.current.as_deref(),
            ErrorKind::InvalidState,
            format!("cannot {} a session that is {}", operation, self.state),
        )
    }

    fn emit(
        &self,
        nid: &str,
        event: FlowEvent,
    ) {
        self.channel.emit(Message {
            sid: self.id.clone(),
            nid: nid.to_string(),
            event,
        });
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

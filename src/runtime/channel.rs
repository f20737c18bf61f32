use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;

use crate::{
    ConvoflowError, Result, ShareLock,
    common::BroadcastQueue,
    events::{Event, Message},
    runtime::SessionId,
};

macro_rules! dispatch_event {
    ($handles:expr, $(&$item:ident), +) => {
        if let Ok(handlers) = $handles.read() {
            for handle in handlers.iter() {
                (handle)($(&$item),+);
            }
        }
    };
}

const EVENT_QUEUE_SIZE: usize = 2048;

pub type SessionEventHandle = Arc<dyn Fn(&Event<Message>) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct ChannelOptions {
    /// use the glob pattern to match the session id
    /// eg. sid1*
    pub sid: String,

    /// use the glob pattern to match the node id
    /// eg. ask-*
    pub nid: String,
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self {
            sid: "*".to_string(),
            nid: "*".to_string(),
        }
    }
}

impl ChannelOptions {
    pub fn new(
        sid: impl Into<String>,
        nid: impl Into<String>,
    ) -> Self {
        Self {
            sid: sid.into(),
            nid: nid.into(),
        }
    }

    pub fn with_sid(sid: impl Into<String>) -> Self {
        Self::new(sid, "*")
    }

    pub fn with_nid(nid: impl Into<String>) -> Self {
        Self::new("*", nid)
    }
}

/// Fan-out point for session events.
///
/// Registered handlers run synchronously on the emitting task, in
/// registration order. Every event is also pushed to a broadcast queue for
/// async consumers.
#[derive(Clone)]
pub struct Channel {
    event_queue: Arc<BroadcastQueue<Event<Message>>>,
    events: ShareLock<Vec<SessionEventHandle>>,
}

impl Default for Channel {
    fn default() -> Self {
        Self::new()
    }
}

impl Channel {
    pub fn new() -> Self {
        Self {
            event_queue: BroadcastQueue::new(EVENT_QUEUE_SIZE),
            events: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub(crate) fn emit(
        &self,
        message: Message,
    ) {
        let event = Event::new(&message);
        dispatch_event!(self.events, &event);

        if let Err(e) = self.event_queue.send(event) {
            tracing::debug!(session_id = %message.sid, error = %e, "event queue send failed");
        }
    }

    /// Receive every event from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event<Message>> {
        self.event_queue.subscribe()
    }

    fn register(
        &self,
        handle: SessionEventHandle,
    ) {
        if let Ok(mut handlers) = self.events.write() {
            handlers.push(handle);
        }
    }
}

/// Glob-filtered view of a [`Channel`] used to register handlers.
#[derive(Clone)]
pub struct ChannelEvent {
    channel: Arc<Channel>,

    glob: (globset::GlobMatcher, globset::GlobMatcher),
}

impl ChannelEvent {
    pub fn channel(
        channel: Arc<Channel>,
        options: ChannelOptions,
    ) -> Result<Self> {
        let compile = |pattern: &str| {
            globset::Glob::new(pattern)
                .map(|g| g.compile_matcher())
                .map_err(|e| ConvoflowError::Engine(format!("invalid channel pattern '{}': {}", pattern, e)))
        };

        Ok(Self {
            channel,
            glob: (compile(&options.sid)?, compile(&options.nid)?),
        })
    }

    pub fn on_finished(
        &self,
        f: impl Fn(SessionId) + Send + Sync + 'static,
    ) {
        let glob = self.glob.clone();

        self.channel.register(Arc::new(move |e| {
            if e.event.is_finished() && is_match(&glob, e) {
                f(e.sid.clone());
            }
        }));
    }

    pub fn on_error(
        &self,
        f: impl Fn(&Event<Message>) + Send + Sync + 'static,
    ) {
        let glob = self.glob.clone();

        self.channel.register(Arc::new(move |e| {
            if e.event.is_error() && is_match(&glob, e) {
                f(e);
            }
        }));
    }

    pub fn on_input_required(
        &self,
        f: impl Fn(&Event<Message>) + Send + Sync + 'static,
    ) {
        let glob = self.glob.clone();

        self.channel.register(Arc::new(move |e| {
            if e.event.is_input_required() && is_match(&glob, e) {
                f(e);
            }
        }));
    }

    pub fn on_event(
        &self,
        f: impl Fn(&Event<Message>) + Send + Sync + 'static,
    ) {
        let glob = self.glob.clone();

        self.channel.register(Arc::new(move |e| {
            if is_match(&glob, e) {
                f(e);
            }
        }));
    }
}

fn is_match(
    glob: &(globset::GlobMatcher, globset::GlobMatcher),
    e: &Event<Message>,
) -> bool {
    let (pat_sid, pat_nid) = glob;
    pat_sid.is_match(&e.sid) && pat_nid.is_match(&e.nid)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{
        ErrorKind,
        events::{ErrorReason, FlowEvent, NodeEvent, SessionEvent},
    };

    fn message(
        sid: &str,
        nid: &str,
        event: FlowEvent,
    ) -> Message {
        Message {
            sid: sid.to_string(),
            nid: nid.to_string(),
            event,
        }
    }

    #[test]
    fn test_glob_filtering() {
        let channel = Arc::new(Channel::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let s = seen.clone();
        ChannelEvent::channel(channel.clone(), ChannelOptions::with_nid("ask-*")).unwrap().on_event(move |e| {
            s.lock().unwrap().push(e.nid.clone());
        });

        channel.emit(message("s1", "ask-name", FlowEvent::Node(NodeEvent::Entered(1))));
        channel.emit(message("s1", "greet", FlowEvent::Node(NodeEvent::Entered(2))));

        assert_eq!(*seen.lock().unwrap(), vec!["ask-name".to_string()]);
    }

    #[test]
    fn test_typed_handlers() {
        let channel = Arc::new(Channel::new());
        let finished = Arc::new(Mutex::new(Vec::new()));
        let errors = Arc::new(Mutex::new(0));
        let waiting = Arc::new(Mutex::new(0));

        let events = ChannelEvent::channel(channel.clone(), ChannelOptions::with_sid("s1")).unwrap();
        let f = finished.clone();
        events.on_finished(move |sid| f.lock().unwrap().push(sid));
        let e = errors.clone();
        events.on_error(move |_| *e.lock().unwrap() += 1);
        let w = waiting.clone();
        events.on_input_required(move |_| *w.lock().unwrap() += 1);

        channel.emit(message("s1", "end", FlowEvent::Session(SessionEvent::Finished(1))));
        channel.emit(message("s2", "end", FlowEvent::Session(SessionEvent::Finished(1))));
        channel.emit(message("s1", "x", FlowEvent::Session(SessionEvent::Failed(ErrorReason::new(ErrorKind::HandlerException, "boom")))));
        channel.emit(message("s1", "ask", FlowEvent::Session(SessionEvent::AwaitingInput(2))));

        assert_eq!(*finished.lock().unwrap(), vec!["s1".to_string()]);
        assert_eq!(*errors.lock().unwrap(), 1);
        assert_eq!(*waiting.lock().unwrap(), 1);
    }

    #[test]
    fn test_invalid_pattern() {
        let channel = Arc::new(Channel::new());
        assert!(ChannelEvent::channel(channel, ChannelOptions::with_sid("[")).is_err());
    }

    #[tokio::test]
    async fn test_subscribe() {
        let channel = Channel::new();
        let mut rx = channel.subscribe();
        channel.emit(message("s1", "", FlowEvent::Session(SessionEvent::Started(5))));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.sid, "s1");
        assert_eq!(event.event, FlowEvent::Session(SessionEvent::Started(5)));
    }
}

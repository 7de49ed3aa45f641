//! # Scripted Transport
//!
//! An in-memory [`Transport`] for tests. Replies are queued per method and replayed when the
//! request side is half-closed, or after a given number of sends (see [`Reply::after_sends`]).
//! Calls opened without a queued reply stay open, so tests can drive them by hand through
//! [`MockCall::push_message`] and [`MockCall::push_end`].
//!
//! Everything happens synchronously on the calling thread.
use crate::{InboundSink, MethodDescriptor, Metadata, Status, Transport, TransportCall};
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// An operation the engine performed on a [`MockCall`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallEvent {
    Start,
    Send(Bytes),
    FinishSend,
    Close,
}

/// A canned reply: the frames to deliver, then the terminal status.
#[derive(Debug, Clone)]
pub struct Reply {
    pub frames: Vec<Bytes>,
    pub status: Status,
    /// Replays the reply once this many requests were sent instead of on half-close.
    pub after_sends: Option<usize>,
}

impl Reply {
    pub fn new(frames: Vec<Bytes>, status: Status) -> Self {
        Self {
            frames,
            status,
            after_sends: None,
        }
    }

    /// Ends the call as soon as `sends` requests went out, like a server rejecting an upload
    /// halfway through.
    pub fn after_sends(mut self, sends: usize) -> Self {
        self.after_sends = Some(sends);
        self
    }

    /// OK status with the given messages as frames.
    pub fn messages<M: prost::Message>(messages: &[M]) -> Self {
        let frames = messages
            .iter()
            .map(|m| Bytes::from(m.encode_to_vec()))
            .collect();
        Self::new(frames, Status::ok())
    }

    pub fn status(status: Status) -> Self {
        Self::new(Vec::new(), status)
    }
}

#[derive(Default)]
struct MockState {
    replies: HashMap<String, VecDeque<Reply>>,
    calls: Vec<Arc<MockCall>>,
}

#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `reply` for the next call to `method`.
    pub fn reply(&self, method: &MethodDescriptor, reply: Reply) -> &Self {
        self.state
            .lock()
            .replies
            .entry(method.path())
            .or_default()
            .push_back(reply);
        self
    }

    /// Every call opened so far, in opening order.
    pub fn calls(&self) -> Vec<Arc<MockCall>> {
        self.state.lock().calls.clone()
    }

    /// The most recently opened call.
    pub fn last_call(&self) -> Option<Arc<MockCall>> {
        self.state.lock().calls.last().cloned()
    }
}

impl Transport for MockTransport {
    fn open(
        &self,
        method: &MethodDescriptor,
        destination: &str,
        metadata: &Metadata,
        sink: Arc<dyn InboundSink>,
    ) -> Arc<dyn TransportCall> {
        let mut state = self.state.lock();
        let reply = state
            .replies
            .get_mut(&method.path())
            .and_then(VecDeque::pop_front);
        let call = Arc::new(MockCall {
            method: *method,
            destination: destination.to_string(),
            metadata: metadata.clone(),
            sink,
            reply: Mutex::new(reply),
            events: Mutex::new(Vec::new()),
        });
        state.calls.push(call.clone());
        call
    }
}

/// One call opened on a [`MockTransport`].
pub struct MockCall {
    pub method: MethodDescriptor,
    pub destination: String,
    pub metadata: Metadata,
    sink: Arc<dyn InboundSink>,
    reply: Mutex<Option<Reply>>,
    events: Mutex<Vec<CallEvent>>,
}

impl MockCall {
    pub fn events(&self) -> Vec<CallEvent> {
        self.events.lock().clone()
    }

    /// The frames the engine sent, in order.
    pub fn sent(&self) -> Vec<Bytes> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                CallEvent::Send(frame) => Some(frame.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn is_closed(&self) -> bool {
        self.events.lock().contains(&CallEvent::Close)
    }

    /// Delivers a response frame to the engine.
    pub fn push_message(&self, frame: impl Into<Bytes>) {
        self.sink.on_message(frame.into());
    }

    /// Delivers the terminal status to the engine.
    pub fn push_end(&self, status: Status) {
        self.sink.on_end(status);
    }

    fn record(&self, event: CallEvent) {
        self.events.lock().push(event);
    }

    fn replay(&self, reply: Reply) {
        for frame in reply.frames {
            self.sink.on_message(frame);
        }
        self.sink.on_end(reply.status);
    }
}

impl TransportCall for MockCall {
    fn start(&self) {
        self.record(CallEvent::Start);
    }

    fn send(&self, frame: Bytes) {
        self.record(CallEvent::Send(frame));
        let sends = self.sent().len();
        // Bind first so the lock is released before the engine is called back.
        let reply = {
            let mut reply = self.reply.lock();
            match reply.as_ref().and_then(|r| r.after_sends) {
                Some(after) if after <= sends => reply.take(),
                _ => None,
            }
        };
        if let Some(reply) = reply {
            self.replay(reply);
        }
    }

    fn finish_send(&self) {
        self.record(CallEvent::FinishSend);
        let reply = self.reply.lock().take();
        if let Some(reply) = reply {
            self.replay(reply);
        }
    }

    fn close(&self) {
        self.record(CallEvent::Close);
    }
}

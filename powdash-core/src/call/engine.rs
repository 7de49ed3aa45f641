use super::{CallError, CallState, CallTarget, Listeners, MisuseError};
use crate::{Codec, InboundSink, MethodDescriptor, Status, TransportCall};
use bytes::Bytes;
use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::sync::{Arc, Weak};
use tracing::{debug, trace, warn};

pub(crate) type Completion<T> = Box<dyn FnOnce(Result<Option<T>, CallError>) + Send>;

/// How results reach the caller: a single completion for non-streamed responses, event
/// listeners for streamed ones.
pub(crate) enum Delivery<T> {
    Completion(Completion<T>),
    Events(Listeners<T>),
}

struct State<Res> {
    phase: CallState,
    /// Kept until the transport call is opened.
    target: Option<CallTarget>,
    transport: Option<Arc<dyn TransportCall>>,
    half_closed: bool,
    listeners: Option<Listeners<Res>>,
    completion: Option<Completion<Res>>,
    /// The single buffered response of unary and client streaming calls.
    response: Option<Res>,
}

/// Per-call state machine.
///
/// Inbound delivery, `cancel` and the outbound operations all run while holding `state`'s lock,
/// so they never interleave. The lock is reentrant because handlers may call back into the
/// handle (typically `cancel`) while an event is being delivered. The `RefCell` is never borrowed
/// across a call into a handler or into the transport.
pub(crate) struct Engine<Req, Res> {
    method: MethodDescriptor,
    codec: Box<dyn Codec<Encode = Req, Decode = Res>>,
    state: ReentrantMutex<RefCell<State<Res>>>,
    this: Weak<Self>,
}

impl<Req, Res> Engine<Req, Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    pub(crate) fn new(
        method: MethodDescriptor,
        codec: Box<dyn Codec<Encode = Req, Decode = Res>>,
        target: CallTarget,
        delivery: Delivery<Res>,
    ) -> Arc<Self> {
        let (listeners, completion) = match delivery {
            Delivery::Completion(completion) => (None, Some(completion)),
            Delivery::Events(listeners) => (Some(listeners), None),
        };

        Arc::new_cyclic(|this| Self {
            method,
            codec,
            state: ReentrantMutex::new(RefCell::new(State {
                phase: CallState::Pending,
                target: Some(target),
                transport: None,
                half_closed: false,
                listeners,
                completion,
                response: None,
            })),
            this: this.clone(),
        })
    }

    pub(crate) fn method(&self) -> &MethodDescriptor {
        &self.method
    }

    pub(crate) fn state(&self) -> CallState {
        self.state.lock().borrow().phase
    }

    /// Opens the call, sends its only request and half-closes it.
    pub(crate) fn send_once(&self, request: &Req) {
        let guard = self.state.lock();
        let Some(call) = self.activate(&guard) else {
            return;
        };
        let frame = self.codec.encode(request);
        guard.borrow_mut().half_closed = true;
        call.send(frame);
        call.finish_send();
    }

    pub(crate) fn write(&self, request: &Req) -> Result<(), MisuseError> {
        let guard = self.state.lock();
        {
            let state = guard.borrow();
            if state.phase.is_terminal() {
                return Err(MisuseError::Closed);
            }
            if state.half_closed {
                return Err(MisuseError::WriteAfterEnd);
            }
        }
        let call = self.activate(&guard).ok_or(MisuseError::Closed)?;
        trace!(method = %self.method, "sending request message");
        call.send(self.codec.encode(request));
        Ok(())
    }

    pub(crate) fn end(&self) -> Result<(), MisuseError> {
        let guard = self.state.lock();
        {
            let state = guard.borrow();
            if state.phase.is_terminal() {
                return Err(MisuseError::Closed);
            }
            if state.half_closed {
                return Err(MisuseError::AlreadyEnded);
            }
        }
        let call = self.activate(&guard).ok_or(MisuseError::Closed)?;
        guard.borrow_mut().half_closed = true;
        trace!(method = %self.method, "half-closing request stream");
        call.finish_send();
        Ok(())
    }

    /// Registers handlers. Ignored once the call is closed.
    pub(crate) fn subscribe(&self, register: impl FnOnce(&mut Listeners<Res>)) {
        let guard = self.state.lock();
        let mut state = guard.borrow_mut();
        if let Some(listeners) = state.listeners.as_mut() {
            register(listeners);
        }
    }

    pub(crate) fn cancel(&self) {
        let guard = self.state.lock();
        let (call, completion) = {
            let mut state = guard.borrow_mut();
            if state.phase.is_terminal() {
                return;
            }
            state.phase = CallState::Cancelled;
            state.target = None;
            state.listeners = None;
            state.response = None;
            (state.transport.take(), state.completion.take())
        };

        debug!(method = %self.method, "call cancelled");
        if let Some(call) = call {
            call.close();
        }
        if let Some(completion) = completion {
            completion(Err(CallError::Cancelled));
        }
    }

    /// Pending -> Active. Returns the open transport call, or `None` once the call is closed.
    fn activate(&self, state: &RefCell<State<Res>>) -> Option<Arc<dyn TransportCall>> {
        let target = {
            let mut state = state.borrow_mut();
            match state.phase {
                CallState::Active => return state.transport.clone(),
                CallState::Pending => state.target.take()?,
                CallState::Completed | CallState::Cancelled => return None,
            }
        };
        let sink: Arc<dyn InboundSink> = self.this.upgrade()?;

        let call = target.transport.open(
            &self.method,
            &target.destination,
            &target.metadata,
            sink,
        );
        {
            let mut state = state.borrow_mut();
            state.phase = CallState::Active;
            state.transport = Some(call.clone());
        }

        debug!(method = %self.method, destination = %target.destination, "call opened");
        call.start();
        Some(call)
    }

    /// Terminates the call after a failure the transport does not know about.
    fn fail(&self, state: &RefCell<State<Res>>, err: CallError) {
        let (call, completion, listeners) = {
            let mut state = state.borrow_mut();
            state.phase = CallState::Cancelled;
            state.target = None;
            state.response = None;
            (
                state.transport.take(),
                state.completion.take(),
                state.listeners.take(),
            )
        };

        if let Some(call) = call {
            call.close();
        }
        if let Some(completion) = completion {
            completion(Err(err));
        } else if let Some(listeners) = listeners {
            for handler in &listeners.error {
                handler(&err);
            }
        }
    }
}

impl<Req, Res> InboundSink for Engine<Req, Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    fn on_message(&self, frame: Bytes) {
        let guard = self.state.lock();
        if guard.borrow().phase != CallState::Active {
            return;
        }

        trace!(method = %self.method, len = frame.len(), "received response frame");
        let message = match self.codec.decode(frame) {
            Ok(message) => message,
            Err(err) => {
                warn!(method = %self.method, error = %err, "terminating call on undecodable frame");
                self.fail(&guard, CallError::Decode(err));
                return;
            }
        };

        if !self.method.response_streamed {
            let mut state = guard.borrow_mut();
            if state.response.is_none() {
                state.response = Some(message);
            } else {
                trace!(method = %self.method, "ignoring extra response message");
            }
            return;
        }

        let handlers = guard
            .borrow()
            .listeners
            .as_ref()
            .map(|listeners| listeners.data.clone())
            .unwrap_or_default();
        for handler in handlers {
            if guard.borrow().phase != CallState::Active {
                break;
            }
            handler(&message);
        }
    }

    fn on_end(&self, status: Status) {
        let guard = self.state.lock();
        let (listeners, completion, response) = {
            let mut state = guard.borrow_mut();
            if state.phase.is_terminal() {
                return;
            }
            state.phase = CallState::Completed;
            state.target = None;
            state.transport = None;
            (
                state.listeners.take(),
                state.completion.take(),
                state.response.take(),
            )
        };

        debug!(method = %self.method, code = status.code, "call completed");
        if let Some(listeners) = listeners {
            for handler in &listeners.status {
                handler(&status);
            }
            for handler in &listeners.end {
                handler(&status);
            }
        }
        if let Some(completion) = completion {
            let result = if status.is_ok() {
                Ok(response)
            } else {
                Err(CallError::Status(status.into()))
            };
            completion(result);
        }
    }
}

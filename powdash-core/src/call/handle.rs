use super::engine::Engine;
use super::{CallError, CallState, MisuseError};
use crate::{MethodDescriptor, Status};
use std::fmt;
use std::sync::Arc;

type Handler<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Capability shared by every handle.
pub trait Cancelable {
    /// Aborts the call. Idempotent, and a no-op once the call reached a terminal state.
    ///
    /// After `cancel` returns no event is delivered anymore. A pending completion callback is
    /// invoked with [`CallError::Cancelled`].
    ///
    /// A `status` handler runs after the call completed, so cancelling from it does nothing and
    /// `end` still fires.
    fn cancel(&self);

    fn state(&self) -> CallState;
}

/// Capability of request-streamed calls.
pub trait Writable {
    type Request;

    /// Encodes and sends one request. The first write opens the transport call.
    fn write(&self, message: &Self::Request) -> Result<(), MisuseError>;

    /// Signals that no more requests follow (half-close).
    fn end(&self) -> Result<(), MisuseError>;
}

/// Capability of response-streamed calls.
///
/// `status` and `end` always fire together, exactly once, `status` first. Neither fires after
/// the call was cancelled.
pub trait Subscribable {
    type Response;

    /// Fired once per decoded response, in arrival order.
    fn on_data<F>(&self, handler: F) -> &Self
    where
        F: Fn(&Self::Response) + Send + Sync + 'static;

    fn on_status<F>(&self, handler: F) -> &Self
    where
        F: Fn(&Status) + Send + Sync + 'static;

    fn on_end<F>(&self, handler: F) -> &Self
    where
        F: Fn(&Status) + Send + Sync + 'static;

    /// Fired when a response frame could not be decoded. The call is terminated right after.
    fn on_error<F>(&self, handler: F) -> &Self
    where
        F: Fn(&CallError) + Send + Sync + 'static;
}

/// Event handlers of a response-streamed call.
pub struct Listeners<T> {
    pub(crate) data: Vec<Handler<T>>,
    pub(crate) status: Vec<Handler<Status>>,
    pub(crate) end: Vec<Handler<Status>>,
    pub(crate) error: Vec<Handler<CallError>>,
}

impl<T> Listeners<T> {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            status: Vec::new(),
            end: Vec::new(),
            error: Vec::new(),
        }
    }

    pub fn on_data(mut self, handler: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.data.push(Arc::new(handler));
        self
    }

    pub fn on_status(mut self, handler: impl Fn(&Status) + Send + Sync + 'static) -> Self {
        self.status.push(Arc::new(handler));
        self
    }

    pub fn on_end(mut self, handler: impl Fn(&Status) + Send + Sync + 'static) -> Self {
        self.end.push(Arc::new(handler));
        self
    }

    pub fn on_error(mut self, handler: impl Fn(&CallError) + Send + Sync + 'static) -> Self {
        self.error.push(Arc::new(handler));
        self
    }
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("data", &self.data.len())
            .field("status", &self.status.len())
            .field("end", &self.end.len())
            .field("error", &self.error.len())
            .finish()
    }
}

/// Type-erased control over an engine, so that [`UnaryCall`] does not carry message types.
trait Control: Send + Sync {
    fn cancel(&self);
    fn state(&self) -> CallState;
    fn method(&self) -> &MethodDescriptor;
}

impl<Req, Res> Control for Engine<Req, Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    fn cancel(&self) {
        Engine::cancel(self)
    }

    fn state(&self) -> CallState {
        Engine::state(self)
    }

    fn method(&self) -> &MethodDescriptor {
        Engine::method(self)
    }
}

/// Handle of a unary call. The result is delivered to the completion callback.
pub struct UnaryCall {
    call: Arc<dyn Control>,
}

impl UnaryCall {
    pub(crate) fn new<Req, Res>(engine: Arc<Engine<Req, Res>>) -> Self
    where
        Req: Send + 'static,
        Res: Send + 'static,
    {
        Self { call: engine }
    }
}

impl Cancelable for UnaryCall {
    fn cancel(&self) {
        self.call.cancel()
    }

    fn state(&self) -> CallState {
        self.call.state()
    }
}

impl fmt::Debug for UnaryCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnaryCall")
            .field("method", self.call.method())
            .field("state", &self.call.state())
            .finish()
    }
}

macro_rules! engine_handle {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        pub struct $name<Req, Res> {
            engine: Arc<Engine<Req, Res>>,
        }

        impl<Req, Res> $name<Req, Res>
        where
            Req: Send + 'static,
            Res: Send + 'static,
        {
            pub(crate) fn new(engine: Arc<Engine<Req, Res>>) -> Self {
                Self { engine }
            }

            pub fn method(&self) -> &MethodDescriptor {
                self.engine.method()
            }
        }

        impl<Req, Res> Cancelable for $name<Req, Res>
        where
            Req: Send + 'static,
            Res: Send + 'static,
        {
            fn cancel(&self) {
                self.engine.cancel()
            }

            fn state(&self) -> CallState {
                self.engine.state()
            }
        }

        impl<Req, Res> fmt::Debug for $name<Req, Res>
        where
            Req: Send + 'static,
            Res: Send + 'static,
        {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("method", self.engine.method())
                    .field("state", &self.engine.state())
                    .finish()
            }
        }
    };
}

macro_rules! writable {
    ($name:ident) => {
        impl<Req, Res> Writable for $name<Req, Res>
        where
            Req: Send + 'static,
            Res: Send + 'static,
        {
            type Request = Req;

            fn write(&self, message: &Req) -> Result<(), MisuseError> {
                self.engine.write(message)
            }

            fn end(&self) -> Result<(), MisuseError> {
                self.engine.end()
            }
        }
    };
}

macro_rules! subscribable {
    ($name:ident) => {
        impl<Req, Res> Subscribable for $name<Req, Res>
        where
            Req: Send + 'static,
            Res: Send + 'static,
        {
            type Response = Res;

            fn on_data<F>(&self, handler: F) -> &Self
            where
                F: Fn(&Res) + Send + Sync + 'static,
            {
                self.engine
                    .subscribe(|listeners| listeners.data.push(Arc::new(handler)));
                self
            }

            fn on_status<F>(&self, handler: F) -> &Self
            where
                F: Fn(&Status) + Send + Sync + 'static,
            {
                self.engine
                    .subscribe(|listeners| listeners.status.push(Arc::new(handler)));
                self
            }

            fn on_end<F>(&self, handler: F) -> &Self
            where
                F: Fn(&Status) + Send + Sync + 'static,
            {
                self.engine
                    .subscribe(|listeners| listeners.end.push(Arc::new(handler)));
                self
            }

            fn on_error<F>(&self, handler: F) -> &Self
            where
                F: Fn(&CallError) + Send + Sync + 'static,
            {
                self.engine
                    .subscribe(|listeners| listeners.error.push(Arc::new(handler)));
                self
            }
        }
    };
}

engine_handle!(
    /// Handle of a client streaming call. The result is delivered to the completion callback.
    ClientStreamCall
);
writable!(ClientStreamCall);

engine_handle!(
    /// Handle of a server streaming call.
    ServerStreamCall
);
subscribable!(ServerStreamCall);

engine_handle!(
    /// Handle of a bidirectional streaming call.
    BidiCall
);
writable!(BidiCall);
subscribable!(BidiCall);

//! # Method Descriptors
//!
//! A [`MethodDescriptor`] is the static declaration of one remote method. It is defined once per
//! RPC (usually as a `const` next to the service client) and shared by every call to it.
use std::fmt;

/// The four call shapes of gRPC, derived from the two streaming flags of a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallShape {
    /// Single request, single response.
    Unary,
    /// Stream of requests, single response.
    ClientStream,
    /// Single request, stream of responses.
    ServerStream,
    /// Stream of requests, stream of responses.
    Bidirectional,
}

impl CallShape {
    pub fn from_flags(request_streamed: bool, response_streamed: bool) -> Self {
        match (request_streamed, response_streamed) {
            (false, false) => CallShape::Unary,
            (true, false) => CallShape::ClientStream,
            (false, true) => CallShape::ServerStream,
            (true, true) => CallShape::Bidirectional,
        }
    }

    /// Whether the caller writes requests through the handle instead of passing one upfront.
    pub fn is_request_streamed(self) -> bool {
        matches!(self, CallShape::ClientStream | CallShape::Bidirectional)
    }

    /// Whether responses are delivered as `data` events instead of a single result.
    pub fn is_response_streamed(self) -> bool {
        matches!(self, CallShape::ServerStream | CallShape::Bidirectional)
    }
}

impl fmt::Display for CallShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CallShape::Unary => "unary",
            CallShape::ClientStream => "client streaming",
            CallShape::ServerStream => "server streaming",
            CallShape::Bidirectional => "bidirectional streaming",
        };
        f.write_str(name)
    }
}

/// Static declaration of a remote method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    /// Fully qualified service name (e.g. `filecoin.ask.pb.API`).
    pub service: &'static str,
    /// Method name (e.g. `Get`).
    pub name: &'static str,
    pub request_streamed: bool,
    pub response_streamed: bool,
}

impl MethodDescriptor {
    pub const fn new(
        service: &'static str,
        name: &'static str,
        request_streamed: bool,
        response_streamed: bool,
    ) -> Self {
        Self {
            service,
            name,
            request_streamed,
            response_streamed,
        }
    }

    pub const fn unary(service: &'static str, name: &'static str) -> Self {
        Self::new(service, name, false, false)
    }

    pub const fn client_streaming(service: &'static str, name: &'static str) -> Self {
        Self::new(service, name, true, false)
    }

    pub const fn server_streaming(service: &'static str, name: &'static str) -> Self {
        Self::new(service, name, false, true)
    }

    pub const fn bidi_streaming(service: &'static str, name: &'static str) -> Self {
        Self::new(service, name, true, true)
    }

    pub fn shape(&self) -> CallShape {
        CallShape::from_flags(self.request_streamed, self.response_streamed)
    }

    /// The HTTP/2 path of the method (e.g. `/filecoin.ask.pb.API/Get`).
    pub fn path(&self) -> String {
        format!("/{}/{}", self.service, self.name)
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.service, self.name)
    }
}

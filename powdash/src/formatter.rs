use colored::*;
use powdash_core::client::ClientError;
use powdash_core::grpc::ConnectError;
use powdash_core::{ServiceError, code};
use std::fmt::Display;

/// A wrapper struct for a formatted, colored string.
///
/// Implements `Display` so it can be printed directly.
pub struct FormattedString(pub String);

pub struct GenericError<T: Display>(pub &'static str, pub T);

impl std::fmt::Display for FormattedString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f)?;
        writeln!(f, "{}", self.0)?;
        Ok(())
    }
}

impl From<serde_json::Value> for FormattedString {
    fn from(value: serde_json::Value) -> Self {
        FormattedString(serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()))
    }
}

impl From<&ServiceError> for FormattedString {
    fn from(err: &ServiceError) -> Self {
        FormattedString(format!(
            "{} code={} ({}) message={:?}",
            "Powergate Failed:".red().bold(),
            err.code,
            code_name(err.code),
            err.message
        ))
    }
}

impl From<&ClientError> for FormattedString {
    fn from(err: &ClientError) -> Self {
        match err.service_error() {
            Some(service_error) => service_error.into(),
            None => FormattedString(format!("{}\n\n'{}'", "Call Failed:".red().bold(), err)),
        }
    }
}

impl From<ConnectError> for FormattedString {
    fn from(err: ConnectError) -> Self {
        FormattedString(format!("{}\n\n'{}'", "Connection Failed:".red().bold(), err))
    }
}

/// Client errors keep their own rendering; anything else prints its context chain.
impl From<anyhow::Error> for FormattedString {
    fn from(err: anyhow::Error) -> Self {
        if let Some(client_error) = err.downcast_ref::<ClientError>() {
            return client_error.into();
        }
        FormattedString(format!("{}\n\n'{:#}'", "Command Failed:".red().bold(), err))
    }
}

impl<T: Display> From<GenericError<T>> for FormattedString {
    fn from(GenericError(msg, err): GenericError<T>) -> Self {
        FormattedString(format!("{}:\n\n'{}'", msg.red().bold(), err))
    }
}

fn code_name(value: i32) -> &'static str {
    match value {
        code::OK => "OK",
        code::CANCELLED => "Cancelled",
        code::UNKNOWN => "Unknown",
        code::INVALID_ARGUMENT => "InvalidArgument",
        code::DEADLINE_EXCEEDED => "DeadlineExceeded",
        code::NOT_FOUND => "NotFound",
        code::ALREADY_EXISTS => "AlreadyExists",
        code::PERMISSION_DENIED => "PermissionDenied",
        code::RESOURCE_EXHAUSTED => "ResourceExhausted",
        code::FAILED_PRECONDITION => "FailedPrecondition",
        code::ABORTED => "Aborted",
        code::OUT_OF_RANGE => "OutOfRange",
        code::UNIMPLEMENTED => "Unimplemented",
        code::INTERNAL => "Internal",
        code::UNAVAILABLE => "Unavailable",
        code::DATA_LOSS => "DataLoss",
        code::UNAUTHENTICATED => "Unauthenticated",
        _ => "Unrecognized",
    }
}

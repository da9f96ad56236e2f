//! Actor Runtime Error Types
//!
//! Routing and addressing failures returned synchronously by tell, ask, spawn
//! and kill, plus the handler failure type that travels back to a waiting
//! sender as a regular reply.

use thiserror::Error;

/// Errors returned to the caller of a runtime operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActorError {
    /// The operation cannot route this kind of address
    #[error("Address {address} is not supported by {operation}")]
    AddressUnsupported { address: String, operation: String },

    /// No unit is registered under the local address (removed or never spawned)
    #[error("Could not find local actor {address}")]
    ActorNotFound { address: String },

    /// Drop-policy mailbox had no spare capacity at send time
    #[error("Mailbox of actor {address} is full")]
    MailboxFull { address: String },

    /// Ask did not receive a reply before its deadline
    #[error("Talk timeout: no reply from {address} within {timeout_ms}ms")]
    TalkTimeout { address: String, timeout_ms: u64 },

    /// A reply channel was closed without a value
    #[error("Reply channel {address} was closed")]
    ChannelClosed { address: String },

    /// Options or configuration failed validation
    #[error("Configuration error: {message}")]
    InvalidConfiguration {
        message: String,
        field: Option<String>,
    },
}

/// Result type alias for runtime operations
pub type Result<T> = std::result::Result<T, ActorError>;

impl ActorError {
    pub fn address_unsupported(address: impl ToString, operation: impl Into<String>) -> Self {
        Self::AddressUnsupported {
            address: address.to_string(),
            operation: operation.into(),
        }
    }

    pub fn actor_not_found(address: impl ToString) -> Self {
        Self::ActorNotFound {
            address: address.to_string(),
        }
    }

    pub fn mailbox_full(address: impl ToString) -> Self {
        Self::MailboxFull {
            address: address.to_string(),
        }
    }

    pub fn talk_timeout(address: impl ToString, timeout_ms: u64) -> Self {
        Self::TalkTimeout {
            address: address.to_string(),
            timeout_ms,
        }
    }

    pub fn channel_closed(address: impl ToString) -> Self {
        Self::ChannelClosed {
            address: address.to_string(),
        }
    }

    /// Create a configuration error, optionally naming the offending field
    pub fn configuration(message: impl Into<String>, field: Option<&str>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
            field: field.map(str::to_string),
        }
    }

    /// True for `ActorNotFound`
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ActorNotFound { .. })
    }

    /// True for `TalkTimeout`
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TalkTimeout { .. })
    }

    /// Short label used as a structured log field
    pub fn category(&self) -> &'static str {
        match self {
            Self::AddressUnsupported { .. } => "address_unsupported",
            Self::ActorNotFound { .. } => "actor_not_found",
            Self::MailboxFull { .. } => "mailbox_full",
            Self::TalkTimeout { .. } => "talk_timeout",
            Self::ChannelClosed { .. } => "channel_closed",
            Self::InvalidConfiguration { .. } => "configuration",
        }
    }
}

/// Failure returned by an actor's handler
///
/// Never surfaces as the error of a tell or ask call. For ask-style exchanges
/// it arrives as [`crate::Message::Error`]; for tells it is logged and dropped.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
    code: Option<u16>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            source: None,
        }
    }

    /// Attach a numeric status code, e.g. an HTTP status a front end maps to
    pub fn with_code(mut self, code: u16) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> Option<u16> {
        self.code
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Lets handlers propagate a failed tell or ask with `?`
impl From<ActorError> for HandlerError {
    fn from(err: ActorError) -> Self {
        Self::new(err.to_string()).with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = ActorError::actor_not_found("local#7");
        assert_eq!(err.to_string(), "Could not find local actor local#7");
        assert!(err.is_not_found());
        assert_eq!(err.category(), "actor_not_found");

        let err = ActorError::talk_timeout("local#1", 3000);
        assert!(err.is_timeout());
        assert!(err.to_string().contains("3000ms"));
    }

    #[test]
    fn test_configuration_error_field() {
        let err = ActorError::configuration("capacity must be positive", Some("mailbox_capacity"));
        match err {
            ActorError::InvalidConfiguration { field, .. } => {
                assert_eq!(field.as_deref(), Some("mailbox_capacity"))
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_handler_error_code_and_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err = HandlerError::new("could not store user")
            .with_code(409)
            .with_source(io);

        assert_eq!(err.message(), "could not store user");
        assert_eq!(err.code(), Some(409));
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("disk gone"));
    }

    #[test]
    fn test_runtime_error_converts_to_handler_error() {
        let err: HandlerError = ActorError::mailbox_full("local#3").into();
        assert_eq!(err.message(), "Mailbox of actor local#3 is full");
        assert!(err.code().is_none());
        assert!(err.source().is_some());
    }
}

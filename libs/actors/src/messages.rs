//! Messages and Envelopes
//!
//! [`Message`] is the unit dispatched to a handler: the application's payload
//! plus the runtime-reserved lifecycle and error kinds. [`Envelope`] carries a
//! message together with its delivery metadata.

use crate::address::Address;
use crate::error::HandlerError;
use crate::options::SendOptions;
use std::fmt;

/// Outcome of one handler invocation
///
/// `Ok(Some(reply))` answers a waiting sender with [`Message::User`],
/// `Ok(None)` with [`Message::NoReply`], and `Err(e)` with [`Message::Error`].
pub type HandlerResult<M> = std::result::Result<Option<M>, HandlerError>;

/// Everything an actor can receive
#[derive(Debug)]
pub enum Message<M> {
    /// Told to every actor right after it is spawned
    Start,
    /// Lifecycle signal; the execution loop exits after handling it
    Stop,
    /// A handler completed without producing a reply
    NoReply,
    /// A handler failed; delivered to the sender that was waiting for a reply
    Error(HandlerError),
    /// Application payload
    User(M),
}

impl<M> Message<M> {
    pub fn is_stop(&self) -> bool {
        matches!(self, Message::Stop)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Message::Error(_))
    }

    /// Borrow the application payload, if any
    pub fn as_user(&self) -> Option<&M> {
        match self {
            Message::User(msg) => Some(msg),
            _ => None,
        }
    }

    /// Take the application payload, if any
    pub fn into_user(self) -> Option<M> {
        match self {
            Message::User(msg) => Some(msg),
            _ => None,
        }
    }

    /// Convert a reply into a `Result`, surfacing a wrapped handler failure
    pub fn into_reply(self) -> std::result::Result<Option<M>, HandlerError> {
        match self {
            Message::User(msg) => Ok(Some(msg)),
            Message::Error(err) => Err(err),
            _ => Ok(None),
        }
    }

    /// Variant name used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Start => "start",
            Message::Stop => "stop",
            Message::NoReply => "no_reply",
            Message::Error(_) => "error",
            Message::User(_) => "user",
        }
    }

    pub(crate) fn from_result(result: HandlerResult<M>) -> Self {
        match result {
            Ok(Some(reply)) => Message::User(reply),
            Ok(None) => Message::NoReply,
            Err(err) => Message::Error(err),
        }
    }
}

impl<M> From<M> for Message<M> {
    fn from(msg: M) -> Self {
        Message::User(msg)
    }
}

/// A message plus its delivery metadata
///
/// Immutable once built. An envelope that is marked as a tell, or that has no
/// sender, never produces an automatic reply.
pub struct Envelope<M> {
    message: Message<M>,
    sender: Option<Address<M>>,
    is_tell: bool,
}

impl<M> Envelope<M> {
    pub fn new(message: impl Into<Message<M>>) -> Self {
        Self {
            message: message.into(),
            sender: None,
            is_tell: false,
        }
    }

    /// Build an envelope from per-send options
    pub fn with_options(message: impl Into<Message<M>>, options: SendOptions<M>) -> Self {
        Self {
            message: message.into(),
            sender: options.sender,
            is_tell: options.as_tell,
        }
    }

    pub fn with_sender(mut self, sender: Address<M>) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn as_tell(mut self) -> Self {
        self.is_tell = true;
        self
    }

    pub fn message(&self) -> &Message<M> {
        &self.message
    }

    pub fn sender(&self) -> Option<&Address<M>> {
        self.sender.as_ref()
    }

    pub fn is_tell(&self) -> bool {
        self.is_tell
    }

    /// True if handling this envelope routes the result back to its sender
    pub fn expects_reply(&self) -> bool {
        !self.is_tell && self.sender.is_some()
    }

    pub fn into_parts(self) -> (Message<M>, Option<Address<M>>, bool) {
        (self.message, self.sender, self.is_tell)
    }

    pub fn into_message(self) -> Message<M> {
        self.message
    }
}

impl<M> fmt::Debug for Envelope<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("kind", &self.message.kind())
            .field("sender", &self.sender.as_ref().map(|s| s.to_string()))
            .field("is_tell", &self.is_tell)
            .finish()
    }
}

impl<M> fmt::Display for Envelope<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sender {
            Some(sender) => write!(f, "sender={} msg={}", sender, self.message.kind()),
            None => write!(f, "sender=none msg={}", self.message.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::LocalAddress;

    #[test]
    fn test_tell_and_senderless_envelopes_never_reply() {
        let sender: Address<u32> = LocalAddress::new(3).into();

        let plain = Envelope::new(1u32);
        assert!(!plain.expects_reply());

        let request = Envelope::new(1u32).with_sender(sender.clone());
        assert!(request.expects_reply());

        let tell = Envelope::new(1u32).with_sender(sender).as_tell();
        assert!(!tell.expects_reply());
        assert!(tell.is_tell());
    }

    #[test]
    fn test_envelope_from_options() {
        let sender: Address<&str> = LocalAddress::new(9).into();
        let envelope = Envelope::with_options("hi", SendOptions::new().with_sender(sender.clone()));

        assert_eq!(envelope.sender(), Some(&sender));
        assert!(!envelope.is_tell());
        assert_eq!(envelope.message().as_user(), Some(&"hi"));
        assert_eq!(envelope.to_string(), "sender=local#9 msg=user");
    }

    #[test]
    fn test_reply_conversion() {
        assert_eq!(Message::from_result(Ok(Some(5))).into_user(), Some(5));
        assert!(matches!(Message::<i32>::from_result(Ok(None)), Message::NoReply));

        let failed = Message::<i32>::from_result(Err(HandlerError::new("nope").with_code(404)));
        assert!(failed.is_error());
        let err = failed.into_reply().unwrap_err();
        assert_eq!(err.code(), Some(404));
    }
}

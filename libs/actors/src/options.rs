//! Spawn and send options

use crate::address::Address;
use crate::config::DEFAULT_MAILBOX_CAPACITY;
use crate::error::{ActorError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a send does when the destination mailbox is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Wait for space, applying backpressure to the sender
    #[default]
    Block,
    /// Fail immediately with `MailboxFull`
    Drop,
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverflowPolicy::Block => f.write_str("block"),
            OverflowPolicy::Drop => f.write_str("drop"),
        }
    }
}

impl FromStr for OverflowPolicy {
    type Err = ActorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "block" => Ok(OverflowPolicy::Block),
            "drop" => Ok(OverflowPolicy::Drop),
            other => Err(ActorError::configuration(
                format!("unknown overflow policy '{other}', expected 'block' or 'drop'"),
                Some("overflow"),
            )),
        }
    }
}

/// Options applied when an actor is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnOptions {
    pub mailbox_capacity: usize,
    pub overflow: OverflowPolicy,
}

impl Default for SpawnOptions {
    fn default() -> Self {
        Self {
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            overflow: OverflowPolicy::Block,
        }
    }
}

impl SpawnOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounded mailbox of `capacity` envelopes with the given overflow policy
    pub fn with_mailbox(mut self, capacity: usize, overflow: OverflowPolicy) -> Self {
        self.mailbox_capacity = capacity;
        self.overflow = overflow;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = capacity;
        self
    }

    pub fn dropping(mut self) -> Self {
        self.overflow = OverflowPolicy::Drop;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.mailbox_capacity == 0 {
            return Err(ActorError::configuration(
                "Mailbox capacity must be greater than 0",
                Some("mailbox_capacity"),
            ));
        }
        Ok(())
    }
}

/// Options applied to a single send
pub struct SendOptions<M> {
    /// Sender stamped on the envelope; replies are routed here
    pub sender: Option<Address<M>>,
    /// Suppress the automatic reply even when a sender is present
    pub as_tell: bool,
}

impl<M> SendOptions<M> {
    pub fn new() -> Self {
        Self {
            sender: None,
            as_tell: false,
        }
    }

    pub fn with_sender(mut self, sender: Address<M>) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn as_tell(mut self) -> Self {
        self.as_tell = true;
        self
    }

    /// Fill in `sender` only if the caller did not set one
    pub(crate) fn or_sender(mut self, sender: &Address<M>) -> Self {
        if self.sender.is_none() {
            self.sender = Some(sender.clone());
        }
        self
    }
}

impl<M> Default for SendOptions<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Clone for SendOptions<M> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            as_tell: self.as_tell,
        }
    }
}

impl<M> fmt::Debug for SendOptions<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendOptions")
            .field("sender", &self.sender.as_ref().map(|s| s.to_string()))
            .field("as_tell", &self.as_tell)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::LocalAddress;

    #[test]
    fn test_spawn_option_defaults() {
        let options = SpawnOptions::default();
        assert_eq!(options.mailbox_capacity, 1000);
        assert_eq!(options.overflow, OverflowPolicy::Block);
        assert!(options.validate().is_ok());

        let options = SpawnOptions::new().with_capacity(0);
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_overflow_policy_parsing() {
        assert_eq!("drop".parse::<OverflowPolicy>().unwrap(), OverflowPolicy::Drop);
        assert_eq!(" Block ".parse::<OverflowPolicy>().unwrap(), OverflowPolicy::Block);
        assert!("spill".parse::<OverflowPolicy>().is_err());
    }

    #[test]
    fn test_caller_sender_wins_over_stamped_sender() {
        let stamped: Address<()> = LocalAddress::new(1).into();
        let explicit: Address<()> = LocalAddress::new(2).into();

        let options = SendOptions::new().or_sender(&stamped);
        assert_eq!(options.sender, Some(stamped.clone()));

        let options = SendOptions::new().with_sender(explicit.clone()).or_sender(&stamped);
        assert_eq!(options.sender, Some(explicit));
    }
}

//! Actor Addressing
//!
//! Opaque handles to message destinations. A [`LocalAddress`] names a unit
//! registered in a [`crate::System`]; a [`ReplyAddress`] exists only while an
//! ask waits for its answer.

use crate::messages::Envelope;
use std::fmt;
use std::hash::{Hash, Hasher};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Identity of a registered actor
///
/// Assigned by the owning system in spawn order, starting at 1 and never
/// reused for the lifetime of that system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalAddress {
    id: u64,
}

impl LocalAddress {
    pub(crate) fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl fmt::Display for LocalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "local#{}", self.id)
    }
}

/// Ephemeral destination for the answer to one ask
pub struct ReplyAddress<M> {
    id: Uuid,
    channel: mpsc::Sender<Envelope<M>>,
}

impl<M> ReplyAddress<M> {
    /// Create a reply address with a fresh random identity and its receiver
    pub(crate) fn new() -> (Self, mpsc::Receiver<Envelope<M>>) {
        let (channel, receiver) = mpsc::channel(1);
        let address = Self {
            id: Uuid::new_v4(),
            channel,
        };
        (address, receiver)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) fn channel(&self) -> &mpsc::Sender<Envelope<M>> {
        &self.channel
    }
}

impl<M> Clone for ReplyAddress<M> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            channel: self.channel.clone(),
        }
    }
}

impl<M> PartialEq for ReplyAddress<M> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<M> Eq for ReplyAddress<M> {}

impl<M> Hash for ReplyAddress<M> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<M> fmt::Display for ReplyAddress<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reply#{}", self.id.simple())
    }
}

impl<M> fmt::Debug for ReplyAddress<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplyAddress")
            .field("id", &self.id)
            .field("closed", &self.channel.is_closed())
            .finish()
    }
}

/// Destination of a message
pub enum Address<M> {
    /// Durable address of a registered actor
    Local(LocalAddress),
    /// Private channel of an in-flight ask
    Reply(ReplyAddress<M>),
}

impl<M> Address<M> {
    /// Local identity, if this is a local address
    pub fn local(&self) -> Option<LocalAddress> {
        match self {
            Address::Local(local) => Some(*local),
            Address::Reply(_) => None,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Address::Local(_))
    }

    pub fn is_reply(&self) -> bool {
        matches!(self, Address::Reply(_))
    }
}

impl<M> From<LocalAddress> for Address<M> {
    fn from(local: LocalAddress) -> Self {
        Address::Local(local)
    }
}

impl<M> Clone for Address<M> {
    fn clone(&self) -> Self {
        match self {
            Address::Local(local) => Address::Local(*local),
            Address::Reply(reply) => Address::Reply(reply.clone()),
        }
    }
}

impl<M> PartialEq for Address<M> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Address::Local(a), Address::Local(b)) => a == b,
            (Address::Reply(a), Address::Reply(b)) => a == b,
            _ => false,
        }
    }
}

impl<M> Eq for Address<M> {}

impl<M> Hash for Address<M> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Address::Local(local) => {
                0u8.hash(state);
                local.hash(state);
            }
            Address::Reply(reply) => {
                1u8.hash(state);
                reply.hash(state);
            }
        }
    }
}

impl<M> fmt::Display for Address<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Local(local) => local.fmt(f),
            Address::Reply(reply) => reply.fmt(f),
        }
    }
}

impl<M> fmt::Debug for Address<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Local(local) => f.debug_tuple("Local").field(local).finish(),
            Address::Reply(reply) => f.debug_tuple("Reply").field(reply).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_local_address_equality_is_identity() {
        let a: Address<()> = LocalAddress::new(1).into();
        let b: Address<()> = LocalAddress::new(1).into();
        let c: Address<()> = LocalAddress::new(2).into();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.to_string(), "local#1");
        assert_eq!(a.local().map(|l| l.id()), Some(1));
    }

    #[test]
    fn test_reply_addresses_never_collide() {
        let ids: HashSet<Uuid> = (0..10_000)
            .map(|_| ReplyAddress::<()>::new().0.id())
            .collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_reply_and_local_are_distinct() {
        let (reply, _rx) = ReplyAddress::<()>::new();
        let reply = Address::Reply(reply);
        let local: Address<()> = LocalAddress::new(1).into();

        assert_ne!(reply, local);
        assert!(reply.is_reply());
        assert!(reply.local().is_none());
        assert!(reply.to_string().starts_with("reply#"));
        assert_eq!(reply.clone(), reply);
    }
}

//! Execution Context
//!
//! The value handed to every handler invocation. It carries the actor's own
//! address, the sender of the message being handled, the system-wide
//! cancellation token, and forwards messaging and supervision calls to the
//! owning [`System`], stamping the actor as sender on outgoing messages.

use crate::actor::ActorBehavior;
use crate::address::Address;
use crate::error::Result;
use crate::messages::Message;
use crate::options::{SendOptions, SpawnOptions};
use crate::system::System;

use std::fmt;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub struct Context<M> {
    system: System<M>,
    myself: Address<M>,
    sender: Option<Address<M>>,
    cancellation: CancellationToken,
}

impl<M> Clone for Context<M> {
    fn clone(&self) -> Self {
        Self {
            system: self.system.clone(),
            myself: self.myself.clone(),
            sender: self.sender.clone(),
            cancellation: self.cancellation.clone(),
        }
    }
}

impl<M> fmt::Debug for Context<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("myself", &self.myself.to_string())
            .field("sender", &self.sender.as_ref().map(|s| s.to_string()))
            .field("cancelled", &self.cancellation.is_cancelled())
            .finish()
    }
}

impl<M: Send + 'static> Context<M> {
    pub(crate) fn new(
        system: System<M>,
        myself: Address<M>,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            system,
            myself,
            sender: None,
            cancellation,
        }
    }

    /// Copy of this context for a message from `sender`
    pub fn with_sender(&self, sender: Option<Address<M>>) -> Self {
        Self {
            system: self.system.clone(),
            myself: self.myself.clone(),
            sender,
            cancellation: self.cancellation.clone(),
        }
    }

    /// Address of the actor running this handler
    pub fn myself(&self) -> &Address<M> {
        &self.myself
    }

    /// Sender of the message currently being handled
    pub fn sender(&self) -> Option<&Address<M>> {
        self.sender.as_ref()
    }

    pub fn system(&self) -> &System<M> {
        &self.system
    }

    /// Token cancelled when the owning system stops
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub async fn tell(&self, to: &Address<M>, msg: impl Into<Message<M>> + Send) -> Result<()> {
        self.tell_with(to, msg, SendOptions::new()).await
    }

    /// Tell with `myself` as sender unless `options` names another one
    pub async fn tell_with(
        &self,
        to: &Address<M>,
        msg: impl Into<Message<M>> + Send,
        options: SendOptions<M>,
    ) -> Result<()> {
        self.system
            .tell_with(to, msg, options.or_sender(&self.myself))
            .await
    }

    /// Send a request whose reply is routed into this actor's mailbox
    pub async fn send(
        &self,
        to: &Address<M>,
        msg: impl Into<Message<M>> + Send,
        options: SendOptions<M>,
    ) -> Result<()> {
        self.system.send(to, msg, options.or_sender(&self.myself)).await
    }

    pub async fn ask(
        &self,
        to: &Address<M>,
        msg: impl Into<Message<M>> + Send,
    ) -> Result<Message<M>> {
        self.system.ask(to, msg).await
    }

    pub async fn ask_with_timeout(
        &self,
        to: &Address<M>,
        msg: impl Into<Message<M>> + Send,
        timeout: Duration,
    ) -> Result<Message<M>> {
        self.system.ask_with_timeout(to, msg, timeout).await
    }

    pub fn spawn<A>(&self, behavior: A) -> Result<Address<M>>
    where
        A: ActorBehavior<Message = M>,
    {
        self.system.spawn(behavior)
    }

    pub fn spawn_with<A>(&self, behavior: A, options: SpawnOptions) -> Result<Address<M>>
    where
        A: ActorBehavior<Message = M>,
    {
        self.system.spawn_with(behavior, options)
    }

    pub async fn kill(&self, address: &Address<M>, graceful: bool) -> Result<()> {
        self.system.kill(address, graceful).await
    }
}

//! Actor System Core
//!
//! Registry, supervisor and messenger in one cloneable handle. Every clone
//! refers to the same registry, cancellation token and metrics.
//!
//! # Locking
//!
//! The registry is the only state shared between callers. Spawn and kill take
//! the write lock, tell and ask take the read lock. The lock is never held
//! across an `.await`: handles are cloned out and the guard released before
//! any delivery.

use crate::actor::{ActorBehavior, ActorHandle, ActorTask};
use crate::address::{Address, LocalAddress, ReplyAddress};
use crate::config::SystemConfig;
use crate::context::Context;
use crate::error::{ActorError, Result};
use crate::messages::{Envelope, Message};
use crate::metrics::{SystemMetrics, SystemStats};
use crate::options::{SendOptions, SpawnOptions};
use crate::registry::ActorRegistry;

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, info_span, trace, warn, Instrument, Span};
use uuid::Uuid;

/// Core actor system managing actor lifecycles and routing
pub struct System<M> {
    inner: Arc<SystemInner<M>>,
}

struct SystemInner<M> {
    /// System ID for debugging
    id: String,
    config: SystemConfig,
    registry: RwLock<ActorRegistry<M>>,
    /// Parent of every actor's cancellation
    shutdown: CancellationToken,
    /// Every execution loop spawned by this system
    tasks: TaskTracker,
    metrics: SystemMetrics,
    span: Span,
}

impl<M> Clone for System<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<M> fmt::Debug for System<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("System")
            .field("id", &self.inner.id)
            .field("name", &self.inner.config.name)
            .field("stopped", &self.inner.shutdown.is_cancelled())
            .finish()
    }
}

impl<M: Send + 'static> Default for System<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Send + 'static> System<M> {
    /// Create a system with default configuration
    pub fn new() -> Self {
        Self::build(SystemConfig::default())
    }

    /// Create a system from validated configuration
    pub fn with_config(config: SystemConfig) -> Result<Self> {
        config.validate().map_err(|e| {
            warn!(error = %e, "System configuration validation failed");
            e
        })?;
        Ok(Self::build(config))
    }

    fn build(config: SystemConfig) -> Self {
        let id = format!("system-{}", Uuid::new_v4().simple());
        let span = info_span!("system", id = %id, name = %config.name);
        info!(system_id = %id, name = %config.name, "Creating new actor system");

        Self {
            inner: Arc::new(SystemInner {
                id,
                config,
                registry: RwLock::new(ActorRegistry::new()),
                shutdown: CancellationToken::new(),
                tasks: TaskTracker::new(),
                metrics: SystemMetrics::default(),
                span,
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn config(&self) -> &SystemConfig {
        &self.inner.config
    }

    pub fn metrics(&self) -> SystemStats {
        self.inner.metrics.snapshot()
    }

    pub(crate) fn metrics_ref(&self) -> &SystemMetrics {
        &self.inner.metrics
    }

    /// Drop the registry entry of an actor whose loop has exited
    pub(crate) fn deregister(&self, address: LocalAddress) -> bool {
        self.inner.registry.write().remove(&address).is_some()
    }

    /// Spawn a new actor with the configured default mailbox
    pub fn spawn<A>(&self, behavior: A) -> Result<Address<M>>
    where
        A: ActorBehavior<Message = M>,
    {
        self.spawn_with(behavior, self.inner.config.spawn_options())
    }

    /// Spawn a new actor
    ///
    /// The actor is registered and told [`Message::Start`] before this
    /// returns; `Start` is always the first message it handles. Must be called
    /// from within a tokio runtime.
    pub fn spawn_with<A>(&self, behavior: A, options: SpawnOptions) -> Result<Address<M>>
    where
        A: ActorBehavior<Message = M>,
    {
        options.validate()?;

        let (sender, receiver) = mpsc::channel(options.mailbox_capacity);
        let stopper = CancellationToken::new();

        let address = {
            let mut registry = self.inner.registry.write();
            let address = registry.allocate();
            let handle = ActorHandle::new(address, sender, options.overflow, stopper.clone());
            // Fresh mailbox with capacity >= 1, cannot be full
            handle.try_deliver(Envelope::new(Message::Start).as_tell())?;
            registry.insert(handle);
            address
        };

        let context = Context::new(
            self.clone(),
            Address::Local(address),
            self.inner.shutdown.child_token(),
        );
        let task = ActorTask::new(address, behavior, receiver, stopper, context);
        let span = info_span!(parent: &self.inner.span, "actor", address = %address);
        self.inner.tasks.spawn(task.run().instrument(span));

        self.inner.metrics.record_spawned();
        debug!(
            actor = %address,
            system_id = %self.inner.id,
            actor_type = std::any::type_name::<A>(),
            mailbox_capacity = options.mailbox_capacity,
            overflow = %options.overflow,
            "Spawned new local actor"
        );

        Ok(Address::Local(address))
    }

    /// Remove an actor from the registry and stop it
    ///
    /// Once this returns, sends to `address` fail with `ActorNotFound` even if
    /// the actor is still draining its mailbox. Killing an address that is not
    /// registered returns `ActorNotFound`.
    pub async fn kill(&self, address: &Address<M>, graceful: bool) -> Result<()> {
        trace!(actor = %address, graceful, "kill()");
        let local = match address {
            Address::Local(local) => *local,
            Address::Reply(_) => return Err(ActorError::address_unsupported(address, "kill")),
        };

        let handle = self.inner.registry.write().remove(&local);
        let Some(handle) = handle else {
            warn!(actor = %local, "Attempted to kill unknown actor");
            return Err(ActorError::actor_not_found(local));
        };

        handle.stop(graceful).await;
        debug!(actor = %local, graceful, "Actor removed from registry");
        Ok(())
    }

    /// Fire-and-forget send; never produces an automatic reply
    pub async fn tell(&self, to: &Address<M>, msg: impl Into<Message<M>> + Send) -> Result<()> {
        self.tell_with(to, msg, SendOptions::new()).await
    }

    pub async fn tell_with(
        &self,
        to: &Address<M>,
        msg: impl Into<Message<M>> + Send,
        options: SendOptions<M>,
    ) -> Result<()> {
        self.send(to, msg, options.as_tell()).await
    }

    /// Deliver one envelope built from `options`
    ///
    /// Without `as_tell` and with a sender, the receiving actor routes its
    /// handler result back to that sender. Reply addresses never block;
    /// local addresses follow the destination's overflow policy.
    pub async fn send(
        &self,
        to: &Address<M>,
        msg: impl Into<Message<M>> + Send,
        options: SendOptions<M>,
    ) -> Result<()> {
        let envelope = Envelope::with_options(msg, options);
        trace!(to = %to, envelope = %envelope, "send()");

        match to {
            Address::Reply(reply) => match reply.channel().try_send(envelope) {
                Ok(()) => Ok(()),
                Err(TrySendError::Full(_)) => Err(ActorError::mailbox_full(reply)),
                Err(TrySendError::Closed(_)) => Err(ActorError::channel_closed(reply)),
            },
            Address::Local(local) => {
                let handle = self.inner.registry.read().get(local);
                let handle = handle.ok_or_else(|| ActorError::actor_not_found(local))?;

                let result = handle.deliver(envelope).await;
                if let Err(ActorError::MailboxFull { .. }) = &result {
                    self.inner.metrics.record_mailbox_full();
                    warn!(actor = %local, "Mailbox full, message dropped");
                }
                result
            }
        }
    }

    /// Send a request and wait for its reply using the configured timeout
    pub async fn ask(
        &self,
        to: &Address<M>,
        msg: impl Into<Message<M>> + Send,
    ) -> Result<Message<M>> {
        self.ask_with_timeout(to, msg, self.inner.config.ask_timeout())
            .await
    }

    /// Send a request and wait at most `timeout` for its reply
    ///
    /// The reply is returned as-is: a handler failure arrives as
    /// [`Message::Error`], not as an `Err`. A failed send returns at once.
    pub async fn ask_with_timeout(
        &self,
        to: &Address<M>,
        msg: impl Into<Message<M>> + Send,
        timeout: Duration,
    ) -> Result<Message<M>> {
        let (reply, mut replies) = ReplyAddress::new();
        let reply_label = reply.to_string();
        trace!(to = %to, reply = %reply_label, timeout_ms = timeout.as_millis() as u64, "ask()");

        self.send(to, msg, SendOptions::new().with_sender(Address::Reply(reply)))
            .await?;

        match tokio::time::timeout(timeout, replies.recv()).await {
            Ok(Some(envelope)) => Ok(envelope.into_message()),
            Ok(None) => {
                warn!(to = %to, reply = %reply_label, "Reply channel closed without a reply");
                Err(ActorError::channel_closed(reply_label))
            }
            Err(_) => {
                self.inner.metrics.record_ask_timeout();
                debug!(to = %to, reply = %reply_label, "Ask timed out");
                Err(ActorError::talk_timeout(to, timeout.as_millis() as u64))
            }
        }
    }

    /// Cancel every actor's context; does not wait for them to finish
    pub fn stop(&self) {
        info!(system_id = %self.inner.id, "Stopping actor system");
        self.inner.shutdown.cancel();
    }

    /// Stop and wait until every execution loop of this system has exited
    ///
    /// Exited loops remove their own registry entries, so the registry is
    /// empty once this returns.
    pub async fn shutdown(&self) {
        self.stop();
        self.inner.tasks.close();
        self.inner.tasks.wait().await;
        info!(system_id = %self.inner.id, "Actor system shutdown complete");
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }

    /// True if a unit is registered under `address`
    ///
    /// Killed actors leave the registry at once; actors stopped any other way
    /// leave it when their loop exits.
    pub fn contains(&self, address: &Address<M>) -> bool {
        match address {
            Address::Local(local) => self.inner.registry.read().contains(local),
            Address::Reply(_) => false,
        }
    }

    pub fn actor_count(&self) -> usize {
        self.inner.registry.read().len()
    }

    /// Registered actors in spawn order
    pub fn list_actors(&self) -> Vec<Address<M>> {
        self.inner
            .registry
            .read()
            .addresses()
            .into_iter()
            .map(Address::Local)
            .collect()
    }
}

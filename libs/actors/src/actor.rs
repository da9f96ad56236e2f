//! Actor Runtime Unit
//!
//! One [`ActorBehavior`] wrapped with a bounded mailbox, an execution loop and
//! a stop mechanism.
//!
//! # Execution loop
//!
//! ```text
//!            mailbox ──► handle ──► route reply (requests only)
//!               │           │
//!   Running ────┼───────────┴── Stop handled ──► close mailbox ──► Terminated
//!               ├── mailbox closed & empty ─────────────────────► Terminated
//!               ├── global cancel ─► handle synthesized Stop ───► Terminated
//!               └── abrupt stop ────────────────────────────────► Terminated
//! ```
//!
//! Global cancellation and abrupt stop take priority over the mailbox: once
//! either has fired, envelopes still queued are discarded without being
//! handled. A loop that exits for any reason removes its own registry entry.

use crate::address::LocalAddress;
use crate::context::Context;
use crate::error::{ActorError, Result};
use crate::messages::{Envelope, HandlerResult, Message};
use crate::options::OverflowPolicy;

use async_trait::async_trait;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// Trait for actor behavior
///
/// Invocations for one actor are strictly serialized, so `&mut self` state
/// needs no locking.
#[async_trait]
pub trait ActorBehavior: Send + 'static {
    type Message: Send + 'static;

    /// Handle one message
    ///
    /// When the message was sent as a request (not a tell, with a sender), the
    /// returned value is routed back to the sender.
    async fn handle(
        &mut self,
        ctx: &Context<Self::Message>,
        msg: Message<Self::Message>,
    ) -> HandlerResult<Self::Message>;
}

/// Registry entry for a running actor
pub(crate) struct ActorHandle<M> {
    address: LocalAddress,
    mailbox: mpsc::Sender<Envelope<M>>,
    overflow: OverflowPolicy,
    stopper: CancellationToken,
}

impl<M> Clone for ActorHandle<M> {
    fn clone(&self) -> Self {
        Self {
            address: self.address,
            mailbox: self.mailbox.clone(),
            overflow: self.overflow,
            stopper: self.stopper.clone(),
        }
    }
}

impl<M: Send + 'static> ActorHandle<M> {
    pub(crate) fn new(
        address: LocalAddress,
        mailbox: mpsc::Sender<Envelope<M>>,
        overflow: OverflowPolicy,
        stopper: CancellationToken,
    ) -> Self {
        Self {
            address,
            mailbox,
            overflow,
            stopper,
        }
    }

    pub(crate) fn address(&self) -> LocalAddress {
        self.address
    }

    /// Enqueue according to the overflow policy
    pub(crate) async fn deliver(&self, envelope: Envelope<M>) -> Result<()> {
        match self.overflow {
            OverflowPolicy::Block => self
                .mailbox
                .send(envelope)
                .await
                .map_err(|_| ActorError::actor_not_found(self.address)),
            OverflowPolicy::Drop => self.try_deliver(envelope),
        }
    }

    /// Enqueue without waiting, whatever the overflow policy
    pub(crate) fn try_deliver(&self, envelope: Envelope<M>) -> Result<()> {
        match self.mailbox.try_send(envelope) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(ActorError::mailbox_full(self.address)),
            Err(TrySendError::Closed(_)) => Err(ActorError::actor_not_found(self.address)),
        }
    }

    /// Request termination
    ///
    /// Graceful stops travel through the mailbox behind everything already
    /// queued and always wait for space. Abrupt stops bypass the mailbox.
    pub(crate) async fn stop(self, graceful: bool) {
        trace!(actor = %self.address, graceful, "stop()");
        if graceful {
            if self.mailbox.send(Envelope::new(Message::Stop)).await.is_err() {
                debug!(actor = %self.address, "Actor loop already exited, stop message not queued");
            }
        } else {
            self.stopper.cancel();
        }
    }
}

/// Why an execution loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopExit {
    StopHandled,
    MailboxClosed,
    Cancelled,
    Aborted,
}

/// Actor task runner, owned by the spawned tokio task
pub(crate) struct ActorTask<A: ActorBehavior> {
    address: LocalAddress,
    behavior: A,
    mailbox: mpsc::Receiver<Envelope<A::Message>>,
    stopper: CancellationToken,
    context: Context<A::Message>,
}

impl<A: ActorBehavior> ActorTask<A> {
    pub(crate) fn new(
        address: LocalAddress,
        behavior: A,
        mailbox: mpsc::Receiver<Envelope<A::Message>>,
        stopper: CancellationToken,
        context: Context<A::Message>,
    ) -> Self {
        Self {
            address,
            behavior,
            mailbox,
            stopper,
            context,
        }
    }

    pub(crate) async fn run(mut self) {
        let task_start = Instant::now();
        let shutdown = self.context.cancellation().clone();
        let stopper = self.stopper.clone();

        debug!(actor = %self.address, "Entering message loop");

        // Stop signals are polled before the mailbox so nothing queued is
        // handled once either has fired
        let exit = loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    self.deliver(Envelope::new(Message::Stop)).await;
                    break LoopExit::Cancelled;
                }
                _ = stopper.cancelled() => break LoopExit::Aborted,
                received = self.mailbox.recv() => match received {
                    Some(envelope) => {
                        let is_stop = envelope.message().is_stop();
                        self.deliver(envelope).await;
                        if is_stop {
                            self.mailbox.close();
                            break LoopExit::StopHandled;
                        }
                    }
                    None => break LoopExit::MailboxClosed,
                },
            }
        };

        let discarded = self.mailbox.len();
        if discarded > 0 && matches!(exit, LoopExit::Cancelled | LoopExit::Aborted) {
            warn!(
                actor = %self.address,
                exit = ?exit,
                discarded,
                "Actor terminated with unprocessed messages"
            );
        }

        let system = self.context.system();
        if system.deregister(self.address) {
            debug!(actor = %self.address, "Removed exited actor from registry");
        }
        system.metrics_ref().record_stopped();
        info!(
            actor = %self.address,
            exit = ?exit,
            total_runtime_ms = task_start.elapsed().as_millis() as u64,
            "Actor terminated"
        );
    }

    /// Invoke the handler and route its result if the envelope asks for it
    async fn deliver(&mut self, envelope: Envelope<A::Message>) {
        let (message, sender, is_tell) = envelope.into_parts();
        let kind = message.kind();
        trace!(
            actor = %self.address,
            kind,
            sender = ?sender.as_ref().map(|s| s.to_string()),
            is_tell,
            "Received envelope"
        );

        let ctx = self.context.with_sender(sender.clone());
        let start = Instant::now();
        let result = self.behavior.handle(&ctx, message).await;

        let metrics = self.context.system().metrics_ref();
        metrics.record_message_handled(start.elapsed());
        if result.is_err() {
            metrics.record_handler_failure();
        }

        match sender {
            Some(sender) if !is_tell => {
                let reply = Message::from_result(result);
                debug!(actor = %self.address, to = %sender, reply = reply.kind(), "Routing reply");
                match ctx.tell(&sender, reply).await {
                    Ok(()) => metrics.record_reply_routed(),
                    Err(e) => warn!(
                        actor = %self.address,
                        to = %sender,
                        error = %e,
                        error_category = e.category(),
                        "Could not deliver reply"
                    ),
                }
            }
            _ => {
                if let Err(e) = result {
                    warn!(
                        actor = %self.address,
                        kind,
                        error = %e,
                        code = ?e.code(),
                        "Handler failed on a message without reply path, error dropped"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_drop_policy_reports_full_mailbox() {
        let (sender, _receiver) = mpsc::channel::<Envelope<u8>>(1);
        let handle = ActorHandle::new(
            LocalAddress::new(4),
            sender,
            OverflowPolicy::Drop,
            CancellationToken::new(),
        );

        handle.deliver(Envelope::new(1u8)).await.unwrap();
        let err = handle.deliver(Envelope::new(2u8)).await.unwrap_err();
        assert_eq!(err, ActorError::mailbox_full("local#4"));
    }

    #[tokio::test]
    async fn test_closed_mailbox_reports_not_found() {
        let (sender, receiver) = mpsc::channel::<Envelope<u8>>(1);
        drop(receiver);
        let handle = ActorHandle::new(
            LocalAddress::new(2),
            sender,
            OverflowPolicy::Block,
            CancellationToken::new(),
        );

        let err = handle.deliver(Envelope::new(1u8)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_graceful_stop_is_queued_behind_messages() {
        let (sender, mut receiver) = mpsc::channel::<Envelope<u8>>(4);
        let stopper = CancellationToken::new();
        let handle = ActorHandle::new(
            LocalAddress::new(1),
            sender,
            OverflowPolicy::Block,
            stopper.clone(),
        );

        handle.deliver(Envelope::new(7u8)).await.unwrap();
        handle.clone().stop(true).await;

        assert_eq!(receiver.recv().await.unwrap().into_message().into_user(), Some(7));
        assert!(receiver.recv().await.unwrap().message().is_stop());
        assert!(!stopper.is_cancelled());
    }

    #[tokio::test]
    async fn test_abrupt_stop_bypasses_mailbox() {
        let (sender, mut receiver) = mpsc::channel::<Envelope<u8>>(4);
        let stopper = CancellationToken::new();
        let handle = ActorHandle::new(
            LocalAddress::new(1),
            sender,
            OverflowPolicy::Block,
            stopper.clone(),
        );

        handle.stop(false).await;

        assert!(stopper.is_cancelled());
        assert!(receiver.try_recv().is_err());
    }
}

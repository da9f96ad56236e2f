//! Shared actors and helpers for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use local_actors::{ActorBehavior, Context, HandlerError, HandlerResult, Message};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};

/// Initialize tracing for tests (call once per test)
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::INFO)
        .try_init();
}

/// Payload shared by the test actors
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    Value(u64),
    Values(Vec<u64>),
    GetValues,
    Sleep(Duration),
    Block,
    Fail(u16),
}

/// Observable trace of what a [`Recorder`] handled
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Start,
    Stop,
    NoReply,
    Error(Option<u16>),
    User(Msg),
}

/// Records every message it handles and answers `GetValues`
pub struct Recorder {
    values: Vec<u64>,
    events: mpsc::UnboundedSender<Event>,
}

impl Recorder {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (events, receiver) = mpsc::unbounded_channel();
        (
            Self {
                values: Vec::new(),
                events,
            },
            receiver,
        )
    }
}

#[async_trait]
impl ActorBehavior for Recorder {
    type Message = Msg;

    async fn handle(&mut self, _ctx: &Context<Msg>, msg: Message<Msg>) -> HandlerResult<Msg> {
        let event = match &msg {
            Message::Start => Event::Start,
            Message::Stop => Event::Stop,
            Message::NoReply => Event::NoReply,
            Message::Error(e) => Event::Error(e.code()),
            Message::User(m) => Event::User(m.clone()),
        };
        let _ = self.events.send(event);

        match msg {
            Message::User(Msg::Value(n)) => {
                self.values.push(n);
                Ok(None)
            }
            Message::User(Msg::GetValues) => Ok(Some(Msg::Values(self.values.clone()))),
            Message::User(Msg::Fail(code)) => {
                Err(HandlerError::new("requested failure").with_code(code))
            }
            _ => Ok(None),
        }
    }
}

/// Replies with whatever user payload it receives; `Fail` produces an error
pub struct Echo;

#[async_trait]
impl ActorBehavior for Echo {
    type Message = Msg;

    async fn handle(&mut self, _ctx: &Context<Msg>, msg: Message<Msg>) -> HandlerResult<Msg> {
        match msg {
            Message::User(Msg::Fail(code)) => {
                Err(HandlerError::new("echo refused").with_code(code))
            }
            other => Ok(other.into_user()),
        }
    }
}

/// Sleeps on `Sleep`, tracking the highest number of concurrent invocations
#[derive(Default)]
pub struct Sleeper {
    pub in_flight: Arc<AtomicUsize>,
    pub max_in_flight: Arc<AtomicUsize>,
}

#[async_trait]
impl ActorBehavior for Sleeper {
    type Message = Msg;

    async fn handle(&mut self, _ctx: &Context<Msg>, msg: Message<Msg>) -> HandlerResult<Msg> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let reply = match msg {
            Message::User(Msg::Sleep(duration)) => {
                tokio::time::sleep(duration).await;
                None
            }
            other => other.into_user(),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(reply)
    }
}

/// Parks inside its handler on `Block` until released; counts `Value`s
pub struct Blocker {
    pub handled: Arc<AtomicUsize>,
    entered: mpsc::UnboundedSender<()>,
    release: Arc<Notify>,
}

impl Blocker {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<()>, Arc<Notify>) {
        let (entered, receiver) = mpsc::unbounded_channel();
        let release = Arc::new(Notify::new());
        (
            Self {
                handled: Arc::new(AtomicUsize::new(0)),
                entered,
                release: Arc::clone(&release),
            },
            receiver,
            release,
        )
    }
}

#[async_trait]
impl ActorBehavior for Blocker {
    type Message = Msg;

    async fn handle(&mut self, _ctx: &Context<Msg>, msg: Message<Msg>) -> HandlerResult<Msg> {
        match msg {
            Message::User(Msg::Block) => {
                let _ = self.entered.send(());
                self.release.notified().await;
                Ok(None)
            }
            Message::User(Msg::Value(n)) => {
                self.handled.fetch_add(1, Ordering::SeqCst);
                Ok(Some(Msg::Value(n)))
            }
            other => Ok(other.into_user()),
        }
    }
}

/// Collect recorder events until the recorder is dropped
pub async fn drain(mut events: mpsc::UnboundedReceiver<Event>) -> Vec<Event> {
    let mut out = Vec::new();
    while let Ok(Some(event)) = tokio::time::timeout(Duration::from_secs(5), events.recv()).await {
        out.push(event);
    }
    out
}

/// Wait until `address` has handled everything queued so far
///
/// Retries while a drop-policy mailbox is full.
pub async fn wait_idle(
    system: &local_actors::System<Msg>,
    address: &local_actors::Address<Msg>,
) {
    loop {
        match system.ask(address, Msg::Value(0)).await {
            Ok(_) => return,
            Err(local_actors::ActorError::MailboxFull { .. }) => tokio::task::yield_now().await,
            Err(e) => panic!("actor {address} did not become idle: {e}"),
        }
    }
}

/// Values recorded so far, fetched with an ask
pub async fn recorded_values(
    system: &local_actors::System<Msg>,
    recorder: &local_actors::Address<Msg>,
) -> Vec<u64> {
    match system.ask(recorder, Msg::GetValues).await {
        Ok(Message::User(Msg::Values(values))) => values,
        other => panic!("unexpected reply to GetValues: {other:?}"),
    }
}

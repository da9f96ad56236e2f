//! Counter Demo
//!
//! A counter actor reports every change to a control actor and asks it to
//! quit once the count drops below zero.
//!
//! ```bash
//! RUST_LOG=info,local_actors=debug cargo run -p local-actors --example counter
//! ```

use anyhow::{anyhow, Context as _, Result};
use async_trait::async_trait;
use local_actors::{ActorBehavior, Address, Context, HandlerResult, Message, System, SystemConfig};
use tokio::sync::oneshot;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
enum Command {
    Hi,
    Add(i64),
    Sub(i64),
    State(i64),
    Tap,
    Quit,
}

struct Counter {
    count: i64,
    control: Address<Command>,
}

#[async_trait]
impl ActorBehavior for Counter {
    type Message = Command;

    async fn handle(
        &mut self,
        ctx: &Context<Command>,
        msg: Message<Command>,
    ) -> HandlerResult<Command> {
        let check = match msg {
            Message::User(Command::Hi) => {
                info!("👋 hi from {}", ctx.myself());
                false
            }
            Message::User(Command::Add(amount)) => {
                self.count += amount;
                true
            }
            Message::User(Command::Sub(amount)) => {
                self.count -= amount;
                true
            }
            _ => return Ok(None),
        };
        ctx.tell(&self.control, Command::Tap).await?;

        if check && self.count < 0 {
            ctx.tell(&self.control, Command::Quit).await?;
        }
        Ok(Some(Command::State(self.count)))
    }
}

struct Control {
    close: Option<oneshot::Sender<()>>,
}

#[async_trait]
impl ActorBehavior for Control {
    type Message = Command;

    async fn handle(
        &mut self,
        ctx: &Context<Command>,
        msg: Message<Command>,
    ) -> HandlerResult<Command> {
        match msg {
            Message::User(Command::Tap) => info!("control tapped ..."),
            Message::User(Command::Quit) => {
                if let Some(sender) = ctx.sender() {
                    info!("{} triggered control quit", sender);
                }
                if let Some(close) = self.close.take() {
                    let _ = close.send(());
                }
            }
            _ => {}
        }
        Ok(None)
    }
}

async fn ask_count(
    system: &System<Command>,
    counter: &Address<Command>,
    cmd: Command,
) -> Result<i64> {
    match system.ask(counter, cmd).await? {
        Message::User(Command::State(count)) => Ok(count),
        Message::Error(e) => Err(anyhow!(e)),
        other => Err(anyhow!("unexpected reply: {:?}", other)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let system = System::with_config(SystemConfig::from_env())
        .context("invalid actor system configuration")?;

    let (close_tx, close_rx) = oneshot::channel();
    let control = system.spawn(Control { close: Some(close_tx) })?;
    let counter = system.spawn(Counter {
        count: 0,
        control,
    })?;

    // Non-waiting tell
    system.tell(&counter, Command::Hi).await?;

    let count = ask_count(&system, &counter, Command::Add(150)).await?;
    info!("count {} should be 150 now", count);

    let count = ask_count(&system, &counter, Command::Sub(70)).await?;
    info!("count {} should be 80 now", count);

    // Remove enough to trigger control quit
    let count = ask_count(&system, &counter, Command::Sub(81)).await?;
    info!("count {} should be -1 now, control should quit", count);

    close_rx.await.context("control actor exited without quitting")?;

    system.shutdown().await;
    info!(stats = ?system.metrics(), "✅ quit");
    Ok(())
}

//! In-Process Actor Runtime
//!
//! Independent units of state and behavior that communicate only by passing
//! messages. Each actor owns a bounded mailbox and an execution loop running on
//! its own tokio task; the [`System`] registers actors, routes messages to them
//! and supervises their lifetime.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │            System            │
//! │  registry  (RwLock)          │     tell / ask / send
//! │  shutdown  (Cancellation)    │◄──────────────────────── callers, handlers
//! │  tasks     (TaskTracker)     │
//! └──────┬───────────────┬───────┘
//!        │ mpsc          │ mpsc
//!  ┌─────▼─────┐   ┌─────▼─────┐
//!  │ local#1   │   │ local#2   │──── reply ────► reply#<uuid> (ask)
//!  │ mailbox   │   │ mailbox   │
//!  │ loop      │   │ loop      │
//!  └───────────┘   └───────────┘
//! ```
//!
//! # Guarantees
//!
//! - Messages from one sender to one actor are handled in send order
//! - One actor never runs two handler invocations at once
//! - `Start` is the first message every actor handles
//! - A request (ask, or send with a sender) gets the handler's result routed
//!   back; a tell never does
//!
//! # Examples
//!
//! ```rust
//! use async_trait::async_trait;
//! use local_actors::{ActorBehavior, Context, HandlerResult, Message, System};
//!
//! struct Doubler;
//!
//! #[async_trait]
//! impl ActorBehavior for Doubler {
//!     type Message = u64;
//!
//!     async fn handle(&mut self, _ctx: &Context<u64>, msg: Message<u64>) -> HandlerResult<u64> {
//!         Ok(msg.into_user().map(|n| n * 2))
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> local_actors::Result<()> {
//! let system = System::new();
//! let doubler = system.spawn(Doubler)?;
//!
//! let reply = system.ask(&doubler, 21u64).await?;
//! assert_eq!(reply.into_user(), Some(42));
//!
//! system.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod actor;
pub mod address;
pub mod config;
pub mod context;
pub mod error;
pub mod messages;
pub mod metrics;
pub mod options;
mod registry;
pub mod system;

pub use actor::ActorBehavior;
pub use address::{Address, LocalAddress, ReplyAddress};
pub use config::SystemConfig;
pub use context::Context;
pub use error::{ActorError, HandlerError, Result};
pub use messages::{Envelope, HandlerResult, Message};
pub use metrics::{SystemMetrics, SystemStats};
pub use options::{OverflowPolicy, SendOptions, SpawnOptions};
pub use system::System;

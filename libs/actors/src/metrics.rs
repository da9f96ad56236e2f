//! System Metrics
//!
//! Lock-free counters updated by actor loops and the messaging paths.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// System-wide counters
#[derive(Debug, Default)]
pub struct SystemMetrics {
    actors_spawned: AtomicU64,
    actors_stopped: AtomicU64,
    messages_processed: AtomicU64,
    total_processing_time_ns: AtomicU64,
    handler_failures: AtomicU64,
    replies_routed: AtomicU64,
    mailbox_full_events: AtomicU64,
    ask_timeouts: AtomicU64,
}

impl SystemMetrics {
    pub fn record_spawned(&self) {
        self.actors_spawned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stopped(&self) {
        self.actors_stopped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_message_handled(&self, duration: Duration) {
        self.messages_processed.fetch_add(1, Ordering::Relaxed);
        self.total_processing_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    pub fn record_handler_failure(&self) {
        self.handler_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reply_routed(&self) {
        self.replies_routed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a drop-policy send that found the mailbox full
    pub fn record_mailbox_full(&self) {
        self.mailbox_full_events.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ask_timeout(&self) {
        self.ask_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn avg_processing_time_ns(&self) -> f64 {
        let count = self.messages_processed.load(Ordering::Relaxed);
        if count == 0 {
            return 0.0;
        }
        let total = self.total_processing_time_ns.load(Ordering::Relaxed);
        total as f64 / count as f64
    }

    pub fn snapshot(&self) -> SystemStats {
        SystemStats {
            actors_spawned: self.actors_spawned.load(Ordering::Relaxed),
            actors_stopped: self.actors_stopped.load(Ordering::Relaxed),
            messages_processed: self.messages_processed.load(Ordering::Relaxed),
            avg_processing_time_ns: self.avg_processing_time_ns(),
            handler_failures: self.handler_failures.load(Ordering::Relaxed),
            replies_routed: self.replies_routed.load(Ordering::Relaxed),
            mailbox_full_events: self.mailbox_full_events.load(Ordering::Relaxed),
            ask_timeouts: self.ask_timeouts.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`SystemMetrics`]
#[derive(Debug, Clone, PartialEq)]
pub struct SystemStats {
    pub actors_spawned: u64,
    pub actors_stopped: u64,
    pub messages_processed: u64,
    pub avg_processing_time_ns: f64,
    pub handler_failures: u64,
    pub replies_routed: u64,
    pub mailbox_full_events: u64,
    pub ask_timeouts: u64,
}

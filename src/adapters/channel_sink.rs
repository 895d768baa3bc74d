//! Channel event sink adapter.
//!
//! Forwards engine events into a bounded `embassy-sync` channel so async
//! consumers (analytics, a UI bridge) can drain them at their own pace.
//!
//! ```text
//! ┌──────────────┐  EngineEvent  ┌────────────────┐
//! │ ActionEngine │──try_send────▶│ async consumer │
//! │   (sync)     │   (bounded)   │   .receive()   │
//! └──────────────┘               └────────────────┘
//! ```
//!
//! A full channel drops the event with a warning; a cycle never waits on a
//! slow consumer.

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::{Channel, Sender, TrySendError};
use log::warn;

use crate::app::events::EngineEvent;
use crate::app::ports::EventSink;

/// Default depth for event channels.
pub const EVENT_DEPTH: usize = 16;

/// Single-threaded event channel shared by a sink and its consumers.
pub type EventChannel<const N: usize = EVENT_DEPTH> = Channel<NoopRawMutex, EngineEvent, N>;

/// Adapter pushing events into an [`EventChannel`].
pub struct ChannelEventSink<'ch, const N: usize = EVENT_DEPTH> {
    tx: Sender<'ch, NoopRawMutex, EngineEvent, N>,
    dropped: u32,
}

impl<'ch, const N: usize> ChannelEventSink<'ch, N> {
    pub fn new(channel: &'ch EventChannel<N>) -> Self {
        Self {
            tx: channel.sender(),
            dropped: 0,
        }
    }

    /// Events discarded because the channel was full.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl<const N: usize> EventSink for ChannelEventSink<'_, N> {
    fn emit(&mut self, event: &EngineEvent) {
        if let Err(TrySendError::Full(_)) = self.tx.try_send(event.clone()) {
            self.dropped += 1;
            warn!("ChannelEventSink: channel full, event dropped ({} total)", self.dropped);
        }
    }
}

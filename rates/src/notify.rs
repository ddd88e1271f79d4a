//! Signalling fee recomputation after a rate change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

/// Emitted once for every installed rate table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatesUpdated {
    /// Unique update ID.
    pub id: Uuid,
    /// Number of rates in the new table.
    pub entries: usize,
    /// Whether the new table reached disk.
    pub persisted: bool,
    /// When the table was installed.
    pub updated_at: DateTime<Utc>,
}

impl RatesUpdated {
    pub fn new(entries: usize, persisted: bool) -> Self {
        Self {
            id: Uuid::now_v7(),
            entries,
            persisted,
            updated_at: Utc::now(),
        }
    }
}

/// Consumer that re-values pending fees when rates change.
///
/// Implementations must not block; the signal is fire-and-forget.
pub trait FeeRecompute: Send + Sync {
    fn rates_changed(&self, event: &RatesUpdated);
}

/// Forwards rate changes over an unbounded channel.
pub struct ChannelRecompute {
    tx: mpsc::UnboundedSender<RatesUpdated>,
}

impl ChannelRecompute {
    /// Create the sender half and the receiver the consumer drains.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<RatesUpdated>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl FeeRecompute for ChannelRecompute {
    fn rates_changed(&self, event: &RatesUpdated) {
        if self.tx.send(event.clone()).is_err() {
            warn!(update_id = %event.id, "Fee recompute consumer is gone");
        }
    }
}

/// Drops every signal. For nodes without a fee-ordering consumer.
pub struct NoRecompute;

impl FeeRecompute for NoRecompute {
    fn rates_changed(&self, _event: &RatesUpdated) {}
}

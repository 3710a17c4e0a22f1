//! Background flushing for the coalescing writer

use std::sync::Arc;
use std::time::{Duration, Instant};

use interceptor_session::CoalescingWriter;
use tokio::task::JoinHandle;

/// Tick the queue so a trailing snapshot is written once its window ends.
///
/// Runs until the handle is aborted. Must be called inside a tokio runtime.
pub fn spawn_flush_loop(queue: Arc<CoalescingWriter>) -> JoinHandle<()> {
    let period = queue.window().max(Duration::from_millis(1));

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Some(outcome) = queue.flush_due(Instant::now()) {
                tracing::debug!(?outcome, "Flushed coalesced session");
            }
        }
    })
}

//! ==============================================================================
//! stream.rs - ndjson reading feed for `/stream`
//! ==============================================================================
//!
//! each connected client gets its own feed task. the task ticks a tokio
//! interval, serializes a fresh reading, and pushes one line into a bounded
//! channel. the response body drains the channel. when the client goes away
//! the body (and receiver) is dropped, the next send fails and the task ends.
//!
//! ==============================================================================

use crate::sensor;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::ReceiverStream;

/// lines that may sit unread before the feed waits on the client
const FEED_BUFFER: usize = 1;

/// start a feed that yields one json line per `period`, first line immediately
pub fn reading_feed(period: Duration) -> ReceiverStream<Result<String, Infallible>> {
    spawn_feed(period).0
}

fn spawn_feed(period: Duration) -> (ReceiverStream<Result<String, Infallible>>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(FEED_BUFFER);

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // a stalled client must not get a burst of stale readings afterwards
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let line = match serde_json::to_string(&sensor::generate_reading()) {
                Ok(mut json) => {
                    json.push('\n');
                    json
                }
                Err(e) => {
                    tracing::error!("[STREAM] failed to encode reading: {}", e);
                    break;
                }
            };

            if tx.send(Ok(line)).await.is_err() {
                tracing::debug!("[STREAM] client disconnected, stopping feed");
                break;
            }
        }
    });

    (ReceiverStream::new(rx), task)
}

// ==============================================================================
// tests
// ==============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Reading;
    use tokio::time::Instant;
    use tokio_stream::StreamExt;

    #[tokio::test(start_paused = true)]
    async fn test_feed_cadence_and_framing() {
        let mut feed = reading_feed(Duration::from_secs(5));
        let start = Instant::now();

        let mut stamps = Vec::new();
        for _ in 0..4 {
            let line = feed.next().await.unwrap().unwrap();
            stamps.push(start.elapsed());

            assert!(line.ends_with('\n'));
            assert_eq!(line.matches('\n').count(), 1, "one object per line");
            let reading: Reading = serde_json::from_str(line.trim_end()).unwrap();
            assert!((24.0..=30.0).contains(&reading.temperature));
        }

        assert_eq!(stamps[0], Duration::ZERO);
        assert_eq!(stamps[1], Duration::from_secs(5));
        assert_eq!(stamps[3], Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_line_count() {
        let mut feed = reading_feed(Duration::from_secs(5));
        let window = Duration::from_secs(32);

        let mut count = 0u64;
        let deadline = tokio::time::sleep(window);
        tokio::pin!(deadline);
        loop {
            tokio::select! {
                _ = &mut deadline => break,
                Some(_) = feed.next() => count += 1,
            }
        }

        let expected = window.as_secs() / 5;
        assert!(count.abs_diff(expected) <= 1, "got {} lines", count);
    }

    #[tokio::test(start_paused = true)]
    async fn test_feed_task_stops_when_dropped() {
        let (mut feed, task) = spawn_feed(Duration::from_secs(5));
        feed.next().await.unwrap().unwrap();
        drop(feed);

        tokio::time::timeout(Duration::from_secs(60), task)
            .await
            .expect("feed task should exit after the client is gone")
            .unwrap();
    }
}

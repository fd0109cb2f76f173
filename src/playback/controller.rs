use std::sync::Arc;

use log::info;
use tokio::{
    sync::{mpsc, Mutex},
    task::JoinHandle,
    time::{self, Duration, MissedTickBehavior},
};
use tokio_util::sync::{CancellationToken, DropGuard};
use uuid::Uuid;

use crate::trend::TrendPoint;

use super::state::{PlaybackFrame, PlaybackState, PlaybackStatus};

/// Handle to one playback run. Frames arrive on `frames`; the channel ends
/// once the series is fully revealed or the run is superseded. Dropping the
/// subscription cancels its ticker.
pub struct PlaybackSubscription {
    pub id: String,
    pub day: String,
    pub update_interval_ms: u64,
    pub frames: mpsc::UnboundedReceiver<PlaybackFrame>,
    _cancel_on_drop: DropGuard,
}

struct PlaybackShared {
    state: PlaybackState,
    cancel_token: Option<CancellationToken>,
    ticker: Option<JoinHandle<()>>,
}

/// Replays a static day series as if it were a live feed.
///
/// One run at a time: subscribing cancels the previous run's ticker before
/// the new run's first frame is queued, so a superseded ticker can never
/// emit into a newer subscription's channel.
#[derive(Clone)]
pub struct PlaybackController {
    shared: Arc<Mutex<PlaybackShared>>,
    initial_reveal: usize,
    default_interval_ms: u64,
}

impl PlaybackController {
    pub fn new(initial_reveal: usize, default_interval_ms: u64) -> Self {
        Self {
            shared: Arc::new(Mutex::new(PlaybackShared {
                state: PlaybackState::default(),
                cancel_token: None,
                ticker: None,
            })),
            initial_reveal,
            default_interval_ms,
        }
    }

    pub async fn snapshot(&self) -> PlaybackState {
        self.shared.lock().await.state.clone()
    }

    /// Stop the current run, if any. Idempotent.
    pub async fn stop(&self) {
        let mut shared = self.shared.lock().await;
        cancel_current(&mut shared);
        shared.state = PlaybackState::default();
    }

    /// Start revealing `series` for `day`, cancelling any previous run.
    ///
    /// The initial prefix is already queued as the first frame when this
    /// returns; after that, one more point is revealed per inferred
    /// interval until the series is exhausted. An empty or fully revealed
    /// series yields a single frame that is already `done`.
    pub async fn subscribe(&self, day: &str, series: Vec<TrendPoint>) -> PlaybackSubscription {
        let mut shared = self.shared.lock().await;
        cancel_current(&mut shared);

        let id = Uuid::new_v4().to_string();
        let interval_ms = super::infer_interval_ms(&series, self.default_interval_ms);
        let total = series.len();
        let initial = self.initial_reveal.min(total);
        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        let cancel_token = CancellationToken::new();

        let first = make_frame(day, &series, initial, interval_ms);
        let done = first.done;
        let _ = frame_tx.send(first);

        shared.state = PlaybackState {
            status: if done {
                PlaybackStatus::Completed
            } else {
                PlaybackStatus::Streaming
            },
            subscription_id: Some(id.clone()),
            day: Some(day.to_string()),
            revealed: initial,
            total,
            update_interval_ms: interval_ms,
        };

        if !done {
            shared.ticker = Some(spawn_ticker(
                Arc::clone(&self.shared),
                cancel_token.clone(),
                day.to_string(),
                series,
                initial,
                interval_ms,
                frame_tx,
            ));
        }
        shared.cancel_token = Some(cancel_token.clone());

        info!(
            "playback {id} started for {day}: {initial} of {total} points revealed, interval {interval_ms}ms"
        );

        PlaybackSubscription {
            id,
            day: day.to_string(),
            update_interval_ms: interval_ms,
            frames: frame_rx,
            _cancel_on_drop: cancel_token.drop_guard(),
        }
    }
}

fn cancel_current(shared: &mut PlaybackShared) {
    if let Some(token) = shared.cancel_token.take() {
        token.cancel();
    }
    if let Some(handle) = shared.ticker.take() {
        handle.abort();
    }
}

fn make_frame(
    day: &str,
    series: &[TrendPoint],
    revealed: usize,
    interval_ms: u64,
) -> PlaybackFrame {
    PlaybackFrame {
        day: day.to_string(),
        points: series[..revealed].to_vec(),
        revealed,
        total: series.len(),
        done: revealed >= series.len(),
        update_interval_minutes: interval_ms as f64 / 60_000.0,
    }
}

fn spawn_ticker(
    shared: Arc<Mutex<PlaybackShared>>,
    cancel_token: CancellationToken,
    day: String,
    series: Vec<TrendPoint>,
    initial: usize,
    interval_ms: u64,
    frame_tx: mpsc::UnboundedSender<PlaybackFrame>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = Duration::from_millis(interval_ms);
        // interval() fires its first tick immediately; the first reveal
        // belongs one full period after the initial prefix.
        let mut ticker = time::interval_at(time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut revealed = initial;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    revealed += 1;
                    let frame = make_frame(&day, &series, revealed, interval_ms);
                    let done = frame.done;
                    if frame_tx.send(frame).is_err() {
                        // Receiver gone; nobody is watching anymore.
                        break;
                    }

                    {
                        let mut guard = shared.lock().await;
                        // A newer subscription may have replaced the state
                        // while this tick was in flight.
                        if cancel_token.is_cancelled() {
                            break;
                        }
                        guard.state.revealed = revealed;
                        if done {
                            guard.state.status = PlaybackStatus::Completed;
                        }
                    }

                    if done {
                        info!("playback for {day} complete ({} points)", series.len());
                        break;
                    }
                }
                _ = cancel_token.cancelled() => {
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(count: usize, step_ms: i64) -> Vec<TrendPoint> {
        (0..count)
            .map(|i| {
                let timestamp_ms = i as i64 * step_ms;
                let minute_of_day = (timestamp_ms / 60_000) as u32 % 1440;
                TrendPoint {
                    timestamp_ms,
                    minute_of_day,
                    label: format!("{:02}:{:02}", minute_of_day / 60, minute_of_day % 60),
                    glucose: 100.0,
                }
            })
            .collect()
    }

    #[tokio::test]
    async fn empty_series_yields_a_single_done_frame() {
        let controller = PlaybackController::new(288, 300_000);
        let mut subscription = controller.subscribe("2025-11-12", Vec::new()).await;

        let frame = subscription.frames.recv().await.unwrap();
        assert!(frame.points.is_empty());
        assert_eq!(frame.revealed, 0);
        assert_eq!(frame.total, 0);
        assert!(frame.done);

        // No ticker was spawned, so the channel ends right after that frame.
        assert!(subscription.frames.recv().await.is_none());

        let state = controller.snapshot().await;
        assert_eq!(state.status, PlaybackStatus::Completed);
        assert_eq!(state.day.as_deref(), Some("2025-11-12"));
        assert_eq!(state.total, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_the_stream_and_resets_state() {
        let controller = PlaybackController::new(2, 60_000);
        let mut subscription = controller.subscribe("2025-11-12", series(10, 60_000)).await;

        let first = subscription.frames.recv().await.unwrap();
        assert_eq!(first.revealed, 2);
        assert!(!first.done);

        controller.stop().await;

        // The ticker is gone; the stream ends without ever completing.
        while let Some(frame) = subscription.frames.recv().await {
            assert!(!frame.done);
        }
        assert_eq!(controller.snapshot().await, PlaybackState::default());
    }

    #[tokio::test]
    async fn stop_without_a_run_is_idempotent() {
        let controller = PlaybackController::new(288, 300_000);
        controller.stop().await;
        controller.stop().await;
        assert_eq!(controller.snapshot().await, PlaybackState::default());
    }
}

use std::time::Duration;

use rand::Rng;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(200);
/// Upper bound (exclusive) of a single simulated increment, in percent.
pub const MAX_INCREMENT: f32 = 15.0;

/// Background task that reports simulated upload progress.
///
/// It signals liveness only, never real transfer progress. The task stops when
/// [`ProgressTicker::cancel`] is called, when the ticker is dropped, or when
/// the callback returns `false`.
#[derive(Debug)]
pub struct ProgressTicker {
    token: CancellationToken,
}

impl ProgressTicker {
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(interval: Duration, mut on_tick: F) -> Self
    where
        F: FnMut(f32) -> bool + Send + 'static,
    {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick of an interval fires immediately.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        if !on_tick(next_increment()) {
                            break;
                        }
                    }
                }
            }
        });
        Self { token }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

fn next_increment() -> f32 {
    rand::thread_rng().gen_range(0.0..MAX_INCREMENT)
}

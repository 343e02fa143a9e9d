//! Token-bucket rate limiter: a bounded channel of capacity `rps`, refilled
//! by a ticker that inserts one token per `interval = 1s/rps`. A full
//! bucket makes the refill task's send block, so excess ticks are simply
//! dropped rather than queued — this caps burst at `rps`.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub struct TokenBucket {
    // Keeps the channel open even after `stop()` aborts the refill task's
    // own sender, so `acquire()` blocks forever instead of observing a
    // closed channel.
    _tx: mpsc::Sender<()>,
    rx: tokio::sync::Mutex<mpsc::Receiver<()>>,
    stop: CancellationToken,
    refill_task: tokio::task::JoinHandle<()>,
}

impl TokenBucket {
    /// `rps` tokens/second, refilled one at a time every `1s / rps`.
    pub fn new(rps: u32) -> Self {
        Self::with_interval(rps, Duration::from_secs(1) / rps.max(1))
    }

    pub fn with_interval(capacity: u32, interval: Duration) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1) as usize);
        let stop = CancellationToken::new();

        let refill_tx = tx.clone();
        let refill_stop = stop.clone();
        let refill_task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // interval's first tick fires immediately; discard it.
            loop {
                tokio::select! {
                    _ = refill_stop.cancelled() => return,
                    _ = ticker.tick() => {
                        // A full bucket drops this tick: `try_send` never
                        // blocks the refill loop waiting for a consumer.
                        let _ = refill_tx.try_send(());
                    }
                }
            }
        });

        Self {
            _tx: tx,
            rx: tokio::sync::Mutex::new(rx),
            stop,
            refill_task,
        }
    }

    /// Blocks until a token is available.
    pub async fn acquire(&self) {
        let mut rx = self.rx.lock().await;
        // The sender half is held by both the refill task and `self.tx`,
        // so `recv` only returns `None` after `stop()` drops both.
        let _ = rx.recv().await;
    }

    /// Halts the refill task deterministically.
    pub fn stop(&self) {
        self.stop.cancel();
    }
}

impl Drop for TokenBucket {
    fn drop(&mut self) {
        self.stop();
        self.refill_task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::time::Duration;

    /// Polls `acquire()` once without driving the timer, so it can't
    /// observe a tick that hasn't been explicitly `advance`d past.
    async fn ready_now(bucket: &TokenBucket) -> bool {
        tokio::task::yield_now().await;
        bucket.acquire().now_or_never().is_some()
    }

    #[tokio::test(start_paused = true)]
    async fn acquire_blocks_until_a_tick_refills_the_bucket() {
        let bucket = TokenBucket::with_interval(1, Duration::from_millis(10));

        assert!(!ready_now(&bucket).await, "no token should be available yet");

        tokio::time::advance(Duration::from_millis(15)).await;
        assert!(ready_now(&bucket).await, "a token should be available after a tick");
    }

    #[tokio::test(start_paused = true)]
    async fn burst_is_capped_at_capacity() {
        let bucket = TokenBucket::with_interval(2, Duration::from_millis(10));
        tokio::task::yield_now().await; // let the refill task register its ticker

        // Let several ticks elapse; capacity is 2, so excess ticks are
        // dropped rather than queued.
        tokio::time::advance(Duration::from_millis(100)).await;

        let mut acquired = 0;
        while ready_now(&bucket).await {
            acquired += 1;
            if acquired > 10 {
                break;
            }
        }
        assert_eq!(acquired, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_halts_refill_so_future_acquires_never_return() {
        let bucket = TokenBucket::with_interval(1, Duration::from_millis(10));
        bucket.stop();

        tokio::time::advance(Duration::from_millis(100)).await;
        assert!(!ready_now(&bucket).await);
    }
}

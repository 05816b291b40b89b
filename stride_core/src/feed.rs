//! Background sample acquisition.
//!
//! A `SampleFeed` owns its `ImuSource` on a dedicated thread and hands
//! samples to the ingest loop over a bounded channel, recording when the
//! source last produced anything so callers can spot a stalled device.
//! Paced (`spawn`) and event-driven (`spawn_event`) variants share one
//! worker loop. Dropping the feed stops and joins the thread.
use crossbeam_channel as xch;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};
use stride_traits::clock::Clock;
use stride_traits::{ImuSource, Sample};

/// Bounded queue depth between the acquisition thread and the ingest loop.
/// Every sample matters, so this is a real queue rather than a latest-value
/// slot.
const FEED_CAPACITY: usize = 256;

/// How long a send on a full queue waits before re-checking the stop flag.
/// Bounds how long `Drop` can take when the consumer has stopped receiving.
const SEND_RETRY: Duration = Duration::from_millis(10);

pub struct SampleFeed {
    rx: xch::Receiver<Sample>,
    last_ok: Arc<AtomicU64>,
    epoch: Instant,
    /// Set once by `Drop`; the worker polls it between pulls and send
    /// retries.
    stop: Arc<AtomicBool>,
    worker: Option<std::thread::JoinHandle<()>>,
}

impl SampleFeed {
    /// Paced feed: polls the source at `hz` and sleeps between pulls.
    pub fn spawn<S: ImuSource + Send + 'static, C: Clock + Send + Sync + 'static>(
        source: S,
        hz: u32,
        timeout: Duration,
        clock: C,
    ) -> Self {
        let period = Duration::from_micros(crate::util::period_us(hz));
        Self::spawn_inner(source, Some(period), timeout, clock)
    }

    /// Event-driven feed: relies on the source's own data-ready timing and
    /// adds no extra sleeps. `next_sample(timeout)` should block until a
    /// sample is ready or the timeout expires.
    pub fn spawn_event<S: ImuSource + Send + 'static, C: Clock + Send + Sync + 'static>(
        source: S,
        timeout: Duration,
        clock: C,
    ) -> Self {
        Self::spawn_inner(source, None, timeout, clock)
    }

    fn spawn_inner<S: ImuSource + Send + 'static, C: Clock + Send + Sync + 'static>(
        mut source: S,
        period: Option<Duration>,
        timeout: Duration,
        clock: C,
    ) -> Self {
        let (tx, rx) = xch::bounded(FEED_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();
        let last_ok = Arc::new(AtomicU64::new(0));
        let last_seen = last_ok.clone();
        let epoch = clock.now();

        let worker = std::thread::spawn(move || {
            'run: while !stop_flag.load(Ordering::Relaxed) {
                match source.next_sample(timeout) {
                    Ok(Some(sample)) => {
                        let mut pending = sample;
                        // The queue may be full while the consumer catches
                        // up; wait in short slices so the stop flag stays
                        // responsive and drop never deadlocks on a blocked
                        // send.
                        loop {
                            match tx.send_timeout(pending, SEND_RETRY) {
                                Ok(()) => {
                                    last_seen.store(clock.ms_since(epoch), Ordering::Relaxed);
                                    break;
                                }
                                Err(xch::SendTimeoutError::Timeout(s)) => {
                                    if stop_flag.load(Ordering::Relaxed) {
                                        tracing::debug!(
                                            "feed stopping with a sample still in hand"
                                        );
                                        break 'run;
                                    }
                                    pending = s;
                                }
                                Err(xch::SendTimeoutError::Disconnected(_)) => {
                                    tracing::debug!("feed consumer disconnected");
                                    break 'run;
                                }
                            }
                        }
                    }
                    Ok(None) => {
                        // Channel idle or absent within the timeout; not an
                        // error, keep polling.
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "sample source error; continuing");
                    }
                }

                // Re-check before pacing so a stop is not stretched by a
                // full sample period.
                if stop_flag.load(Ordering::Relaxed) {
                    break;
                }
                if let Some(p) = period {
                    clock.sleep(p);
                }
            }
            tracing::trace!("feed worker exiting");
        });

        Self {
            rx,
            last_ok,
            epoch,
            stop,
            worker: Some(worker),
        }
    }

    /// Blocking receive with timeout; None when nothing arrived in time.
    pub fn recv_timeout(&self, d: Duration) -> Option<Sample> {
        self.rx.recv_timeout(d).ok()
    }

    /// Drain everything currently queued without blocking.
    pub fn drain(&self) -> Vec<Sample> {
        self.rx.try_iter().collect()
    }

    /// Milliseconds since the last successful pull, given a caller-supplied
    /// now (ms since this feed's epoch).
    pub fn stalled_for(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_ok.load(Ordering::Relaxed))
    }

    /// Convenience helper: compute stall using this feed's epoch and a real
    /// monotonic clock.
    pub fn stalled_for_now(&self) -> u64 {
        let now_ms = {
            let dur = Instant::now().saturating_duration_since(self.epoch);
            let ms = dur.as_millis();
            (ms.min(u128::from(u64::MAX))) as u64
        };
        now_ms.saturating_sub(self.last_ok.load(Ordering::Relaxed))
    }
}

impl Drop for SampleFeed {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);

        // The worker notices the flag between pulls, between send retries
        // on a full queue, or once the in-flight next_sample() times out.
        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.join() {
                tracing::warn!(?e, "feed worker panicked during shutdown");
            }
        }
    }
}

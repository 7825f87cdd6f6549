use std::io;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, trace};

use super::{SharedSnapshot, TelemetrySnapshot, TelemetrySource};

/// Background thread that publishes a fresh snapshot every interval.
///
/// The first publish happens one interval after start. Dropping the sampler
/// stops the thread and waits for it.
pub struct TelemetrySampler {
    stop_tx: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TelemetrySampler {
    pub fn spawn<S: TelemetrySource>(
        mut source: S,
        interval: Duration,
        shared: SharedSnapshot,
    ) -> io::Result<Self> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let handle = thread::Builder::new()
            .name("telemetry".into())
            .spawn(move || {
                debug!(?interval, "telemetry sampler started");
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            let snapshot = TelemetrySnapshot::from_reading(source.sample());
                            trace!(cpu = %snapshot.cpu, ram = %snapshot.ram, "telemetry sampled");
                            shared.publish(snapshot);
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!("telemetry sampler stopped");
            })?;

        Ok(Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }
}

impl Drop for TelemetrySampler {
    fn drop(&mut self) {
        drop(self.stop_tx.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::Reading;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    struct Counting {
        calls: Arc<AtomicUsize>,
    }

    impl TelemetrySource for Counting {
        fn sample(&mut self) -> Reading {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Reading {
                cpu_percent: n as f64,
                ram_percent: 50.0,
            }
        }
    }

    fn wait_for(deadline: Duration, mut done: impl FnMut() -> bool) -> bool {
        let started = Instant::now();
        while started.elapsed() < deadline {
            if done() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        done()
    }

    #[test]
    fn publishes_formatted_readings() {
        let calls = Arc::new(AtomicUsize::new(0));
        let shared = SharedSnapshot::new();
        let _sampler = TelemetrySampler::spawn(
            Counting {
                calls: calls.clone(),
            },
            Duration::from_millis(10),
            shared.clone(),
        )
        .unwrap();

        assert!(wait_for(Duration::from_secs(2), || shared.load().ram == "50.00%"));
        assert!(shared.load().cpu.ends_with(".00%"));
    }

    #[test]
    fn nothing_is_published_before_the_first_interval() {
        let shared = SharedSnapshot::new();
        let _sampler = TelemetrySampler::spawn(
            Counting {
                calls: Arc::new(AtomicUsize::new(0)),
            },
            Duration::from_secs(60),
            shared.clone(),
        )
        .unwrap();
        assert_eq!(*shared.load(), TelemetrySnapshot::default());
    }

    #[test]
    fn drop_stops_sampling() {
        let calls = Arc::new(AtomicUsize::new(0));
        let sampler = TelemetrySampler::spawn(
            Counting {
                calls: calls.clone(),
            },
            Duration::from_millis(5),
            SharedSnapshot::new(),
        )
        .unwrap();
        assert!(wait_for(Duration::from_secs(2), || calls.load(Ordering::SeqCst) > 0));

        drop(sampler);
        let after_drop = calls.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(calls.load(Ordering::SeqCst), after_drop);
    }
}

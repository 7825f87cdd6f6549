use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Run `call` on a helper thread and wait at most `timeout` for its result.
///
/// Returns `None` when the bound elapses (or the helper panics). A call that
/// outlives the bound keeps running detached; its result is dropped.
pub fn call_with_timeout<T, F>(timeout: Duration, call: F) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<T>();

    let spawned = thread::Builder::new()
        .name("bounded-call".into())
        .spawn(move || {
            let _ = tx.send(call());
        });

    if let Err(e) = spawned {
        tracing::warn!("could not spawn bounded call thread: {e}");
        return None;
    }

    rx.recv_timeout(timeout).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn returns_value_from_fast_call() {
        let got = call_with_timeout(Duration::from_millis(500), || 7);
        assert_eq!(got, Some(7));
    }

    #[test]
    fn gives_up_on_hung_call_within_bound() {
        let started = Instant::now();
        let got = call_with_timeout(Duration::from_millis(200), || {
            thread::sleep(Duration::from_secs(5));
            1
        });
        assert_eq!(got, None);
        assert!(started.elapsed() < Duration::from_millis(1000));
    }

    #[test]
    fn panicking_call_reads_as_timeout() {
        let got: Option<u8> = call_with_timeout(Duration::from_millis(500), || panic!("boom"));
        assert_eq!(got, None);
    }
}

//! Quiet-period debounce over a current-value text stream.
//!
//! # Invariants
//! - Only the latest text after `window` of silence reaches the callback.
//! - The value present at start is not delivered; callers load it themselves.
//! - A running callback is awaited, never cancelled; input arriving while it
//!   runs is picked up afterwards.
//! - The loop ends when every sender of the input stream is dropped.

use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;

/// Quiet period used by the pet and owner search boxes.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Calls `on_quiet` with the latest input after each quiet period.
pub async fn run_debounced<F, Fut>(
    mut input: watch::Receiver<String>,
    window: Duration,
    mut on_quiet: F,
) where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = ()>,
{
    loop {
        if input.changed().await.is_err() {
            return;
        }
        loop {
            tokio::select! {
                _ = sleep(window) => break,
                changed = input.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
            }
        }

        let text = input.borrow_and_update().clone();
        on_quiet(text).await;
    }
}

#[cfg(test)]
mod tests {
    use super::run_debounced;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::watch;
    use tokio::time::sleep;

    fn recorder() -> (
        Arc<Mutex<Vec<String>>>,
        impl FnMut(String) -> std::future::Ready<()> + Send + 'static,
    ) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback = move |text: String| {
            sink.lock().unwrap().push(text);
            std::future::ready(())
        };
        (seen, callback)
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_input_collapses_to_latest_value() {
        let (tx, rx) = watch::channel(String::new());
        let (seen, callback) = recorder();
        let task = tokio::spawn(run_debounced(rx, Duration::from_millis(300), callback));

        sleep(Duration::from_millis(350)).await;
        tx.send("r".to_string()).unwrap();
        sleep(Duration::from_millis(100)).await;
        tx.send("re".to_string()).unwrap();
        sleep(Duration::from_millis(100)).await;
        tx.send("rex".to_string()).unwrap();
        sleep(Duration::from_millis(400)).await;

        assert_eq!(*seen.lock().unwrap(), vec!["rex".to_string()]);

        drop(tx);
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_is_delivered_before_quiet_period_ends() {
        let (tx, rx) = watch::channel(String::new());
        let (seen, callback) = recorder();
        let task = tokio::spawn(run_debounced(rx, Duration::from_millis(300), callback));

        tx.send("cat".to_string()).unwrap();
        sleep(Duration::from_millis(299)).await;
        assert!(seen.lock().unwrap().is_empty());

        sleep(Duration::from_millis(2)).await;
        assert_eq!(*seen.lock().unwrap(), vec!["cat".to_string()]);

        drop(tx);
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn closing_input_stops_the_loop_during_quiet_period() {
        let (tx, rx) = watch::channel(String::new());
        let (seen, callback) = recorder();
        let task = tokio::spawn(run_debounced(rx, Duration::from_millis(300), callback));

        tx.send("bird".to_string()).unwrap();
        drop(tx);
        task.await.unwrap();
        assert!(seen.lock().unwrap().is_empty());
    }
}

use std::time::Duration;

use tokio::sync::watch;

/// Delays changes of `input` until it has been quiet for `delay`.
///
/// The returned receiver starts with the current input value. Each input
/// change restarts the timer; only when `delay` elapses without a further
/// change does the output take the latest input. Superseded timers are
/// dropped and never fire, and a value equal to the current output is not
/// re-emitted.
///
/// The work runs in one task that ends when the input sender is dropped
/// (flushing a pending value first) or when every output receiver is gone.
pub fn debounce<T>(mut input: watch::Receiver<T>, delay: Duration) -> watch::Receiver<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    let (output, receiver) = watch::channel(input.borrow_and_update().clone());

    tokio::spawn(async move {
        loop {
            tokio::select! {
                changed = input.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                () = output.closed() => break,
            }

            let mut open = true;
            loop {
                tokio::select! {
                    changed = input.changed() => {
                        if changed.is_err() {
                            open = false;
                            break;
                        }
                    }
                    () = tokio::time::sleep(delay) => break,
                }
            }

            let latest = input.borrow_and_update().clone();
            output.send_if_modified(|current| {
                if *current == latest {
                    return false;
                }
                *current = latest;
                true
            });

            if !open {
                break;
            }
        }
    });

    receiver
}

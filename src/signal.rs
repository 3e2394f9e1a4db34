use core::{
    cell::RefCell,
    future::Future,
    pin::Pin,
    task::{Context, Poll, Waker},
};

use critical_section::Mutex;

struct SignalInner {
    raised: bool,
    waker: Option<Waker>,
}

/// A binary semaphore that a single task can wait on.
///
/// Raising is non-blocking and may happen from interrupt context.
/// Raising an already raised signal has no further effect, so
/// multiple raises before the next wait collapse into one.
pub(crate) struct Signal {
    inner: Mutex<RefCell<SignalInner>>,
}

impl Signal {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(SignalInner {
                raised: false,
                waker: None,
            })),
        }
    }

    pub fn raise(&self) {
        let waker = critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            inner.raised = true;
            inner.waker.take()
        });

        if let Some(waker) = waker {
            waker.wake();
        }
    }

    pub fn clear(&self) {
        critical_section::with(|cs| {
            self.inner.borrow_ref_mut(cs).raised = false;
        });
    }

    /// Waits until the signal is raised, and lowers it again.
    pub fn wait(&self) -> Raised<'_> {
        Raised(self)
    }
}

pub(crate) struct Raised<'a>(&'a Signal);

impl Future for Raised<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        critical_section::with(|cs| {
            let mut inner = self.0.inner.borrow_ref_mut(cs);
            if inner.raised {
                inner.raised = false;
                return Poll::Ready(());
            }

            let new_waker = cx.waker();

            // From embassy
            // https://github.com/embassy-rs/embassy/blob/b99533607ceed225dd12ae73aaa9a0d969a7365e/embassy-sync/src/waitqueue/waker.rs#L59-L61
            match &inner.waker {
                // Optimization: If both the old and new Wakers wake the same task, we can simply
                // keep the old waker, skipping the clone.
                Some(w2) if w2.will_wake(new_waker) => {}
                _ => {
                    // Only one task waits on a signal; a replaced waker belongs to a
                    // dropped wait and gets woken so it can notice.
                    if let Some(old_waker) = inner.waker.replace(new_waker.clone()) {
                        old_waker.wake();
                    }
                }
            }

            Poll::Pending
        })
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    use futures::{executor::block_on, FutureExt};

    #[test]
    fn raised_before_wait() {
        let signal = Signal::new();
        signal.raise();
        block_on(signal.wait());
        assert!(signal.wait().now_or_never().is_none());
    }

    #[test]
    fn raises_collapse() {
        let signal = Signal::new();
        signal.raise();
        signal.raise();
        signal.raise();
        assert!(signal.wait().now_or_never().is_some());
        assert!(signal.wait().now_or_never().is_none());
    }

    #[test]
    fn clear_lowers() {
        let signal = Signal::new();
        signal.raise();
        signal.clear();
        assert!(signal.wait().now_or_never().is_none());
    }

    #[test]
    fn wakes_waiting_thread() {
        let signal = std::sync::Arc::new(Signal::new());
        let raiser = {
            let signal = signal.clone();
            std::thread::spawn(move || {
                std::thread::sleep(std::time::Duration::from_millis(20));
                signal.raise();
            })
        };
        block_on(signal.wait());
        raiser.join().unwrap();
    }
}

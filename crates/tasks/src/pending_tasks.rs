use std::{
    future::Future,
    pin::Pin,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    task::{Context, Poll},
};

use futures_util::task::AtomicWaker;

/// Counts tasks holding a [`ShutdownGuard`](crate::ShutdownGuard) and lets the
/// manager await the count reaching zero.
#[derive(Debug, Default)]
pub(crate) struct PendingTasks {
    counter: AtomicUsize,
    waker: AtomicWaker,
}

impl PendingTasks {
    pub(crate) fn current(&self) -> usize {
        self.counter.load(Ordering::SeqCst)
    }

    pub(crate) fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn decrement(&self) {
        let prev = self.counter.fetch_sub(1, Ordering::SeqCst);
        if prev == 1 {
            self.waker.wake();
        }
    }

    pub(crate) fn wait_for_zero(self: Arc<Self>) -> WaitForZero {
        WaitForZero {
            pending_tasks: self,
        }
    }
}

pub(crate) struct WaitForZero {
    pending_tasks: Arc<PendingTasks>,
}

impl Future for WaitForZero {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.pending_tasks.current() == 0 {
            return Poll::Ready(());
        }

        self.pending_tasks.waker.register(cx.waker());

        // counter may have hit zero between the check and the registration
        if self.pending_tasks.current() == 0 {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_wait_for_zero_wakes_on_last_decrement() {
        let pending = Arc::new(PendingTasks::default());
        pending.increment();
        pending.increment();

        let p = pending.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            p.decrement();
            p.decrement();
        });

        tokio::time::timeout(Duration::from_secs(5), pending.clone().wait_for_zero())
            .await
            .expect("should reach zero");
        assert_eq!(pending.current(), 0);
    }
}

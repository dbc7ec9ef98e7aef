//! The countdown timers of the chipset and the worker used by hosts to
//! schedule the chipset.
use {
    num_traits::{PrimInt, Unsigned},
    std::{
        sync::{
            mpsc::{self, RecvTimeoutError, SyncSender},
            Arc,
        },
        thread::{self, JoinHandle},
        time::{Duration, Instant},
    },
};

#[cfg_attr(test, mockall::automock)]
/// Is called by a [`Timer`](Timer) once a tick has counted it down to zero.
pub trait TimerCallback {
    fn handle(&mut self);
}

/// A callback that does nothing, used by the delay timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCallback;

impl TimerCallback for NoCallback {
    fn handle(&mut self) {}
}

/// Latches a beep request until the host reads it.
#[derive(Debug, Default, Clone, Copy)]
pub struct BeepLatch {
    requested: bool,
}

impl BeepLatch {
    /// Returns if a beep was requested and clears the request.
    pub fn take(&mut self) -> bool {
        std::mem::replace(&mut self.requested, false)
    }

    pub fn is_requested(&self) -> bool {
        self.requested
    }
}

impl TimerCallback for BeepLatch {
    fn handle(&mut self) {
        self.requested = true;
    }
}

/// Represents a timer inside of the chip infrastruture, it counts down to
/// zero by one every time it is ticked. The owner of the timer decides the
/// cadence, which is `60Hz` on real hardware.
#[derive(Debug, Clone)]
pub struct Timer<T, C = NoCallback> {
    /// will store the value of the timer
    value: T,
    callback: C,
}

impl<T, C> Timer<T, C>
where
    T: PrimInt + Unsigned,
    C: TimerCallback,
{
    /// Will create a new timer with the given value.
    pub fn new(value: T) -> Self
    where
        C: Default,
    {
        Self::with_callback(value, C::default())
    }

    /// Will create a new timer that runs the callback, when reaching zero.
    pub fn with_callback(value: T, callback: C) -> Self {
        Self { value, callback }
    }

    /// Will set the value from which the timer shall count down from.
    /// Setting the value never runs the callback.
    pub fn set_value(&mut self, value: T) {
        self.value = value;
    }

    /// Will get the value that the counter is currently at.
    pub fn get_value(&self) -> T {
        self.value
    }

    /// Decrements the timer, saturating at zero. Returns `true` if this
    /// tick moved the timer to zero.
    pub fn tick(&mut self) -> bool {
        if self.value.is_zero() {
            return false;
        }

        self.value = self.value - T::one();

        let reached = self.value.is_zero();
        if reached {
            self.callback.handle();
        }
        reached
    }

    pub fn callback(&self) -> &C {
        &self.callback
    }

    pub fn callback_mut(&mut self) -> &mut C {
        &mut self.callback
    }
}

/// Runs a callback on a fixed interval until it is stopped.
pub trait TimedWorker {
    fn new() -> Self;
    /// The worker stops on its own, once the callback returns `false`.
    fn start<T>(&mut self, callback: T, interval: Duration)
    where
        T: Send + FnMut() -> bool + 'static;
    fn stop(&mut self);
    fn is_alive(&self) -> bool;
}

/// Is the internal worker, that exists on the
/// second thread.
pub struct Worker {
    /// Contains the actuall thread, that is running.
    thread: Option<JoinHandle<()>>,
    /// Contains the sync sender used to gracefull shutdown the thread.
    shutdown: Option<SyncSender<()>>,
    /// Counts the threads holding a reference, so that liveness can be
    /// checked without joining.
    alive: Arc<()>,
}

impl TimedWorker for Worker {
    /// Will initialize the new worker.
    fn new() -> Self {
        Self {
            thread: None,
            shutdown: None,
            alive: Arc::new(()),
        }
    }

    /// Will start the worker that will run the callback function
    /// every interval.
    /// Attention the timer assumes the callback will finish
    /// calculation faster then the interval.
    fn start<T>(&mut self, mut callback: T, interval: Duration)
    where
        T: Send + FnMut() -> bool + 'static,
    {
        // a running worker is replaced
        self.stop();

        let (send, recv) = mpsc::sync_channel::<()>(1);
        let alive = self.alive.clone();
        let thread = thread::spawn(move || {
            let _alive = alive;
            let mut timeout = interval;
            loop {
                match recv.recv_timeout(timeout) {
                    Err(RecvTimeoutError::Timeout) => {
                        let start = Instant::now();

                        if !callback() {
                            break;
                        }

                        // make sure there the system will at most wait the interval
                        timeout = interval.checked_sub(start.elapsed()).unwrap_or_default();
                    }
                    Ok(_) | Err(_) => break, // shutdown
                }
            }
        });

        self.thread = Some(thread);
        self.shutdown = Some(send);
    }

    /// Will stop the worker.
    fn stop(&mut self) {
        if let Some(sender) = self.shutdown.take() {
            // the thread may already have left the loop on its own
            let _ = sender.try_send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("The worker thread panicked.");
            }
        }
    }

    /// Checks if the thread is alive.
    fn is_alive(&self) -> bool {
        Arc::strong_count(&self.alive) > 1
    }
}

impl Drop for Worker {
    /// Will drop the worker
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_timer_saturates() {
        let mut timer: Timer<u8> = Timer::new(200);
        for _ in 0..300 {
            timer.tick();
        }
        assert_eq!(timer.get_value(), 0);
    }

    #[test]
    fn test_callback_on_reaching_zero() {
        let mut callback = MockTimerCallback::new();
        callback.expect_handle().times(1).return_const(());

        let mut timer = Timer::with_callback(3u8, callback);
        assert!(!timer.tick());
        assert!(!timer.tick());
        assert!(timer.tick());
        // staying at zero does not call again
        assert!(!timer.tick());
        assert_eq!(timer.get_value(), 0);
    }

    #[test]
    fn test_set_zero_does_not_call() {
        let mut callback = MockTimerCallback::new();
        callback.expect_handle().times(0);

        let mut timer = Timer::with_callback(10u8, callback);
        timer.set_value(0);
        assert!(!timer.tick());
    }

    #[test]
    fn test_beep_latch() {
        let mut timer: Timer<u8, BeepLatch> = Timer::new(1);
        assert!(!timer.callback().is_requested());
        timer.tick();
        assert!(timer.callback_mut().take());
        assert!(!timer.callback_mut().take());
    }

    #[test]
    fn test_worker() {
        let counter = Arc::new(AtomicUsize::new(0));
        let ccounter = counter.clone();

        let mut worker = Worker::new();
        worker.start(
            move || {
                ccounter.fetch_add(1, Ordering::SeqCst);
                true
            },
            Duration::from_millis(1),
        );
        assert!(worker.is_alive());

        std::thread::sleep(Duration::from_millis(100));
        worker.stop();
        assert!(!worker.is_alive());
        assert!(counter.load(Ordering::SeqCst) > 0);
    }

    #[test]
    fn test_worker_stops_itself() {
        let mut worker = Worker::new();
        worker.start(|| false, Duration::from_millis(1));

        std::thread::sleep(Duration::from_millis(100));
        assert!(!worker.is_alive());
        worker.stop();
    }
}

use std::thread;
use std::time::Duration;

/// Delay strategy used for erase countdowns, fragment pacing and frame timing.
///
/// None of these delays carry protocol meaning, so callers can swap in
/// `NoPacing` (or a recorder in tests) without changing what goes on the wire.
pub trait Pacer {
    fn pause(&mut self, duration: Duration);
}

/// Blocks the current thread for the requested duration
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleep;

impl Pacer for ThreadSleep {
    fn pause(&mut self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}

/// Returns immediately
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPacing;

impl Pacer for NoPacing {
    fn pause(&mut self, _duration: Duration) {}
}

impl<P: Pacer + ?Sized> Pacer for &mut P {
    fn pause(&mut self, duration: Duration) {
        (**self).pause(duration);
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingPacer {
    pub pauses: Vec<Duration>,
}

#[cfg(test)]
impl Pacer for RecordingPacer {
    fn pause(&mut self, duration: Duration) {
        self.pauses.push(duration);
    }
}

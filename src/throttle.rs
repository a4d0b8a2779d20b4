use std::time::Duration;

/// Pacing gate between external requests.
///
/// The updater pauses after each unsuccessful lookup and after every record
/// to stay inside the metadata service's rate limits. Tests substitute
/// [`NoDelay`] to run the full pipeline without sleeping.
pub trait Throttle {
    fn pause(&self);
}

/// Sleeps for a fixed interval on every pause.
pub struct FixedDelay {
    interval: Duration,
}

impl FixedDelay {
    pub fn new(interval: Duration) -> Self {
        FixedDelay { interval }
    }
}

impl Throttle for FixedDelay {
    fn pause(&self) {
        std::thread::sleep(self.interval);
    }
}

/// No-op gate for tests.
#[cfg(test)]
pub struct NoDelay;

#[cfg(test)]
impl Throttle for NoDelay {
    fn pause(&self) {}
}

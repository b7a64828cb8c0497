//! Wall and user CPU clocks.

use std::cell::Cell;
use std::io;
use std::time::Instant;

use tracing::warn;

use fftbench_core::{Clock, TimingMode};

/// Monotonic wall-clock time.
#[derive(Debug, Clone, Copy)]
pub struct WallClock {
    origin: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for WallClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// User CPU time of the whole process, summed over all threads.
///
/// Falls back to wall time on platforms without `getrusage`, and for good
/// once a `getrusage` call fails.
#[derive(Debug, Default)]
pub struct UserClock {
    fallback: WallClock,
    degraded: Cell<bool>,
}

impl UserClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether readings now come from the wall clock.
    pub fn is_degraded(&self) -> bool {
        self.degraded.get()
    }

    fn reading(&self, user: io::Result<f64>) -> f64 {
        if self.degraded.get() {
            return self.fallback.now();
        }
        match user {
            Ok(seconds) => seconds,
            Err(e) => {
                warn!(
                    event = "user_clock_failed",
                    message = "user CPU time unavailable, timing with the wall clock",
                    error = %e,
                );
                self.degraded.set(true);
                self.fallback.now()
            }
        }
    }
}

impl Clock for UserClock {
    fn now(&self) -> f64 {
        if self.degraded.get() {
            return self.fallback.now();
        }
        self.reading(user_seconds())
    }
}

#[cfg(unix)]
fn user_seconds() -> io::Result<f64> {
    // SAFETY: rusage is plain old data; all-zero bytes are a valid value.
    let mut usage: libc::rusage = unsafe { std::mem::zeroed() };
    // SAFETY: getrusage only writes into the struct we own.
    let ret = unsafe { libc::getrusage(libc::RUSAGE_SELF, &mut usage) };
    if ret != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(usage.ru_utime.tv_sec as f64 + usage.ru_utime.tv_usec as f64 / 1_000_000.0)
}

#[cfg(not(unix))]
fn user_seconds() -> io::Result<f64> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "getrusage is not available on this platform",
    ))
}

/// Clock for a timing mode.
pub fn clock_for(mode: TimingMode) -> Box<dyn Clock> {
    match mode {
        TimingMode::Wall => Box::new(WallClock::new()),
        TimingMode::User => Box::new(UserClock::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wall_clock_advances() {
        let clock = WallClock::new();
        let start = clock.now();
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(clock.elapsed_since(start) >= 0.004);
    }

    #[test]
    fn test_user_clock_counts_work() {
        let clock = UserClock::new();
        let start = clock.now();
        let mut acc = 0u64;
        let begin = Instant::now();
        while begin.elapsed().as_millis() < 50 {
            acc = acc.wrapping_mul(6364136223846793005).wrapping_add(1);
        }
        assert_ne!(acc, 1);
        assert!(clock.elapsed_since(start) >= 0.0);
        assert!(clock.now() >= start);
    }

    #[test]
    fn test_user_clock_falls_back_to_wall_time() {
        let clock = UserClock::new();
        assert!(!clock.is_degraded());
        let failed = clock.reading(Err(io::Error::other("getrusage failed")));
        assert!(clock.is_degraded());
        assert!(failed >= 0.0);

        // Later readings stay on the wall clock even if user time returns.
        std::thread::sleep(std::time::Duration::from_millis(5));
        let later = clock.reading(Ok(1.0e6));
        assert!(later >= failed + 0.004);
        assert!(later < 1.0e6);
    }

    #[test]
    fn test_clock_for_mode() {
        let clock = clock_for(TimingMode::Wall);
        let start = clock.now();
        assert!(clock.elapsed_since(start) >= 0.0);
    }
}

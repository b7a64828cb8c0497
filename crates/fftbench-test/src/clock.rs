//! Deterministic time sources.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io;

use fftbench_core::{Clock, Pause};

/// Clock whose consecutive start/stop reading pairs are `elapsed[i]` apart.
///
/// Readings alternate between "start" and "stop". Once the script runs out
/// every pair is `fallback` seconds apart.
///
/// # Example
///
/// ```
/// use fftbench_core::Clock;
/// use fftbench_test::ScriptedClock;
///
/// let clock = ScriptedClock::new(vec![5.0, 3.0]);
/// let start = clock.now();
/// assert_eq!(clock.elapsed_since(start), 5.0);
/// let start = clock.now();
/// assert_eq!(clock.elapsed_since(start), 3.0);
/// ```
#[derive(Debug)]
pub struct ScriptedClock {
    elapsed: RefCell<VecDeque<f64>>,
    fallback: f64,
    current: Cell<f64>,
    readings: Cell<usize>,
}

impl ScriptedClock {
    pub fn new(elapsed: Vec<f64>) -> Self {
        Self {
            elapsed: RefCell::new(elapsed.into()),
            fallback: 1.0,
            current: Cell::new(0.0),
            readings: Cell::new(0),
        }
    }

    /// Every pair is `seconds` apart.
    pub fn constant(seconds: f64) -> Self {
        Self {
            fallback: seconds,
            ..Self::new(Vec::new())
        }
    }

    /// Number of readings taken.
    pub fn readings(&self) -> usize {
        self.readings.get()
    }
}

impl Clock for ScriptedClock {
    fn now(&self) -> f64 {
        let n = self.readings.get();
        self.readings.set(n + 1);
        if n % 2 == 1 {
            let step = self
                .elapsed
                .borrow_mut()
                .pop_front()
                .unwrap_or(self.fallback);
            self.current.set(self.current.get() + step);
        }
        self.current.get()
    }
}

/// Pause that returns immediately and counts how often it was reached.
#[derive(Debug, Default)]
pub struct CountingPause {
    pub count: usize,
}

impl Pause for CountingPause {
    fn pause(&mut self) -> io::Result<()> {
        self.count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_then_fallback() {
        let clock = ScriptedClock::new(vec![2.0]);
        let start = clock.now();
        assert_eq!(clock.elapsed_since(start), 2.0);
        let start = clock.now();
        assert_eq!(clock.elapsed_since(start), 1.0);
        assert_eq!(clock.readings(), 4);
    }

    #[test]
    fn test_constant() {
        let clock = ScriptedClock::constant(0.25);
        for _ in 0..3 {
            let start = clock.now();
            assert_eq!(clock.elapsed_since(start), 0.25);
        }
    }
}

//! Time sources and the between-repetition pause hook.

use std::io;

/// A source of seconds. Only differences between two readings matter.
pub trait Clock {
    /// Current reading in seconds.
    fn now(&self) -> f64;

    /// Seconds elapsed since `start`, a previous reading of this clock.
    fn elapsed_since(&self, start: f64) -> f64 {
        self.now() - start
    }
}

/// Called after each repetition, outside the timed window.
pub trait Pause {
    fn pause(&mut self) -> io::Result<()>;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> f64 {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&self) -> f64 {
        (**self).now()
    }
}

impl<P: Pause + ?Sized> Pause for Box<P> {
    fn pause(&mut self) -> io::Result<()> {
        (**self).pause()
    }
}

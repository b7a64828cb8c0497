//! Sweep driver.
//!
//! Walks the size sweep, runs the repetitions of every size through a
//! [`RunExecutor`] and writes the results table as lines are produced.

use std::io::Write;
use std::marker::PhantomData;
use std::time::Instant;

use tracing::{info, warn};

use fftbench_core::{
    complex_equivalent, repetitions_for, BenchError, Clock, Pause, Result, Scalar, SizeSweep,
    TestConfiguration, TimingAccumulator,
};
use fftbench_engine::TransformEngine;

use crate::executor::RunExecutor;
use crate::report;
use crate::result::SweepResult;
use crate::wisdom::WisdomStore;

/// Runs one benchmark sweep against one engine.
///
/// The engine, clock, pause hook and output sink are injected so a sweep
/// can run against recording doubles.
///
/// # Example
///
/// ```
/// use fftbench_benchmark::{Harness, NoPause, WallClock};
/// use fftbench_core::{Precision, TestConfiguration};
/// use fftbench_engine::RustFftEngine;
///
/// let config = TestConfiguration::new()
///     .with_precision(Precision::Double)
///     .with_size_bounds(4, 8)
///     .with_loops(1);
/// let engine = RustFftEngine::<f64>::new().unwrap();
/// let mut harness = Harness::new(config, engine, WallClock::new(), NoPause, Vec::new());
///
/// let result = harness.run().unwrap();
/// assert_eq!(result.sizes, 3);
/// let table = String::from_utf8(harness.out().clone()).unwrap();
/// assert!(table.contains("2^3"));
/// ```
pub struct Harness<T, E, C, P, W> {
    config: TestConfiguration,
    engine: E,
    clock: C,
    pause: P,
    out: W,
    wisdom: Option<WisdomStore>,
    _marker: PhantomData<fn(T)>,
}

impl<T, E, C, P, W> Harness<T, E, C, P, W>
where
    T: Scalar,
    E: TransformEngine<T>,
    C: Clock,
    P: Pause,
    W: Write,
{
    pub fn new(config: TestConfiguration, engine: E, clock: C, pause: P, out: W) -> Self {
        Self {
            config,
            engine,
            clock,
            pause,
            out,
            wisdom: None,
            _marker: PhantomData,
        }
    }

    /// Persists engine wisdom in `store` between sweeps.
    pub fn with_wisdom_store(mut self, store: Option<WisdomStore>) -> Self {
        self.wisdom = store;
        self
    }

    pub fn config(&self) -> &TestConfiguration {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn pause(&self) -> &P {
        &self.pause
    }

    pub fn out(&self) -> &W {
        &self.out
    }

    /// Runs the whole sweep.
    ///
    /// Nothing is written and no engine call is made when the
    /// configuration is invalid. Any later error aborts the sweep; lines
    /// already written stay in the output.
    pub fn run(&mut self) -> Result<SweepResult> {
        self.config.validate()?;
        if self.config.precision() != T::PRECISION {
            return Err(BenchError::config(format!(
                "{} precision requested from a {} precision engine",
                self.config.precision(),
                T::PRECISION
            )));
        }
        let sweep = SizeSweep::for_config(&self.config)?;
        let started = Instant::now();

        self.engine.configure_threads(self.config.threads().resolve())?;
        let threads = self.engine.threads();
        self.load_wisdom();

        info!(
            event = "sweep_start",
            domain = self.config.domain().description(),
            precision = %T::PRECISION,
            engine = self.engine.name(),
            threads = threads as u64,
            min_size = self.config.min_size() as u64,
            max_size = self.config.max_size() as u64,
            loops = self.config.loops() as u64,
        );

        let mut result = SweepResult::new(&self.config, self.engine.name(), threads);
        write!(self.out, "{}", report::banner(&result))?;
        writeln!(self.out)?;
        write!(self.out, "{}", report::table_header(self.config.timing()))?;

        let mut executor = RunExecutor::new(self.config.seed());
        for shape in sweep {
            let repetitions = repetitions_for(complex_equivalent(
                self.config.domain(),
                shape.total_elements(),
            ));
            info!(
                event = "size_start",
                rows = shape.rows() as u64,
                cols = shape.cols() as u64,
                repetitions = repetitions as u64,
            );

            let mut accumulator = TimingAccumulator::new(repetitions, self.config.report_mode());
            while !accumulator.is_complete() {
                let line = executor.run_once(
                    &self.config,
                    &self.engine,
                    &self.clock,
                    shape,
                    &mut accumulator,
                )?;
                if let Some(line) = line {
                    writeln!(self.out, "{}", report::table_row(&line))?;
                    self.out.flush()?;
                    result.add_line(line);
                }
                if self.config.pause() {
                    self.pause.pause()?;
                }
            }
            result.sizes += 1;
        }

        self.save_wisdom();
        info!(
            event = "sweep_end",
            sizes = result.sizes as u64,
            lines = result.line_count() as u64,
            duration_ms = started.elapsed().as_millis() as u64,
        );
        Ok(result)
    }

    // Wisdom problems never fail a sweep; the engine just plans from scratch.
    fn load_wisdom(&mut self) {
        if !self.config.effort().uses_wisdom() {
            return;
        }
        let Some(store) = &self.wisdom else {
            return;
        };
        let name = self.engine.name();
        let path = store.path_for(name, T::PRECISION);
        match store.load(name, T::PRECISION) {
            Ok(Some(text)) => match self.engine.import_wisdom(&text) {
                Ok(()) => info!(
                    event = "wisdom_loaded",
                    path = %path.display(),
                    bytes = text.len() as u64,
                ),
                Err(e) => warn!(
                    event = "wisdom_load_failed",
                    path = %path.display(),
                    error = %e,
                ),
            },
            Ok(None) => {}
            Err(e) => warn!(
                event = "wisdom_load_failed",
                path = %path.display(),
                error = %e,
            ),
        }
    }

    fn save_wisdom(&self) {
        if !self.config.effort().uses_wisdom() {
            return;
        }
        let Some(store) = &self.wisdom else {
            return;
        };
        let name = self.engine.name();
        let saved = self.engine.export_wisdom().and_then(|text| {
            let path = store.save(name, T::PRECISION, &text)?;
            Ok((path, text.len()))
        });
        match saved {
            Ok((path, bytes)) => info!(
                event = "wisdom_saved",
                path = %path.display(),
                bytes = bytes as u64,
            ),
            Err(e) => warn!(
                event = "wisdom_save_failed",
                path = %store.path_for(name, T::PRECISION).display(),
                error = %e,
            ),
        }
    }
}

//! Run executor: one timed repetition of one size.
//!
//! Every repetition allocates fresh buffers and builds fresh plans, then
//! releases both before returning, on success and on every error path.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use fftbench_core::{
    BufferLayout, Clock, Result, Scalar, Shape, TestConfiguration, ThroughputModel,
    TimingAccumulator, TransformBuffers,
};
use fftbench_engine::{PlanGuard, PlanRequest, TransformEngine};

use crate::result::TimingLine;

/// Runs single repetitions and produces report lines.
#[derive(Debug, Clone)]
pub struct RunExecutor {
    rng: ChaCha8Rng,
}

impl RunExecutor {
    /// Executor whose random signals come from `seed`, or from the OS when
    /// no seed is given.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        };
        Self { rng }
    }

    /// Runs one repetition of `shape` and feeds its elapsed time to
    /// `accumulator`.
    ///
    /// Returns the line to report, if the accumulator releases one.
    ///
    /// # Errors
    ///
    /// Allocation and plan construction failures, and any engine error
    /// during the timed loops. Resources acquired so far are released
    /// before the error is returned.
    pub fn run_once<T, E, C>(
        &mut self,
        config: &TestConfiguration,
        engine: &E,
        clock: &C,
        shape: Shape,
        accumulator: &mut TimingAccumulator,
    ) -> Result<Option<TimingLine>>
    where
        T: Scalar,
        E: TransformEngine<T> + ?Sized,
        C: Clock + ?Sized,
    {
        let layout = BufferLayout::plan(config.domain(), config.placement(), T::PRECISION, shape)?;
        debug!(
            event = "setup_buffers",
            rows = shape.rows() as u64,
            cols = shape.cols() as u64,
            bytes = layout.allocated_bytes() as u64,
            aliased = layout.output_aliases_input(),
        );
        let mut buffers = TransformBuffers::<T>::allocate(&layout)?;

        let request = PlanRequest::for_config(config, shape);
        let forward = PlanGuard::forward(engine, &request, &mut buffers)?;
        let inverse = PlanGuard::inverse(engine, &request, &mut buffers)?;
        debug!(
            event = "setup_plan",
            rows = shape.rows() as u64,
            cols = shape.cols() as u64,
            effort = %config.effort(),
        );

        // Plan construction may have overwritten the buffers.
        self.fill_signal(&mut buffers);

        let round_trip = !config.direction().is_forward_only();
        let factor = T::from_f64_lossy(1.0 / shape.total_elements() as f64);
        let scale_len = layout.scale_len();

        let start = clock.now();
        for _ in 0..config.loops() {
            forward.execute(&mut buffers)?;
            if round_trip {
                inverse.execute(&mut buffers)?;
                engine.scale(buffers.time_domain_mut(), factor, scale_len);
            }
        }
        let elapsed = clock.elapsed_since(start);

        let ops = ThroughputModel::estimated_ops(
            shape,
            config.domain(),
            config.loops(),
            config.direction(),
        );
        debug!(
            event = "repetition",
            rows = shape.rows() as u64,
            cols = shape.cols() as u64,
            repetition = (accumulator.repetition() + 1) as u64,
            repetitions = accumulator.total() as u64,
            elapsed = elapsed,
            rate = ThroughputModel::rate(ops, elapsed),
        );

        let line = accumulator.record(elapsed).map(|reported| TimingLine {
            shape,
            repetition: accumulator.repetition(),
            elapsed: reported,
            rate: ThroughputModel::rate(ops, reported),
        });
        Ok(line)
    }

    /// Fills the leading `signal_len` time-domain scalars with uniform
    /// noise in `[-1, 1)`.
    fn fill_signal<T: Scalar>(&mut self, buffers: &mut TransformBuffers<T>) {
        let len = buffers.layout().signal_len();
        for x in &mut buffers.time_domain_mut()[..len] {
            *x = T::from_f64_lossy(self.rng.random_range(-1.0..1.0));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fftbench_core::{
        BenchError, Direction, Placement, ReportMode, SignalDomain, TestConfiguration,
    };
    use fftbench_test::{MockEngine, ScriptedClock};

    fn config() -> TestConfiguration {
        TestConfiguration::new().with_loops(3).with_seed(7)
    }

    #[test]
    fn test_round_trip_executes_and_scales() {
        let engine = MockEngine::<f64>::new();
        let clock = ScriptedClock::new(vec![2.0]);
        let mut executor = RunExecutor::new(Some(1));
        let mut acc = TimingAccumulator::new(1, ReportMode::BestOnly);
        let shape = Shape::new(16, 32).unwrap();

        let line = executor
            .run_once(&config(), &engine, &clock, shape, &mut acc)
            .unwrap()
            .unwrap();

        assert_eq!(engine.executions(), 6);
        // Real in-place scaling covers the padded rows.
        assert_eq!(engine.scaled(), vec![16 * 34; 3]);
        assert_eq!(engine.plans_created(), 2);
        assert_eq!(engine.live_plans(), 0);
        assert_eq!(line.elapsed, 2.0);
        assert_eq!(line.repetition, 1);
        let ops = 512.0 * 9.0 * 6.0 * 2.5;
        assert!((line.rate - ops / 2.0 / 1e9).abs() < 1e-15);
    }

    #[test]
    fn test_forward_only_skips_inverse_and_scale() {
        let engine = MockEngine::<f64>::new();
        let clock = ScriptedClock::constant(1.0);
        let mut executor = RunExecutor::new(Some(1));
        let mut acc = TimingAccumulator::new(1, ReportMode::BestOnly);
        let config = config().with_direction(Direction::ForwardOnly);

        executor
            .run_once(&config, &engine, &clock, Shape::square(8).unwrap(), &mut acc)
            .unwrap();

        assert_eq!(engine.executions(), 3);
        assert!(engine.scaled().is_empty());
    }

    #[test]
    fn test_complex_scale_len() {
        let engine = MockEngine::<f32>::new();
        let clock = ScriptedClock::constant(1.0);
        let mut executor = RunExecutor::new(None);
        let mut acc = TimingAccumulator::new(1, ReportMode::ShowAll);
        let config = config()
            .with_domain(SignalDomain::Complex)
            .with_placement(Placement::OutOfPlace)
            .with_loops(1);

        executor
            .run_once(&config, &engine, &clock, Shape::new(4, 8).unwrap(), &mut acc)
            .unwrap();

        assert_eq!(engine.scaled(), vec![2 * 4 * 8]);
        assert_eq!(engine.layouts()[0].precision(), fftbench_core::Precision::Single);
    }

    #[test]
    fn test_inverse_failure_releases_forward_plan() {
        let engine = MockEngine::<f64>::new().failing_inverse();
        let clock = ScriptedClock::constant(1.0);
        let mut executor = RunExecutor::new(Some(1));
        let mut acc = TimingAccumulator::new(1, ReportMode::BestOnly);

        let result = executor.run_once(&config(), &engine, &clock, Shape::square(8).unwrap(), &mut acc);

        assert!(matches!(result, Err(BenchError::PlanConstruction(_))));
        assert_eq!(engine.plans_created(), 1);
        assert_eq!(engine.live_plans(), 0);
        assert_eq!(engine.executions(), 0);
        assert_eq!(clock.readings(), 0);
        assert_eq!(acc.repetition(), 0);
    }

    #[test]
    fn test_forward_failure_builds_nothing() {
        let engine = MockEngine::<f64>::new().failing_forward();
        let clock = ScriptedClock::constant(1.0);
        let mut executor = RunExecutor::new(Some(1));
        let mut acc = TimingAccumulator::new(1, ReportMode::BestOnly);

        let result = executor.run_once(&config(), &engine, &clock, Shape::square(8).unwrap(), &mut acc);

        assert!(matches!(result, Err(BenchError::PlanConstruction(_))));
        assert_eq!(engine.plans_created(), 0);
        assert!(engine.plans_destroyed().is_empty());
        assert_eq!(clock.readings(), 0);
    }

    #[test]
    fn test_seeded_signal_is_reproducible() {
        let mut a = RunExecutor::new(Some(99));
        let mut b = RunExecutor::new(Some(99));
        let layout = BufferLayout::plan(
            SignalDomain::Real,
            Placement::InPlace,
            fftbench_core::Precision::Double,
            Shape::square(4).unwrap(),
        )
        .unwrap();
        let mut x = TransformBuffers::<f64>::allocate(&layout).unwrap();
        let mut y = TransformBuffers::<f64>::allocate(&layout).unwrap();
        a.fill_signal(&mut x);
        b.fill_signal(&mut y);
        assert_eq!(x.time_domain(), y.time_domain());
        assert!(x.time_domain()[..layout.signal_len()]
            .iter()
            .all(|v| (-1.0..1.0).contains(v)));
        assert!(x.time_domain()[..layout.signal_len()].iter().any(|&v| v != 0.0));
    }
}

//! RustFFT-backed engine.
//!
//! Rows are transformed with rustfft (complex data) or realfft (real
//! data); columns are transformed with one of the [`ColumnStrategy`]
//! variants. `MEASURE` planning times every strategy on the caller's
//! buffers and remembers the winner in the engine's wisdom.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use num_complex::Complex;
use rayon::{ThreadPool, ThreadPoolBuilder};
use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};
use rustfft::{Fft, FftDirection, FftPlanner};
use tracing::{debug, trace};

use fftbench_core::{
    as_complex, as_complex_mut, BenchError, BufferLayout, BufferViews, PlanEffort, Result, Scalar,
    SignalDomain, TransformBuffers,
};

use crate::engine::{PlanRequest, TransformEngine};
use crate::passes;
use crate::strategy::{ColumnStrategy, StrategyWisdom};

const MEASURE_RUNS: usize = 3;

enum RowTransform<T: Scalar> {
    Complex(Arc<dyn Fft<T>>),
    RealForward(Arc<dyn RealToComplex<T>>),
    RealInverse(Arc<dyn ComplexToReal<T>>),
}

/// A plan built by [`RustFftEngine`].
pub struct RustFftPlan<T: Scalar> {
    layout: BufferLayout,
    inverse: bool,
    rows: RowTransform<T>,
    column_fft: Arc<dyn Fft<T>>,
    strategy: ColumnStrategy,
    column_scratch: Mutex<Vec<Complex<T>>>,
}

impl<T: Scalar> RustFftPlan<T> {
    /// Column strategy chosen at plan time.
    pub fn strategy(&self) -> ColumnStrategy {
        self.strategy
    }

    pub fn is_inverse(&self) -> bool {
        self.inverse
    }

    pub fn layout(&self) -> &BufferLayout {
        &self.layout
    }

    fn run(
        &self,
        buffers: &mut TransformBuffers<T>,
        scratch: &mut [Complex<T>],
        threads: usize,
    ) -> Result<()> {
        let shape = self.layout.shape();
        let (rows, cols) = (shape.rows(), shape.cols());
        let width = self.layout.freq_row_len();
        let columns = |matrix: &mut [Complex<T>], scratch: &mut [Complex<T>]| {
            passes::columns(
                &self.column_fft,
                matrix,
                rows,
                width,
                self.strategy,
                scratch,
                threads,
            )
        };

        match &self.rows {
            RowTransform::Complex(fft) => {
                // Row and column passes commute, so both directions run rows
                // first; out-of-place plans leave their source untouched.
                let len = rows * width;
                let matrix = match buffers.views_mut() {
                    BufferViews::Aliased(data) => {
                        let matrix = &mut as_complex_mut(data)[..len];
                        passes::complex_rows(fft, &mut *matrix, cols, threads);
                        matrix
                    }
                    BufferViews::Separate { input, output } => {
                        let (src, dst) = if self.inverse {
                            (output, input)
                        } else {
                            (input, output)
                        };
                        let dst = &mut as_complex_mut(dst)[..len];
                        passes::complex_rows_separate(
                            fft,
                            &as_complex(src)[..len],
                            &mut *dst,
                            cols,
                        );
                        dst
                    }
                };
                columns(matrix, scratch);
            }
            RowTransform::RealForward(r2c) => {
                match buffers.views_mut() {
                    BufferViews::Aliased(data) => {
                        passes::real_forward_in_place(r2c, data, rows, cols, width)?
                    }
                    BufferViews::Separate { input, output } => passes::real_forward_separate(
                        r2c,
                        input,
                        as_complex_mut(output),
                        rows,
                        cols,
                        width,
                    )?,
                }
                columns(&mut buffers.frequency_mut()[..rows * width], scratch);
            }
            RowTransform::RealInverse(c2r) => {
                columns(&mut buffers.frequency_mut()[..rows * width], scratch);
                match buffers.views_mut() {
                    BufferViews::Aliased(data) => {
                        passes::real_inverse_in_place(c2r, data, rows, cols, width)?
                    }
                    BufferViews::Separate { input, output } => passes::real_inverse_separate(
                        c2r,
                        as_complex(output),
                        input,
                        rows,
                        cols,
                        width,
                    )?,
                }
            }
        }
        Ok(())
    }
}

/// 2-D FFT engine built on rustfft, realfft and a private rayon pool.
///
/// # Example
///
/// ```
/// use fftbench_core::{BufferLayout, Placement, PlanEffort, Precision, Shape, SignalDomain, TransformBuffers};
/// use fftbench_engine::{PlanGuard, PlanRequest, RustFftEngine};
///
/// let shape = Shape::new(4, 8).unwrap();
/// let layout = BufferLayout::plan(
///     SignalDomain::Complex, Placement::InPlace, Precision::Double, shape,
/// ).unwrap();
/// let mut buffers = TransformBuffers::<f64>::allocate(&layout).unwrap();
/// let request = PlanRequest {
///     domain: SignalDomain::Complex,
///     placement: Placement::InPlace,
///     shape,
///     effort: PlanEffort::Estimate,
/// };
///
/// let engine = RustFftEngine::<f64>::new().unwrap();
/// let forward = PlanGuard::forward(&engine, &request, &mut buffers).unwrap();
/// buffers.time_domain_mut()[0] = 1.0;
/// forward.execute(&mut buffers).unwrap();
/// assert!(buffers.frequency().iter().all(|bin| (bin.re - 1.0).abs() < 1e-12));
/// ```
pub struct RustFftEngine<T: Scalar> {
    complex_planner: Mutex<FftPlanner<T>>,
    real_planner: Mutex<RealFftPlanner<T>>,
    pool: ThreadPool,
    threads: usize,
    wisdom: Mutex<StrategyWisdom>,
}

impl<T: Scalar> RustFftEngine<T> {
    /// Single-threaded engine.
    pub fn new() -> Result<Self> {
        Self::with_threads(1)
    }

    /// Engine executing on `threads` workers.
    pub fn with_threads(threads: usize) -> Result<Self> {
        let threads = threads.max(1);
        Ok(Self {
            complex_planner: Mutex::new(FftPlanner::new()),
            real_planner: Mutex::new(RealFftPlanner::new()),
            pool: build_pool(threads)?,
            threads,
            wisdom: Mutex::new(StrategyWisdom::default()),
        })
    }

    /// Number of remembered strategy choices.
    pub fn wisdom_len(&self) -> usize {
        self.wisdom
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn build_plan(
        &self,
        request: &PlanRequest,
        buffers: &mut TransformBuffers<T>,
        inverse: bool,
    ) -> Result<RustFftPlan<T>> {
        request.check_layout::<T>(buffers.layout())?;
        let layout = *buffers.layout();
        let rows = layout.shape().rows();
        let cols = layout.shape().cols();
        let width = layout.freq_row_len();
        let direction = if inverse {
            FftDirection::Inverse
        } else {
            FftDirection::Forward
        };

        let (row_transform, column_fft) = {
            let mut complex = self
                .complex_planner
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let row_transform = match layout.domain() {
                SignalDomain::Complex => RowTransform::Complex(complex.plan_fft(cols, direction)),
                SignalDomain::Real => {
                    let mut real = self
                        .real_planner
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner);
                    if inverse {
                        RowTransform::RealInverse(real.plan_fft_inverse(cols))
                    } else {
                        RowTransform::RealForward(real.plan_fft_forward(cols))
                    }
                }
            };
            (row_transform, complex.plan_fft(rows, direction))
        };

        let strategy = self.choose_strategy(request.effort, &column_fft, buffers, inverse)?;
        let column_scratch = allocate_scratch(passes::column_scratch_len(strategy, rows, width))?;

        debug!(
            event = "plan_built",
            rows = rows,
            cols = cols,
            inverse = inverse,
            strategy = %strategy,
        );

        Ok(RustFftPlan {
            layout,
            inverse,
            rows: row_transform,
            column_fft,
            strategy,
            column_scratch: Mutex::new(column_scratch),
        })
    }

    fn choose_strategy(
        &self,
        effort: PlanEffort,
        column_fft: &Arc<dyn Fft<T>>,
        buffers: &mut TransformBuffers<T>,
        inverse: bool,
    ) -> Result<ColumnStrategy> {
        let rows = buffers.layout().shape().rows();
        let width = buffers.layout().freq_row_len();

        if !effort.uses_wisdom() {
            let strategy = ColumnStrategy::estimate(rows, width);
            debug!(event = "plan_strategy", source = "estimate", strategy = %strategy);
            return Ok(strategy);
        }

        let key = StrategyWisdom::key(rows, width, inverse, self.threads);
        let known = self
            .wisdom
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key);
        if let Some(strategy) = known {
            debug!(event = "plan_strategy", source = "wisdom", key = %key, strategy = %strategy);
            return Ok(strategy);
        }

        let strategy = self.measure_strategy(column_fft, buffers)?;
        debug!(event = "plan_strategy", source = "measured", key = %key, strategy = %strategy);
        self.wisdom
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, strategy);
        Ok(strategy)
    }

    /// Times every strategy on the frequency matrix of `buffers`,
    /// overwriting whatever the buffers held.
    fn measure_strategy(
        &self,
        column_fft: &Arc<dyn Fft<T>>,
        buffers: &mut TransformBuffers<T>,
    ) -> Result<ColumnStrategy> {
        let rows = buffers.layout().shape().rows();
        let width = buffers.layout().freq_row_len();
        let threads = self.threads;
        let matrix = &mut buffers.frequency_mut()[..rows * width];

        let mut best: Option<(ColumnStrategy, Duration)> = None;
        for strategy in ColumnStrategy::ALL {
            let mut scratch = allocate_scratch(passes::column_scratch_len(strategy, rows, width))?;
            let elapsed = self.pool.install(|| {
                (0..MEASURE_RUNS)
                    .map(|_| {
                        let start = Instant::now();
                        passes::columns(
                            column_fft,
                            &mut *matrix,
                            rows,
                            width,
                            strategy,
                            &mut scratch,
                            threads,
                        );
                        start.elapsed()
                    })
                    .min()
                    .unwrap_or_default()
            });
            trace!(event = "plan_candidate", strategy = %strategy, elapsed_ns = elapsed.as_nanos() as u64);
            if best.map_or(true, |(_, fastest)| elapsed < fastest) {
                best = Some((strategy, elapsed));
            }
        }
        Ok(best.map_or(ColumnStrategy::Transposed, |(strategy, _)| strategy))
    }
}

impl<T: Scalar> TransformEngine<T> for RustFftEngine<T> {
    type Plan = RustFftPlan<T>;

    fn name(&self) -> &'static str {
        "RustFFT"
    }

    fn configure_threads(&mut self, threads: usize) -> Result<()> {
        let threads = threads.max(1);
        if threads != self.threads {
            self.pool = build_pool(threads)?;
            self.threads = threads;
        }
        Ok(())
    }

    fn threads(&self) -> usize {
        self.threads
    }

    fn create_forward_plan(
        &self,
        request: &PlanRequest,
        buffers: &mut TransformBuffers<T>,
    ) -> Result<RustFftPlan<T>> {
        self.build_plan(request, buffers, false)
    }

    fn create_inverse_plan(
        &self,
        request: &PlanRequest,
        buffers: &mut TransformBuffers<T>,
    ) -> Result<RustFftPlan<T>> {
        self.build_plan(request, buffers, true)
    }

    fn execute(&self, plan: &RustFftPlan<T>, buffers: &mut TransformBuffers<T>) -> Result<()> {
        if *buffers.layout() != plan.layout {
            return Err(BenchError::Engine(format!(
                "plan for {} cannot run on buffers for {}",
                plan.layout.shape(),
                buffers.layout().shape()
            )));
        }
        let threads = self.threads;
        self.pool.install(|| {
            let mut scratch = plan
                .column_scratch
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            plan.run(buffers, &mut scratch, threads)
        })
    }

    fn destroy_plan(&self, plan: RustFftPlan<T>) {
        trace!(event = "plan_destroyed", inverse = plan.inverse);
        drop(plan);
    }

    fn scale(&self, buffer: &mut [T], factor: T, count: usize) {
        use rayon::prelude::*;

        let count = count.min(buffer.len());
        self.pool.install(|| {
            buffer[..count]
                .par_iter_mut()
                .with_min_len(4096)
                .for_each(|x| *x = *x * factor)
        });
    }

    fn import_wisdom(&mut self, wisdom: &str) -> Result<()> {
        self.wisdom
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .merge_json(wisdom)
    }

    fn export_wisdom(&self) -> Result<String> {
        self.wisdom
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .to_json()
    }
}

fn build_pool(threads: usize) -> Result<ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("fftbench-worker-{}", i))
        .build()
        .map_err(|e| BenchError::Engine(format!("cannot start {} worker threads: {}", threads, e)))
}

fn allocate_scratch<T: Scalar>(len: usize) -> Result<Vec<Complex<T>>> {
    let mut scratch = Vec::new();
    scratch
        .try_reserve_exact(len)
        .map_err(|e| BenchError::Allocation {
            bytes: len.saturating_mul(std::mem::size_of::<Complex<T>>()),
            reason: e.to_string(),
        })?;
    scratch.resize(len, Complex::new(T::zero(), T::zero()));
    Ok(scratch)
}

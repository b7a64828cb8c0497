//! The transform engine capability.
//!
//! The harness never computes a transform itself. It asks an engine for a
//! forward and an inverse plan bound to a buffer layout, executes them, and
//! releases them again. Engines may parallelise internally; the harness only
//! sees the elapsed time around [`TransformEngine::execute`].

use std::marker::PhantomData;

use fftbench_core::{
    BenchError, BufferLayout, Placement, PlanEffort, Result, Scalar, Shape, SignalDomain,
    TestConfiguration, TransformBuffers,
};

/// What a plan must transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanRequest {
    pub domain: SignalDomain,
    pub placement: Placement,
    pub shape: Shape,
    pub effort: PlanEffort,
}

impl PlanRequest {
    /// Request for `shape` under the settings of `config`.
    pub fn for_config(config: &TestConfiguration, shape: Shape) -> Self {
        Self {
            domain: config.domain(),
            placement: config.placement(),
            shape,
            effort: config.effort(),
        }
    }

    /// Checks that `layout` describes the buffers this request needs.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::PlanConstruction`] on any mismatch.
    pub fn check_layout<T: Scalar>(&self, layout: &BufferLayout) -> Result<()> {
        if layout.domain() != self.domain
            || layout.placement() != self.placement
            || layout.shape() != self.shape
        {
            return Err(BenchError::plan(format!(
                "buffers are laid out for a {} {} {} transform, plan requested {} {} {}",
                layout.domain(),
                layout.placement(),
                layout.shape(),
                self.domain,
                self.placement,
                self.shape
            )));
        }
        if layout.precision() != T::PRECISION {
            return Err(BenchError::plan(format!(
                "buffers hold {} precision samples, plan requested {}",
                layout.precision(),
                T::PRECISION
            )));
        }
        Ok(())
    }
}

/// A 2-D FFT engine.
///
/// Plans are bound to a buffer layout when created. Plan construction may
/// overwrite the buffers (e.g. while measuring candidate strategies), so
/// callers initialise their signal only after both plans exist.
pub trait TransformEngine<T: Scalar> {
    /// Engine-specific plan handle.
    type Plan;

    /// Short engine name for banners and wisdom files.
    fn name(&self) -> &'static str;

    /// Sets the number of worker threads used by later executions.
    fn configure_threads(&mut self, threads: usize) -> Result<()>;

    /// Worker threads currently configured.
    fn threads(&self) -> usize;

    /// Builds a forward (time -> frequency) plan.
    fn create_forward_plan(
        &self,
        request: &PlanRequest,
        buffers: &mut TransformBuffers<T>,
    ) -> Result<Self::Plan>;

    /// Builds an unnormalised inverse (frequency -> time) plan.
    fn create_inverse_plan(
        &self,
        request: &PlanRequest,
        buffers: &mut TransformBuffers<T>,
    ) -> Result<Self::Plan>;

    /// Runs `plan` over `buffers`.
    fn execute(&self, plan: &Self::Plan, buffers: &mut TransformBuffers<T>) -> Result<()>;

    /// Releases a plan.
    fn destroy_plan(&self, plan: Self::Plan);

    /// Multiplies the first `count` scalars of `buffer` by `factor`.
    fn scale(&self, buffer: &mut [T], factor: T, count: usize) {
        let count = count.min(buffer.len());
        for x in &mut buffer[..count] {
            *x = *x * factor;
        }
    }

    /// Merges previously exported wisdom into the engine.
    fn import_wisdom(&mut self, wisdom: &str) -> Result<()>;

    /// Serialises the engine's accumulated wisdom.
    fn export_wisdom(&self) -> Result<String>;
}

/// A plan that is handed back to its engine when dropped.
///
/// Holding plans in guards releases them on every exit path, including a
/// failure to build the second plan of a pair.
pub struct PlanGuard<'e, T, E>
where
    T: Scalar,
    E: TransformEngine<T> + ?Sized,
{
    engine: &'e E,
    plan: Option<E::Plan>,
    _marker: PhantomData<fn(T)>,
}

impl<'e, T, E> PlanGuard<'e, T, E>
where
    T: Scalar,
    E: TransformEngine<T> + ?Sized,
{
    /// Takes ownership of `plan` on behalf of `engine`.
    pub fn new(engine: &'e E, plan: E::Plan) -> Self {
        Self {
            engine,
            plan: Some(plan),
            _marker: PhantomData,
        }
    }

    /// Builds a forward plan and guards it.
    pub fn forward(
        engine: &'e E,
        request: &PlanRequest,
        buffers: &mut TransformBuffers<T>,
    ) -> Result<Self> {
        let plan = engine.create_forward_plan(request, buffers)?;
        Ok(Self::new(engine, plan))
    }

    /// Builds an inverse plan and guards it.
    pub fn inverse(
        engine: &'e E,
        request: &PlanRequest,
        buffers: &mut TransformBuffers<T>,
    ) -> Result<Self> {
        let plan = engine.create_inverse_plan(request, buffers)?;
        Ok(Self::new(engine, plan))
    }

    /// Executes the guarded plan.
    pub fn execute(&self, buffers: &mut TransformBuffers<T>) -> Result<()> {
        match &self.plan {
            Some(plan) => self.engine.execute(plan, buffers),
            None => Err(BenchError::Engine("plan already released".to_string())),
        }
    }

    /// Releases the plan now instead of at scope exit.
    pub fn release(mut self) {
        if let Some(plan) = self.plan.take() {
            self.engine.destroy_plan(plan);
        }
    }
}

impl<T, E> Drop for PlanGuard<'_, T, E>
where
    T: Scalar,
    E: TransformEngine<T> + ?Sized,
{
    fn drop(&mut self) {
        if let Some(plan) = self.plan.take() {
            self.engine.destroy_plan(plan);
        }
    }
}

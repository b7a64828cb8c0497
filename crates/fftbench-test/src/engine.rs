//! Recording engine double.

use std::cell::{Cell, RefCell};
use std::marker::PhantomData;

use fftbench_core::{BenchError, BufferLayout, Result, Scalar, TransformBuffers};
use fftbench_engine::{PlanRequest, TransformEngine};

/// Plan handed out by [`MockEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockPlan {
    pub id: usize,
    pub inverse: bool,
    pub layout: BufferLayout,
}

/// Engine that performs no arithmetic and records every call.
///
/// Plan construction can be told to fail, to exercise cleanup paths.
///
/// # Example
///
/// ```
/// use fftbench_test::MockEngine;
///
/// let engine = MockEngine::<f64>::new().failing_inverse();
/// assert_eq!(engine.plans_created(), 0);
/// ```
#[derive(Debug)]
pub struct MockEngine<T> {
    threads: usize,
    fail_forward: bool,
    fail_inverse: bool,
    next_id: Cell<usize>,
    plans_created: Cell<usize>,
    plans_destroyed: RefCell<Vec<MockPlan>>,
    executions: Cell<usize>,
    scaled: RefCell<Vec<usize>>,
    configure_calls: Vec<usize>,
    imported: Vec<String>,
    exports: Cell<usize>,
    layouts: RefCell<Vec<BufferLayout>>,
    _marker: PhantomData<fn(T)>,
}

impl<T: Scalar> MockEngine<T> {
    pub fn new() -> Self {
        Self {
            threads: 1,
            fail_forward: false,
            fail_inverse: false,
            next_id: Cell::new(0),
            plans_created: Cell::new(0),
            plans_destroyed: RefCell::new(Vec::new()),
            executions: Cell::new(0),
            scaled: RefCell::new(Vec::new()),
            configure_calls: Vec::new(),
            imported: Vec::new(),
            exports: Cell::new(0),
            layouts: RefCell::new(Vec::new()),
            _marker: PhantomData,
        }
    }

    /// Makes every forward plan request fail.
    pub fn failing_forward(mut self) -> Self {
        self.fail_forward = true;
        self
    }

    /// Makes every inverse plan request fail.
    pub fn failing_inverse(mut self) -> Self {
        self.fail_inverse = true;
        self
    }

    pub fn plans_created(&self) -> usize {
        self.plans_created.get()
    }

    pub fn plans_destroyed(&self) -> Vec<MockPlan> {
        self.plans_destroyed.borrow().clone()
    }

    /// Plans created and not yet destroyed.
    pub fn live_plans(&self) -> usize {
        self.plans_created.get() - self.plans_destroyed.borrow().len()
    }

    pub fn executions(&self) -> usize {
        self.executions.get()
    }

    /// `count` argument of every `scale` call.
    pub fn scaled(&self) -> Vec<usize> {
        self.scaled.borrow().clone()
    }

    pub fn configure_calls(&self) -> &[usize] {
        &self.configure_calls
    }

    pub fn imported(&self) -> &[String] {
        &self.imported
    }

    pub fn exports(&self) -> usize {
        self.exports.get()
    }

    /// Layouts of the buffers each plan was built for, in request order.
    pub fn layouts(&self) -> Vec<BufferLayout> {
        self.layouts.borrow().clone()
    }

    fn plan(
        &self,
        request: &PlanRequest,
        buffers: &TransformBuffers<T>,
        inverse: bool,
    ) -> Result<MockPlan> {
        request.check_layout::<T>(buffers.layout())?;
        if (inverse && self.fail_inverse) || (!inverse && self.fail_forward) {
            return Err(BenchError::plan(format!(
                "mock refuses {} plan for {}",
                if inverse { "inverse" } else { "forward" },
                request.shape
            )));
        }
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.plans_created.set(self.plans_created.get() + 1);
        self.layouts.borrow_mut().push(*buffers.layout());
        Ok(MockPlan {
            id,
            inverse,
            layout: *buffers.layout(),
        })
    }
}

impl<T: Scalar> Default for MockEngine<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> TransformEngine<T> for MockEngine<T> {
    type Plan = MockPlan;

    fn name(&self) -> &'static str {
        "Mock"
    }

    fn configure_threads(&mut self, threads: usize) -> Result<()> {
        self.configure_calls.push(threads);
        self.threads = threads.max(1);
        Ok(())
    }

    fn threads(&self) -> usize {
        self.threads
    }

    fn create_forward_plan(
        &self,
        request: &PlanRequest,
        buffers: &mut TransformBuffers<T>,
    ) -> Result<MockPlan> {
        self.plan(request, buffers, false)
    }

    fn create_inverse_plan(
        &self,
        request: &PlanRequest,
        buffers: &mut TransformBuffers<T>,
    ) -> Result<MockPlan> {
        self.plan(request, buffers, true)
    }

    fn execute(&self, plan: &MockPlan, buffers: &mut TransformBuffers<T>) -> Result<()> {
        if plan.layout != *buffers.layout() {
            return Err(BenchError::Engine("plan/buffer mismatch".to_string()));
        }
        self.executions.set(self.executions.get() + 1);
        Ok(())
    }

    fn destroy_plan(&self, plan: MockPlan) {
        self.plans_destroyed.borrow_mut().push(plan);
    }

    fn scale(&self, buffer: &mut [T], factor: T, count: usize) {
        self.scaled.borrow_mut().push(count);
        for x in buffer.iter_mut().take(count) {
            *x = *x * factor;
        }
    }

    fn import_wisdom(&mut self, wisdom: &str) -> Result<()> {
        self.imported.push(wisdom.to_string());
        Ok(())
    }

    fn export_wisdom(&self) -> Result<String> {
        self.exports.set(self.exports.get() + 1);
        Ok(format!("mock-wisdom-{}", self.plans_created.get()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fftbench_core::{Placement, PlanEffort, Precision, Shape, SignalDomain};
    use fftbench_engine::PlanGuard;

    fn buffers(shape: Shape) -> (PlanRequest, TransformBuffers<f64>) {
        let layout = BufferLayout::plan(
            SignalDomain::Real,
            Placement::InPlace,
            Precision::Double,
            shape,
        )
        .unwrap();
        let request = PlanRequest {
            domain: SignalDomain::Real,
            placement: Placement::InPlace,
            shape,
            effort: PlanEffort::Estimate,
        };
        (request, TransformBuffers::allocate(&layout).unwrap())
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let engine = MockEngine::<f64>::new();
        let (request, mut bufs) = buffers(Shape::square(8).unwrap());
        {
            let forward = PlanGuard::forward(&engine, &request, &mut bufs).unwrap();
            forward.execute(&mut bufs).unwrap();
            assert_eq!(engine.live_plans(), 1);
        }
        assert_eq!(engine.live_plans(), 0);
        assert_eq!(engine.executions(), 1);
    }

    #[test]
    fn test_failing_inverse() {
        let engine = MockEngine::<f64>::new().failing_inverse();
        let (request, mut bufs) = buffers(Shape::square(8).unwrap());
        assert!(engine.create_forward_plan(&request, &mut bufs).is_ok());
        assert!(matches!(
            engine.create_inverse_plan(&request, &mut bufs),
            Err(BenchError::PlanConstruction(_))
        ));
        assert_eq!(engine.plans_created(), 1);
    }
}

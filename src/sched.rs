//! Timer Capability
//!
//! Abstract one-shot and periodic timers so the engine can run against real
//! browser timers or a manual clock in tests. Dropping a handle cancels the
//! underlying timer.

/// Timer scheduling capability.
///
/// All callbacks run on the same logical thread as the caller; there is no
/// parallelism, only deferred invocation.
pub trait Scheduler: Clone + 'static {
    /// Cancel-on-drop handle for an armed timer.
    type Handle;

    /// Run `f` once after `delay_ms`.
    fn timeout(&self, delay_ms: u32, f: Box<dyn FnOnce()>) -> Self::Handle;

    /// Run `f` every `period_ms` until the handle is dropped.
    fn interval(&self, period_ms: u32, f: Box<dyn FnMut()>) -> Self::Handle;
}

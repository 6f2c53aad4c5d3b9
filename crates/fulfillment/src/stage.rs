//! The stage contract shared by every pipeline element.

use crate::context::OrderContext;
use crate::error::Result;

/// A unit of work in the fulfillment pipeline.
///
/// A stage runs its pre-logic, hands the context to the rest of the chain via
/// [`Next::run`], and runs its post-logic once that call returns. If the
/// delegated call fails, the stage must undo anything it committed for this
/// run before returning the same error (see [`compensate_on_failure`]).
/// A terminal stage simply never calls `next`.
pub trait Stage: Send + Sync {
    /// Stable name used in logs and metric labels.
    fn name(&self) -> &'static str;

    fn process(&self, ctx: &mut OrderContext, next: Next<'_>) -> Result<()>;
}

/// Handle on the part of the chain below the current stage.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    remaining: &'a [Box<dyn Stage>],
}

impl<'a> Next<'a> {
    pub(crate) fn new(remaining: &'a [Box<dyn Stage>]) -> Self {
        Self { remaining }
    }

    /// Runs the rest of the chain. An exhausted chain succeeds immediately.
    pub fn run(self, ctx: &mut OrderContext) -> Result<()> {
        let Some((stage, rest)) = self.remaining.split_first() else {
            return Ok(());
        };

        let span = tracing::debug_span!("stage", stage = stage.name());
        let _entered = span.enter();
        stage.process(ctx, Next::new(rest))
    }
}

/// Passes `outcome` through unchanged, running `compensate` first if it is an
/// error.
///
/// A failing compensation is logged and counted; the caller still receives
/// the original downstream error.
pub fn compensate_on_failure<F>(
    stage: &'static str,
    outcome: Result<()>,
    compensate: F,
) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    if let Err(err) = &outcome {
        tracing::warn!(stage, error = %err, "downstream failure, compensating");
        metrics::counter!("fulfillment_compensations_total", "stage" => stage).increment(1);

        if let Err(compensation_err) = compensate() {
            tracing::error!(stage, error = %compensation_err, "compensation failed");
            metrics::counter!("fulfillment_compensation_failures_total", "stage" => stage)
                .increment(1);
        }
    }
    outcome
}

//! Coroutine scheduler
//!
//! A coroutine is a stack of suspended routines. Each tick the owning game
//! object advances every running coroutine by exactly one step of its
//! topmost routine:
//!
//! 1. An empty stack means the coroutine is finished and it is removed.
//! 2. Otherwise the top routine is resumed once.
//! 3. [`Step::Done`] pops it, returning control to the routine beneath.
//! 4. [`Step::Call`] pushes the nested routine, which runs to completion
//!    before the outer routine is resumed again.
//!
//! Nested routines never get extra steps in the same tick.

use log::{debug, trace, warn};

use crate::ecs::World;
use crate::engine::EngineResult;
use crate::foundation::collections::{CoroutineId, EntityId};
use crate::foundation::time::FrameContext;

/// Result of resuming a routine once
pub enum Step {
    /// Suspend until the next tick
    Wait,
    /// Suspend until `routine` is exhausted
    Call(Box<dyn Routine>),
    /// No further steps
    Done,
}

impl Step {
    /// Nest `routine`
    pub fn call<R: Routine>(routine: R) -> Self {
        Self::Call(Box::new(routine))
    }
}

/// A resumable sequence of steps with its own saved state
pub trait Routine: 'static {
    /// Run until the next suspension point
    fn resume(&mut self, cx: &mut RoutineContext<'_>) -> EngineResult<Step>;
}

impl<F> Routine for F
where
    F: FnMut(&mut RoutineContext<'_>) -> EngineResult<Step> + 'static,
{
    fn resume(&mut self, cx: &mut RoutineContext<'_>) -> EngineResult<Step> {
        self(cx)
    }
}

/// Wrap a closure as a routine, fixing its signature for inference
pub fn from_fn<F>(f: F) -> F
where
    F: FnMut(&mut RoutineContext<'_>) -> EngineResult<Step> + 'static,
{
    f
}

/// What a resumed routine can reach
pub struct RoutineContext<'w> {
    /// The whole world
    pub world: &'w mut World,
    entity: EntityId,
    coroutine: CoroutineId,
    frame: FrameContext,
}

impl RoutineContext<'_> {
    /// Game object running the coroutine
    pub const fn entity(&self) -> EntityId {
        self.entity
    }

    /// Handle of the running coroutine
    pub const fn coroutine(&self) -> CoroutineId {
        self.coroutine
    }

    /// Timing for the current tick
    pub const fn frame(&self) -> &FrameContext {
        &self.frame
    }
}

/// Waits a fixed number of ticks
#[derive(Debug, Clone)]
pub struct WaitTicks {
    remaining: u32,
}

impl WaitTicks {
    /// Suspend for `ticks` ticks
    pub const fn new(ticks: u32) -> Self {
        Self { remaining: ticks }
    }
}

impl Routine for WaitTicks {
    fn resume(&mut self, _cx: &mut RoutineContext<'_>) -> EngineResult<Step> {
        if self.remaining == 0 {
            return Ok(Step::Done);
        }
        self.remaining -= 1;
        Ok(Step::Wait)
    }
}

/// Waits until at least the given number of seconds have elapsed
#[derive(Debug, Clone)]
pub struct WaitSeconds {
    remaining: f32,
}

impl WaitSeconds {
    /// Suspend for `seconds` of frame time
    pub const fn new(seconds: f32) -> Self {
        Self { remaining: seconds }
    }
}

impl Routine for WaitSeconds {
    fn resume(&mut self, cx: &mut RoutineContext<'_>) -> EngineResult<Step> {
        if self.remaining <= 0.0 {
            return Ok(Step::Done);
        }
        self.remaining -= cx.frame().delta_time;
        Ok(Step::Wait)
    }
}

/// Call stack of one running coroutine
pub struct Coroutine {
    owner: EntityId,
    stack: Vec<Box<dyn Routine>>,
}

impl Coroutine {
    fn new(owner: EntityId, routine: Box<dyn Routine>) -> Self {
        Self {
            owner,
            stack: vec![routine],
        }
    }

    /// Nesting depth
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl World {
    /// Start `routine` as a coroutine owned by `entity`
    pub fn start_coroutine<R: Routine>(&mut self, entity: EntityId, routine: R) -> EngineResult<CoroutineId> {
        self.entity(entity)?;
        let id = self.coroutines.insert(Coroutine::new(entity, Box::new(routine)));
        self.entity_mut(entity)?.coroutines.push(id);
        debug!("Started coroutine {id:?} on {entity:?}");
        Ok(id)
    }

    /// Remove a coroutine immediately, without running any further step.
    ///
    /// Returns whether it was running on `entity`.
    pub fn stop_coroutine(&mut self, entity: EntityId, coroutine: CoroutineId) -> EngineResult<bool> {
        let record = self.entity_mut(entity)?;
        let before = record.coroutines.len();
        record.coroutines.retain(|&id| id != coroutine);
        if record.coroutines.len() == before {
            return Ok(false);
        }
        self.coroutines.remove(coroutine);
        debug!("Stopped coroutine {coroutine:?} on {entity:?}");
        Ok(true)
    }

    /// Stop every coroutine on `entity`
    pub fn stop_all_coroutines(&mut self, entity: EntityId) -> EngineResult<()> {
        let running = std::mem::take(&mut self.entity_mut(entity)?.coroutines);
        for coroutine in running {
            self.coroutines.remove(coroutine);
        }
        Ok(())
    }

    /// Coroutines running on `entity`, in start order
    pub fn running_coroutines(&self, entity: EntityId) -> EngineResult<&[CoroutineId]> {
        Ok(&self.entity(entity)?.coroutines)
    }

    /// Whether a coroutine is still running
    pub fn is_coroutine_running(&self, coroutine: CoroutineId) -> bool {
        self.coroutines.contains_key(coroutine)
    }

    /// Nesting depth of a running coroutine
    pub fn coroutine_depth(&self, coroutine: CoroutineId) -> Option<usize> {
        self.coroutines.get(coroutine).map(Coroutine::depth)
    }

    fn finish_coroutine(&mut self, coroutine: CoroutineId, owner: EntityId) {
        self.coroutines.remove(coroutine);
        if let Some(record) = self.entities.get_mut(owner) {
            record.coroutines.retain(|&id| id != coroutine);
        }
    }

    /// Advance a coroutine by one step.
    ///
    /// A routine that returns an error ends its coroutine; the error is
    /// propagated.
    pub(crate) fn advance_coroutine(&mut self, coroutine: CoroutineId, frame: &FrameContext) -> EngineResult<()> {
        let Some(state) = self.coroutines.get_mut(coroutine) else {
            return Ok(());
        };
        let owner = state.owner;
        let Some(mut top) = state.stack.pop() else {
            self.finish_coroutine(coroutine, owner);
            debug!("Coroutine {coroutine:?} finished");
            return Ok(());
        };

        let step = {
            let mut cx = RoutineContext {
                world: self,
                entity: owner,
                coroutine,
                frame: *frame,
            };
            top.resume(&mut cx)
        };

        let step = match step {
            Ok(step) => step,
            Err(error) => {
                warn!("Coroutine {coroutine:?} failed: {error}");
                self.finish_coroutine(coroutine, owner);
                return Err(error);
            }
        };

        // Stopped by its own step.
        let Some(state) = self.coroutines.get_mut(coroutine) else {
            return Ok(());
        };
        match step {
            Step::Wait => state.stack.push(top),
            Step::Call(nested) => {
                trace!("Coroutine {coroutine:?} nesting to depth {}", state.stack.len() + 2);
                state.stack.push(top);
                state.stack.push(nested);
            }
            Step::Done => {}
        }
        Ok(())
    }
}

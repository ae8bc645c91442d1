//! Application trait and lifecycle management

use crate::engine::{Engine, EngineError};
use crate::foundation::time::FrameContext;
use thiserror::Error;

/// Application lifecycle trait
///
/// Implement this trait to drive the engine from a host program. The
/// engine owns the loop; the application sets up scenes in `initialize` and
/// reacts once per tick in `update`.
pub trait Application {
    /// Called once after the engine is created, before the first tick.
    /// Create and load the initial scenes here.
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError>;

    /// Called every tick before the scenes update
    fn update(&mut self, engine: &mut Engine, frame: &FrameContext) -> Result<(), AppError>;

    /// Called after the scenes have drawn
    fn render(&mut self, _engine: &mut Engine, _frame: &FrameContext) -> Result<(), AppError> {
        Ok(())
    }

    /// Handle application events. Forwards to the engine by default.
    fn handle_event(&mut self, engine: &mut Engine, event: AppEvent) -> Result<(), AppError> {
        engine.handle_event(event)?;
        Ok(())
    }

    /// Called once when the loop stops, before the world is shut down
    fn cleanup(&mut self, engine: &mut Engine);
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine error propagated to application level
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),
}

/// Application events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Window was resized
    WindowResized {
        /// New window width
        width: u32,
        /// New window height
        height: u32,
    },

    /// Window close requested
    WindowCloseRequested,
}

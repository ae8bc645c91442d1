//! # Core Engine Module
//!
//! Shared configuration used by the host loop and its subsystems, and the
//! screen state it drives.

pub mod config;
pub mod screen;

// Re-export commonly used config types
pub use config::{
    ApplicationConfig,
    ContentConfig,
    DisplayMode,
    EngineConfig,
    TimingConfig,
    WindowConfig,
    Config,
    ConfigError,
};
pub use screen::Screen;

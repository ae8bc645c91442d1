//! # Application Configuration
//!
//! Window, timing, engine and content settings for a host application.
//! Everything here is serializable, so a whole [`ApplicationConfig`] can be
//! loaded from a `.toml` or `.ron` file through the [`Config`] trait.

use serde::{Serialize, Deserialize};

use crate::foundation::color::Color;
use crate::scene::SceneManagerKind;

pub use crate::config::{Config, ConfigError};

/// How the window occupies the display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayMode {
    /// Regular decorated window
    #[default]
    Windowed,
    /// Exclusive fullscreen with a hardware mode switch
    Fullscreen,
    /// Borderless window covering the display, no mode switch
    FullscreenBorderless,
}

impl DisplayMode {
    /// Whether the window covers the whole display
    pub const fn is_fullscreen(self) -> bool {
        !matches!(self, Self::Windowed)
    }

    /// Whether entering this mode changes the display's video mode
    pub const fn hardware_mode_switch(self) -> bool {
        !matches!(self, Self::FullscreenBorderless)
    }
}

/// # Window Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Back buffer width in pixels
    pub width: u32,
    /// Back buffer height in pixels
    pub height: u32,
    /// Windowed or fullscreen
    pub display_mode: DisplayMode,
    /// VSync setting
    pub vsync: bool,
}

impl WindowConfig {
    /// Create a windowed configuration
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            width: 1280,
            height: 720,
            display_mode: DisplayMode::Windowed,
            vsync: true,
        }
    }

    /// Set the resolution
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the display mode
    pub fn with_display_mode(mut self, display_mode: DisplayMode) -> Self {
        self.display_mode = display_mode;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err(format!("Resolution must be non-zero, got {}x{}", self.width, self.height));
        }
        Ok(())
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::new("Olive Application")
    }
}

/// # Timing Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Advance by `target_delta` every tick instead of reading the clock
    pub fixed_timestep: bool,
    /// Seconds per tick when `fixed_timestep` is set
    pub target_delta: f32,
    /// Stop after this many ticks
    pub max_frames: Option<u64>,
}

impl TimingConfig {
    /// Fixed 60 Hz ticks, unbounded
    pub fn new() -> Self {
        Self {
            fixed_timestep: true,
            target_delta: 1.0 / 60.0,
            max_frames: None,
        }
    }

    /// Stop after `frames` ticks
    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    /// Use wall-clock deltas
    pub fn with_variable_timestep(mut self) -> Self {
        self.fixed_timestep = false;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.fixed_timestep && !(self.target_delta > 0.0) {
            return Err(format!("Fixed timestep must be positive, got {}", self.target_delta));
        }
        Ok(())
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Engine Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Log level used when `RUST_LOG` is unset
    pub log_level: String,
    /// Scene manager strategy installed at startup
    pub scene_manager: SceneManagerKind,
    /// Clear color when no scene draws anything
    pub background: Color,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            scene_manager: SceneManagerKind::Additive,
            background: Color::BLACK,
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set the startup scene manager strategy
    pub fn with_scene_manager(mut self, kind: SceneManagerKind) -> Self {
        self.scene_manager = kind;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Content Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Directory content names are resolved against
    pub root_directory: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            root_directory: "Content".to_string(),
        }
    }
}

/// # Complete Application Configuration
///
/// Top-level configuration that encompasses all engine subsystems.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Window and display settings
    pub window: WindowConfig,
    /// Tick timing
    pub timing: TimingConfig,
    /// Engine core configuration
    pub engine: EngineConfig,
    /// Content loading
    pub content: ContentConfig,
}

impl ApplicationConfig {
    /// Create a new application configuration with defaults
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            window: WindowConfig::new(title),
            ..Self::default()
        }
    }

    /// Replace the window settings
    pub fn with_window(mut self, window: WindowConfig) -> Self {
        self.window = window;
        self
    }

    /// Replace the timing settings
    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Replace the engine settings
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), String> {
        self.window.validate()?;
        self.timing.validate()?;
        Ok(())
    }
}

impl Config for ApplicationConfig {}

//! Back-buffer resolution and display mode

use log::info;

use crate::core::config::{DisplayMode, WindowConfig};
use crate::engine::{EngineError, EngineResult};

/// Current output resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Screen {
    width: u32,
    height: u32,
    display_mode: DisplayMode,
}

impl Screen {
    /// Screen matching a window configuration
    pub const fn from_window(window: &WindowConfig) -> Self {
        Self {
            width: window.width,
            height: window.height,
            display_mode: window.display_mode,
        }
    }

    /// Width in pixels
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)` in pixels
    pub const fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Windowed or fullscreen
    pub const fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    /// Change resolution and display mode
    pub fn set_resolution(&mut self, width: u32, height: u32, display_mode: DisplayMode) -> EngineResult<()> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidArgument(format!(
                "resolution must be non-zero, got {width}x{height}"
            )));
        }
        self.width = width;
        self.height = height;
        self.display_mode = display_mode;
        info!(
            "Resolution set to {width}x{height} ({display_mode:?}, fullscreen: {}, mode switch: {})",
            display_mode.is_fullscreen(),
            display_mode.hardware_mode_switch()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_resolution() {
        let mut screen = Screen::from_window(&WindowConfig::new("screen"));
        screen.set_resolution(1920, 1080, DisplayMode::FullscreenBorderless).unwrap();
        assert_eq!(screen.resolution(), (1920, 1080));
        assert!(screen.display_mode().is_fullscreen());
    }

    #[test]
    fn test_zero_resolution_is_rejected() {
        let mut screen = Screen::from_window(&WindowConfig::new("screen"));
        let before = screen;
        assert!(matches!(
            screen.set_resolution(0, 720, DisplayMode::Windowed),
            Err(EngineError::InvalidArgument(_))
        ));
        assert_eq!(screen, before);
    }
}

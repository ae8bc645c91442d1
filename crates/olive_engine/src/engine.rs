//! Core engine implementation
//!
//! [`Engine::run`] is the host loop: it creates the [`World`], lets the
//! application build its scenes, then ticks update, draw and post-render
//! until asked to stop.

use std::any::Any;

use log::{debug, info};
use thiserror::Error;

use crate::application::{AppError, AppEvent, Application};
use crate::assets::{ContentError, ContentManager};
use crate::config::ConfigError;
use crate::core::config::ApplicationConfig;
use crate::core::screen::Screen;
use crate::ecs::World;
use crate::foundation::logging;
use crate::foundation::time::{FrameContext, Timer};
use crate::render::{RenderDevice, Viewport};

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Operation on a disposed component, game object or scene
    #[error("Cannot access a disposed {kind}")]
    Disposed {
        /// What kind of object was disposed
        kind: &'static str,
    },

    /// Malformed argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation not allowed in the current state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// A required component was not attached
    #[error("Missing required component: {0}")]
    MissingComponent(&'static str),

    /// Content loading failed
    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    /// Configuration failed to load or validate
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// The application reported a failure
    #[error("Application error: {0}")]
    Application(String),
}

/// Result alias used throughout the engine
pub type EngineResult<T> = Result<T, EngineError>;

fn app_failure(stage: &'static str) -> impl Fn(AppError) -> EngineError {
    move |error| match error {
        AppError::Engine(inner) => inner,
        AppError::Custom(message) => EngineError::Application(format!("{stage}: {message}")),
    }
}

/// Main engine struct
///
/// Owns the world, the render device and frame timing.
pub struct Engine {
    /// Every entity, component and scene
    pub world: World,
    device: Box<dyn RenderDevice>,
    timer: Timer,
    config: ApplicationConfig,
    screen: Screen,
    running: bool,
}

impl Engine {
    /// Create an engine from validated configuration
    pub fn new(config: ApplicationConfig, mut device: Box<dyn RenderDevice>) -> EngineResult<Self> {
        config
            .validate()
            .map_err(|message| EngineError::Config(ConfigError::Invalid(message)))?;
        info!("Initializing engine for '{}'", config.window.title);

        let mut world = World::with_scene_manager(config.engine.scene_manager)
            .with_content(ContentManager::new(&config.content.root_directory));
        world.set_background(config.engine.background);
        device.set_viewport(Viewport::new(config.window.width, config.window.height));

        Ok(Self {
            world,
            device,
            timer: Timer::new(),
            screen: Screen::from_window(&config.window),
            config,
            running: true,
        })
    }

    /// Run the host loop with the given application.
    ///
    /// Stops on [`quit`](Self::quit), a close request, or after
    /// `timing.max_frames` ticks. The world is shut down before returning.
    pub fn run<A: Application>(
        config: ApplicationConfig,
        device: Box<dyn RenderDevice>,
        app: &mut A,
    ) -> EngineResult<()> {
        logging::init_with_level(&config.engine.log_level);
        let mut engine = Self::new(config, device)?;

        app.initialize(&mut engine).map_err(app_failure("App initialization"))?;
        engine.world.load_content()?;
        engine.world.initialize()?;

        info!("Starting main loop...");
        let result = engine.run_loop(app);

        app.cleanup(&mut engine);
        engine.world.shutdown()?;
        info!("Engine shutdown complete after {} frame(s)", engine.timer.frame_count());
        result
    }

    fn run_loop<A: Application>(&mut self, app: &mut A) -> EngineResult<()> {
        while self.running {
            self.tick(app)?;
            if self
                .config
                .timing
                .max_frames
                .is_some_and(|max| self.timer.frame_count() >= max)
            {
                debug!("Reached frame limit");
                self.running = false;
            }
        }
        Ok(())
    }

    /// Advance one frame: application update, scene update, draw,
    /// post-render, application render
    pub fn tick<A: Application>(&mut self, app: &mut A) -> EngineResult<FrameContext> {
        if self.config.timing.fixed_timestep {
            self.timer.advance(self.config.timing.target_delta);
        } else {
            self.timer.update();
        }
        let frame = self.timer.frame_context();

        app.update(self, &frame).map_err(app_failure("App update"))?;
        self.world.update(&frame)?;
        self.world.draw(&frame, self.device.as_mut())?;
        self.world.post_render(&frame)?;
        app.render(self, &frame).map_err(app_failure("App render"))?;
        Ok(frame)
    }

    /// Handle an application event
    pub fn handle_event(&mut self, event: AppEvent) -> EngineResult<()> {
        match event {
            AppEvent::WindowCloseRequested => {
                info!("Window close requested");
                self.running = false;
            }
            AppEvent::WindowResized { width, height } => {
                self.set_resolution(width, height)?;
            }
        }
        Ok(())
    }

    /// Resize the back buffer, keeping the display mode
    pub fn set_resolution(&mut self, width: u32, height: u32) -> EngineResult<()> {
        self.screen.set_resolution(width, height, self.screen.display_mode())?;
        self.device.set_viewport(Viewport::new(width, height));
        Ok(())
    }

    /// Request engine shutdown
    pub fn quit(&mut self) {
        info!("Engine shutdown requested");
        self.running = false;
    }

    /// Whether the loop keeps going after this tick
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Get the world
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the world
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The render device
    pub fn device(&self) -> &dyn RenderDevice {
        self.device.as_ref()
    }

    /// The render device as its concrete type
    pub fn device_as<D: RenderDevice>(&self) -> Option<&D> {
        device_any(self.device.as_ref()).downcast_ref::<D>()
    }

    /// Current resolution and display mode
    pub const fn screen(&self) -> &Screen {
        &self.screen
    }

    /// The configuration the engine was started with
    pub const fn config(&self) -> &ApplicationConfig {
        &self.config
    }

    /// Get the current frame delta time
    pub fn delta_time(&self) -> f32 {
        self.timer.delta_time()
    }

    /// Ticks run so far
    pub fn frame_count(&self) -> u64 {
        self.timer.frame_count()
    }
}

fn device_any(device: &dyn RenderDevice) -> &dyn Any {
    device.as_any()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::TimingConfig;
    use crate::ecs::components::Camera;
    use crate::foundation::color::Color;
    use crate::render::RecordingDevice;

    #[derive(Default)]
    struct Counting {
        updates: u32,
        cleaned_up: bool,
        close_after: Option<u32>,
    }

    impl Application for Counting {
        fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
            let scene = engine.world.create_scene("main");
            let camera = engine.world.create_game_object(scene, "camera")?;
            engine
                .world
                .add_component(camera, Camera::default().with_clear_color(Color::RED))?;
            engine.world.load_scene(scene)?;
            Ok(())
        }

        fn update(&mut self, engine: &mut Engine, _frame: &FrameContext) -> Result<(), AppError> {
            self.updates += 1;
            if self.close_after == Some(self.updates) {
                self.handle_event(engine, AppEvent::WindowCloseRequested)?;
            }
            Ok(())
        }

        fn cleanup(&mut self, engine: &mut Engine) {
            self.cleaned_up = true;
            let device = engine.device_as::<RecordingDevice>().unwrap();
            assert_eq!(device.clears().len(), usize::try_from(self.updates).unwrap());
            assert!(device.clears().iter().all(|&color| color == Color::RED));
        }
    }

    fn config(frames: u64) -> ApplicationConfig {
        ApplicationConfig::new("test").with_timing(TimingConfig::new().with_max_frames(frames))
    }

    #[test]
    fn test_run_stops_at_frame_limit() {
        let mut app = Counting::default();
        Engine::run(config(5), Box::new(RecordingDevice::default()), &mut app).unwrap();
        assert_eq!(app.updates, 5);
        assert!(app.cleaned_up);
    }

    #[test]
    fn test_close_request_stops_loop() {
        let mut app = Counting {
            close_after: Some(2),
            ..Counting::default()
        };
        Engine::run(config(100), Box::new(RecordingDevice::default()), &mut app).unwrap();
        assert_eq!(app.updates, 2);
    }

    #[test]
    fn test_fixed_timestep_frame_context() {
        let mut engine = Engine::new(config(1), Box::new(RecordingDevice::default())).unwrap();
        let mut app = Counting::default();
        let first = engine.tick(&mut app).unwrap();
        let second = engine.tick(&mut app).unwrap();
        approx::assert_relative_eq!(first.delta_time, 1.0 / 60.0);
        approx::assert_relative_eq!(second.total_time, 2.0 / 60.0);
    }

    #[test]
    fn test_empty_world_clears_to_background() {
        let mut engine = Engine::new(config(1), Box::new(RecordingDevice::default())).unwrap();
        engine.tick(&mut Counting::default()).unwrap();
        let device = engine.device_as::<RecordingDevice>().unwrap();
        assert_eq!(device.clears(), vec![Color::BLACK]);
    }

    #[test]
    fn test_resize_updates_viewport() {
        let mut engine = Engine::new(config(1), Box::new(RecordingDevice::default())).unwrap();
        engine
            .handle_event(AppEvent::WindowResized { width: 640, height: 480 })
            .unwrap();
        assert_eq!(engine.screen().resolution(), (640, 480));
        assert_eq!(engine.device().viewport(), Viewport::new(640, 480));
        assert!(engine.set_resolution(0, 480).is_err());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = config(1);
        config.window.width = 0;
        assert!(matches!(
            Engine::new(config, Box::new(RecordingDevice::default())),
            Err(EngineError::Config(ConfigError::Invalid(_)))
        ));
    }

    #[test]
    fn test_application_errors_surface() {
        struct Failing;
        impl Application for Failing {
            fn initialize(&mut self, _engine: &mut Engine) -> Result<(), AppError> {
                Err(AppError::Custom("boom".to_string()))
            }
            fn update(&mut self, _engine: &mut Engine, _frame: &FrameContext) -> Result<(), AppError> {
                Ok(())
            }
            fn cleanup(&mut self, _engine: &mut Engine) {}
        }
        let result = Engine::run(config(1), Box::new(RecordingDevice::default()), &mut Failing);
        assert!(matches!(result, Err(EngineError::Application(_))));
    }
}

//! Headless demo
//!
//! Builds a small level with a floating crate, a main camera and a HUD
//! overlay on a stacked scene manager, runs a fixed number of frames
//! against a recording device and reports what was drawn.

use std::rc::Rc;

use log::{info, warn};
use olive_engine::prelude::*;

const CRATE_OBJ: &str = "\
o crate
v -0.5 -0.5 -0.5
v  0.5 -0.5 -0.5
v  0.5  0.5 -0.5
v -0.5  0.5 -0.5
v -0.5 -0.5  0.5
v  0.5 -0.5  0.5
v  0.5  0.5  0.5
v -0.5  0.5  0.5
f 1 2 3 4
f 5 8 7 6
f 1 5 6 2
f 2 6 7 3
f 3 7 8 4
f 5 1 4 8
";

/// Bobs its entity up and down around the starting height
struct Float {
    amplitude: f32,
    speed: f32,
    base: Vec3,
}

impl Behavior for Float {
    fn start(&mut self, cx: &mut BehaviorContext<'_>) -> EngineResult<()> {
        self.base = cx.transform()?.position()?;
        Ok(())
    }

    fn update(&mut self, cx: &mut BehaviorContext<'_>, frame: &FrameContext) -> EngineResult<()> {
        let offset = (frame.total_time * self.speed).sin() * self.amplitude;
        cx.transform_mut()?
            .set_position(self.base + direction::up() * offset)
    }
}

olive_engine::behavior_component!(Float);

/// The main level: camera, floor and a floating crate
struct Level;

impl SceneLogic for Level {
    fn load_content(&mut self, cx: &mut SceneContext<'_>) -> EngineResult<()> {
        cx.world.content_mut().insert_source("crate.obj", CRATE_OBJ);
        cx.world.content_mut().load::<Model>("crate.obj")?;
        Ok(())
    }

    fn initialize(&mut self, cx: &mut SceneContext<'_>) -> EngineResult<()> {
        let camera = cx.create_game_object("Main Camera")?;
        cx.world.add_component(camera, Camera::new().with_clear_color(Color::CORNFLOWER_BLUE))?;
        cx.world.add_tag(camera, MAIN_CAMERA_TAG)?;
        let mut transform = cx.world.transform_mut(camera)?;
        transform.set_position(Vec3::new(0.0, 2.0, 6.0))?;
        transform.look_at(Vec3::zeros())?;

        let model = cx.world.content_mut().load::<Model>("crate.obj")?;
        let crate_entity = cx.create_game_object("Crate")?;
        cx.world.add_renderer(crate_entity, ModelRenderer::new(Rc::clone(&model)))?;
        cx.world.add_component(
            crate_entity,
            Float {
                amplitude: 0.25,
                speed: 2.0,
                base: Vec3::zeros(),
            },
        )?;
        cx.world.start_coroutine(crate_entity, spin_every(10, 45.0))?;

        let floor = cx.create_game_object("Floor")?;
        cx.world.add_renderer(floor, ModelRenderer::new(Rc::new(Model::cube("floor", 4.0))))?;
        let mut transform = cx.world.transform_mut(floor)?;
        transform.set_local_position(Vec3::new(0.0, -4.5, 0.0))?;
        transform.set_local_scale(Vec3::new(1.0, 0.1, 1.0))?;
        Ok(())
    }
}

/// Turns the entity `degrees` about up after every `ticks` ticks, forever
fn spin_every(ticks: u32, degrees: f32) -> impl Routine {
    let mut waiting = false;
    from_fn(move |cx| {
        if waiting {
            let entity = cx.entity();
            cx.world.transform_mut(entity)?.rotate_axis(direction::up(), degrees)?;
        }
        waiting = true;
        Ok(Step::call(WaitTicks::new(ticks)))
    })
}

/// Overlay with a single marker drawn through the level's main camera
struct Hud;

impl SceneLogic for Hud {
    fn initialize(&mut self, cx: &mut SceneContext<'_>) -> EngineResult<()> {
        let marker = cx.create_game_object("Marker")?;
        cx.world.add_renderer(marker, ModelRenderer::new(Rc::new(Model::cube("marker", 0.1))))?;
        cx.world.transform_mut(marker)?.set_position(Vec3::new(-2.0, 1.5, 0.0))
    }
}

#[derive(Default)]
struct DemoApp {
    hud: Option<SceneId>,
}

impl Application for DemoApp {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        let world = engine.world_mut();
        let level = world.create_scene_with("Level", Level);
        let hud = world.create_scene_with("HUD", Hud);
        world.push_scene(level)?;
        world.push_scene(hud)?;
        self.hud = Some(hud);
        info!("Loaded {} scene(s)", world.loaded_scenes().len());
        Ok(())
    }

    fn update(&mut self, engine: &mut Engine, _frame: &FrameContext) -> Result<(), AppError> {
        if engine.frame_count() == 60 {
            if let Some(hud) = self.hud.take() {
                let popped = engine.world_mut().pop_scene();
                if popped != Some(hud) {
                    return Err(AppError::Custom("HUD was not on top of the stack".to_string()));
                }
                info!("HUD closed at frame {}", engine.frame_count());
            }
        }
        Ok(())
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        let world = engine.world();
        if let Some(entity) = world
            .loaded_scenes()
            .first()
            .and_then(|&level| world.find_game_object(level, "Crate").ok().flatten())
        {
            if let Ok(position) = world.transform(entity).and_then(|transform| transform.position()) {
                info!("Crate ended at {position:?}");
            }
        }

        match engine.device_as::<RecordingDevice>() {
            Some(device) => info!(
                "Recorded {} clear(s) and {} model draw(s) over {} frame(s)",
                device.clears().len(),
                device.drawn_models().len(),
                engine.frame_count()
            ),
            None => warn!("Demo expected a recording device"),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ApplicationConfig::new("Olive Demo")
        .with_timing(TimingConfig::new().with_max_frames(120))
        .with_engine(
            EngineConfig::new()
                .with_log_level("info")
                .with_scene_manager(SceneManagerKind::Stacked),
        );

    let mut app = DemoApp::default();
    Engine::run(config, Box::new(RecordingDevice::new(1280, 720)), &mut app)?;
    info!("Demo finished");
    Ok(())
}

//! Camera resolution and frame clearing

use std::cell::Cell;
use std::rc::Rc;

use crate::ecs::components::{Camera, MAIN_CAMERA_TAG};
use crate::ecs::World;
use crate::foundation::collections::{EntityId, SceneId};
use crate::foundation::color::Color;
use crate::foundation::math::Vec3;
use crate::foundation::time::FrameContext;
use crate::engine::EngineResult;
use crate::render::{DrawCommand, Model, ModelRenderer, RecordingDevice, RenderContext, RenderDevice, Renderer};
use crate::scene::SceneManagerKind;
use approx::assert_relative_eq;

const FRAME: FrameContext = FrameContext::new(0.1, 0.0);

fn with_model(world: &mut World, scene: SceneId, model: &str) -> EntityId {
    let entity = world.create_game_object(scene, model).unwrap();
    world
        .add_component(entity, ModelRenderer::new(Rc::new(Model::cube(model, 0.5))))
        .unwrap();
    entity
}

fn with_camera(world: &mut World, scene: SceneId, color: Color) -> EntityId {
    let entity = world.create_game_object(scene, "camera").unwrap();
    world
        .add_component(entity, Camera::new().with_clear_color(color))
        .unwrap();
    entity
}

#[test]
fn test_nothing_drawn_clears_to_background() {
    let mut world = World::new();
    world.set_background(Color::RED);
    let scene = world.create_scene("dark");
    with_model(&mut world, scene, "unseen");
    world.load_scene(scene).unwrap();
    let mut device = RecordingDevice::default();

    assert!(!world.draw(&FRAME, &mut device).unwrap());
    assert_eq!(device.clears(), vec![Color::RED]);
    assert!(device.drawn_models().is_empty());
}

#[test]
fn test_scene_camera_clears_and_draws() {
    let mut world = World::new();
    let scene = world.create_scene("lit");
    with_camera(&mut world, scene, Color::BLUE);
    with_model(&mut world, scene, "crate");
    world.load_scene(scene).unwrap();
    let mut device = RecordingDevice::default();

    assert!(world.draw(&FRAME, &mut device).unwrap());
    assert_eq!(device.clears(), vec![Color::BLUE]);
    assert_eq!(device.drawn_models(), vec!["crate"]);
    assert!(matches!(device.commands()[0], DrawCommand::Clear(_)));
}

#[test]
fn test_first_drawing_scene_clears_once() {
    let mut world = World::new();
    let first = world.create_scene("first");
    let second = world.create_scene("second");
    with_camera(&mut world, first, Color::GREEN);
    with_model(&mut world, first, "tree");
    with_camera(&mut world, second, Color::YELLOW);
    with_model(&mut world, second, "rock");
    world.load_scene(first).unwrap();
    world.load_scene(second).unwrap();
    let mut device = RecordingDevice::default();

    world.draw(&FRAME, &mut device).unwrap();

    assert_eq!(device.clears(), vec![Color::GREEN]);
    assert_eq!(device.drawn_models(), vec!["tree", "rock"]);
}

#[test]
fn test_main_camera_wins_across_scenes() {
    let mut world = World::new();
    let hud = world.create_scene("hud");
    let level = world.create_scene("level");
    let own = with_camera(&mut world, hud, Color::GREEN);
    with_model(&mut world, hud, "panel");
    let main = with_camera(&mut world, level, Color::WHITE);
    world.add_tag(main, MAIN_CAMERA_TAG).unwrap();
    with_model(&mut world, level, "terrain");
    world.load_scene(hud).unwrap();
    world.load_scene(level).unwrap();
    let main_camera = world.find_component::<Camera>(main).unwrap();

    assert_eq!(world.main_camera().unwrap(), main_camera);
    assert_eq!(world.resolve_camera(hud).unwrap(), main_camera);

    let mut device = RecordingDevice::default();
    world.draw(&FRAME, &mut device).unwrap();
    assert_eq!(device.clears(), vec![Color::WHITE]);
    assert_eq!(device.drawn_models(), vec!["panel", "terrain"]);

    world.set_active(main, false).unwrap();
    assert_eq!(
        world.resolve_camera(hud).unwrap(),
        world.find_component::<Camera>(own).unwrap()
    );
    assert_eq!(world.resolve_camera(level).unwrap(), None);
}

#[test]
fn test_inactive_objects_are_skipped() {
    let mut world = World::new();
    let scene = world.create_scene("partial");
    with_camera(&mut world, scene, Color::BLUE);
    let hidden = with_model(&mut world, scene, "hidden");
    with_model(&mut world, scene, "shown");
    world.set_active(hidden, false).unwrap();
    world.load_scene(scene).unwrap();
    let mut device = RecordingDevice::default();

    world.draw(&FRAME, &mut device).unwrap();

    assert_eq!(device.drawn_models(), vec!["shown"]);
}

#[test]
fn test_post_render_skips_inactive_objects() {
    /// Counts post-render calls, draws nothing
    struct Afterglow(Rc<Cell<u32>>);

    impl Renderer for Afterglow {
        fn render(&self, _cx: &RenderContext<'_>, _device: &mut dyn RenderDevice) -> EngineResult<()> {
            Ok(())
        }

        fn post_render(&mut self, _frame: &FrameContext) -> EngineResult<()> {
            self.0.set(self.0.get() + 1);
            Ok(())
        }
    }

    let shown_calls = Rc::new(Cell::new(0));
    let hidden_calls = Rc::new(Cell::new(0));
    let mut world = World::new();
    let scene = world.create_scene("glow");
    let parent = world.create_game_object(scene, "parent").unwrap();
    let hidden = world.create_game_object(scene, "hidden").unwrap();
    world.transform_mut(hidden).unwrap().set_parent(Some(parent)).unwrap();
    let shown = world.create_game_object(scene, "shown").unwrap();
    world.add_renderer(hidden, Afterglow(Rc::clone(&hidden_calls))).unwrap();
    world.add_renderer(shown, Afterglow(Rc::clone(&shown_calls))).unwrap();
    world.set_active(parent, false).unwrap();
    world.load_scene(scene).unwrap();

    world.post_render(&FRAME).unwrap();

    assert_eq!(shown_calls.get(), 1);
    assert_eq!(hidden_calls.get(), 0);
}

#[test]
fn test_stacked_draws_every_layer_bottom_to_top() {
    let mut world = World::with_scene_manager(SceneManagerKind::Stacked);
    let menu = world.create_scene("menu");
    let pause = world.create_scene("pause");
    with_camera(&mut world, menu, Color::BLACK);
    with_model(&mut world, menu, "menu");
    with_camera(&mut world, pause, Color::BLACK);
    with_model(&mut world, pause, "pause");
    world.push_scene(menu).unwrap();
    world.push_scene(pause).unwrap();

    let mut device = RecordingDevice::default();
    world.draw(&FRAME, &mut device).unwrap();
    assert_eq!(device.drawn_models(), vec!["menu", "pause"]);

    world.pop_scene();
    let mut device = RecordingDevice::default();
    world.draw(&FRAME, &mut device).unwrap();
    assert_eq!(device.drawn_models(), vec!["menu"]);
}

#[test]
fn test_scene_transform_offsets_world_matrix() {
    let mut world = World::new();
    let scene = world.create_scene("offset");
    with_camera(&mut world, scene, Color::BLACK);
    let entity = with_model(&mut world, scene, "crate");
    world
        .transform_mut(entity)
        .unwrap()
        .set_position(Vec3::new(1.0, 0.0, 0.0))
        .unwrap();
    world.scene_transform_mut(scene).unwrap().position = Vec3::new(0.0, 5.0, 0.0);
    world.load_scene(scene).unwrap();
    let mut device = RecordingDevice::default();

    world.draw(&FRAME, &mut device).unwrap();

    let Some(DrawCommand::Model { transforms, .. }) = device.commands().get(1) else {
        panic!("expected a model draw after the clear");
    };
    assert_relative_eq!(transforms.world[(0, 3)], 1.0);
    assert_relative_eq!(transforms.world[(1, 3)], 5.0);
    let bounds = world.renderer_bounds(entity).unwrap().unwrap();
    assert_relative_eq!(bounds.center(), Vec3::new(1.0, 5.0, 0.0));
}

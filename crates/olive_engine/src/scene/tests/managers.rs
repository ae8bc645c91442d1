//! Scene manager strategies driven through the world

use std::cell::RefCell;
use std::rc::Rc;

use crate::ecs::World;
use crate::engine::{EngineError, EngineResult};
use crate::foundation::collections::SceneId;
use crate::foundation::time::FrameContext;
use crate::scene::{SceneContext, SceneLoadMode, SceneLogic, SceneManagerKind};

const FRAME: FrameContext = FrameContext::new(0.1, 0.0);

type Visits = Rc<RefCell<Vec<&'static str>>>;

/// Logs its name every update
struct Visited {
    name: &'static str,
    visits: Visits,
}

impl SceneLogic for Visited {
    fn update(&mut self, _cx: &mut SceneContext<'_>, _frame: &FrameContext) -> EngineResult<()> {
        self.visits.borrow_mut().push(self.name);
        Ok(())
    }
}

fn visited(world: &mut World, name: &'static str, visits: &Visits) -> SceneId {
    world.create_scene_with(
        name,
        Visited {
            name,
            visits: Rc::clone(visits),
        },
    )
}

fn is_invalid_operation(result: EngineResult<()>, message: &str) -> bool {
    matches!(result, Err(EngineError::InvalidOperation(text)) if text == message)
}

#[test]
fn test_additive_load_twice_fails() {
    let mut world = World::with_scene_manager(SceneManagerKind::Additive);
    let scene = world.create_scene("a");

    world.load_scene(scene).unwrap();
    assert!(is_invalid_operation(world.load_scene(scene), "Scene is already loaded."));
    assert_eq!(world.loaded_scenes(), vec![scene]);

    world.unload_scene(scene).unwrap();
    assert!(world.loaded_scenes().is_empty());
    assert!(is_invalid_operation(
        world.unload_scene(scene),
        "Specified scene is not loaded by this manager."
    ));
}

#[test]
fn test_additive_updates_in_load_order() {
    let visits: Visits = Rc::default();
    let mut world = World::new();
    let a = visited(&mut world, "a", &visits);
    let b = visited(&mut world, "b", &visits);
    world.load_scene(b).unwrap();
    world.load_scene(a).unwrap();

    world.update(&FRAME).unwrap();

    assert_eq!(*visits.borrow(), vec!["b", "a"]);
    assert_eq!(world.pop_scene(), Some(a));
    assert_eq!(world.loaded_scenes(), vec![b]);
}

#[test]
fn test_simple_replaces_and_resets_to_placeholder() {
    let visits: Visits = Rc::default();
    let mut world = World::with_scene_manager(SceneManagerKind::Simple);
    let placeholder = world.placeholder_scene();
    let a = visited(&mut world, "a", &visits);
    let b = visited(&mut world, "b", &visits);
    assert_eq!(world.scene_manager().active_scenes(), vec![placeholder]);
    assert!(world.loaded_scenes().is_empty());

    world.load_scene(a).unwrap();
    world.load_scene(b).unwrap();
    world.update(&FRAME).unwrap();
    assert_eq!(*visits.borrow(), vec!["b"]);
    assert!(!world.is_scene_loaded(a));

    assert_eq!(world.pop_scene(), Some(b));
    assert_eq!(world.scene_manager().active_scenes(), vec![placeholder]);
    assert_eq!(world.pop_scene(), None);
}

#[test]
fn test_stacked_push_push_pop() {
    let visits: Visits = Rc::default();
    let mut world = World::with_scene_manager(SceneManagerKind::Stacked);
    let placeholder = world.placeholder_scene();
    let a = visited(&mut world, "a", &visits);
    let b = visited(&mut world, "b", &visits);

    world.push_scene(a).unwrap();
    world.push_scene(b).unwrap();
    assert!(world.is_scene_initialized(b).unwrap());
    assert!(is_invalid_operation(world.push_scene(a), "Scene is already loaded."));

    assert_eq!(world.pop_scene(), Some(b));
    assert_eq!(world.scene_manager().primary_scene(), Some(a));
    assert_eq!(world.scene_manager().active_scenes(), vec![placeholder, a]);

    world.update(&FRAME).unwrap();
    assert_eq!(*visits.borrow(), vec!["a"]);

    assert_eq!(world.pop_scene(), Some(a));
    assert_eq!(world.pop_scene(), None);
    assert_eq!(world.scene_manager().active_scenes(), vec![placeholder]);
}

#[test]
fn test_single_mode_unloads_everything_first() {
    let mut world = World::new();
    let a = world.create_scene("a");
    let b = world.create_scene("b");
    let c = world.create_scene("c");
    world.load_scene(a).unwrap();
    world.load_scene(b).unwrap();

    world.load_scene_with_mode(c, SceneLoadMode::Single).unwrap();

    assert_eq!(world.loaded_scenes(), vec![c]);
    assert!(world.is_scene_loaded(c));
    assert!(!world.is_scene_loaded(a));
}

#[test]
fn test_failed_load_restores_active_set() {
    struct Broken;

    impl SceneLogic for Broken {
        fn initialize(&mut self, _cx: &mut SceneContext<'_>) -> EngineResult<()> {
            Err(EngineError::InvalidOperation("missing level data".to_string()))
        }
    }

    let mut world = World::new();
    let good = world.create_scene("good");
    let broken = world.create_scene_with("broken", Broken);
    world.load_scene(good).unwrap();

    assert!(world.load_scene_with_mode(broken, SceneLoadMode::Single).is_err());
    assert_eq!(world.loaded_scenes(), vec![good]);
}

#[test]
fn test_load_after_failed_initialize_runs_it_again() {
    /// Builds its player, then fails the first attempt
    struct Flaky {
        attempts: Rc<RefCell<u32>>,
    }

    impl SceneLogic for Flaky {
        fn initialize(&mut self, cx: &mut SceneContext<'_>) -> EngineResult<()> {
            *self.attempts.borrow_mut() += 1;
            cx.create_game_object("player")?;
            if *self.attempts.borrow() == 1 {
                return Err(EngineError::InvalidOperation("level data not ready".to_string()));
            }
            Ok(())
        }
    }

    let attempts = Rc::new(RefCell::new(0));
    let mut world = World::new();
    let scene = world.create_scene_with(
        "flaky",
        Flaky {
            attempts: Rc::clone(&attempts),
        },
    );

    assert!(world.load_scene(scene).is_err());
    assert!(!world.is_scene_loaded(scene));
    assert!(!world.is_scene_initialized(scene).unwrap());
    assert!(world.game_objects(scene).unwrap().is_empty());
    assert_eq!(world.live_game_object_count(), 0);

    world.load_scene(scene).unwrap();
    assert_eq!(*attempts.borrow(), 2);
    assert!(world.is_scene_initialized(scene).unwrap());
    assert_eq!(world.game_objects(scene).unwrap().len(), 1);
    assert!(world.find_game_object(scene, "player").unwrap().is_some());
}

#[test]
fn test_placeholder_cannot_be_loaded_or_unloaded() {
    let mut world = World::with_scene_manager(SceneManagerKind::Stacked);
    let placeholder = world.placeholder_scene();

    assert!(world.load_scene(placeholder).is_err());
    assert!(world.push_scene(placeholder).is_err());
    assert!(world.unload_scene(placeholder).is_err());
    assert_eq!(world.scene_manager().active_scenes(), vec![placeholder]);
}

#[test]
fn test_switching_strategy_starts_empty() {
    let mut world = World::new();
    let scene = world.create_scene("a");
    world.load_scene(scene).unwrap();

    world.set_scene_manager(SceneManagerKind::Stacked);

    assert_eq!(world.scene_manager().kind(), SceneManagerKind::Stacked);
    assert!(world.loaded_scenes().is_empty());
    assert!(world.is_scene_initialized(scene).unwrap());
}

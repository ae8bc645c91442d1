//! Behavior lifecycle scenarios

use std::cell::RefCell;
use std::rc::Rc;

use crate::ecs::components::{Behavior, BehaviorContext};
use crate::ecs::coroutine::from_fn;
use crate::ecs::{Capabilities, Step, World};
use crate::engine::{EngineError, EngineResult};
use crate::foundation::collections::{EntityId, SceneId};
use crate::foundation::math::Vec3;
use crate::foundation::time::FrameContext;
use approx::assert_relative_eq;

type Log = Rc<RefCell<Vec<String>>>;

const FRAME: FrameContext = FrameContext::new(0.5, 0.0);

/// Records every hook it receives
struct Recorder {
    label: &'static str,
    log: Log,
}

impl Recorder {
    fn new(label: &'static str, log: &Log) -> Self {
        Self {
            label,
            log: Rc::clone(log),
        }
    }

    fn record(&self, hook: &str) {
        self.log.borrow_mut().push(format!("{hook} {}", self.label));
    }
}

impl Behavior for Recorder {
    fn initialize(&mut self, _cx: &mut BehaviorContext<'_>) -> EngineResult<()> {
        self.record("initialize");
        Ok(())
    }

    fn start(&mut self, _cx: &mut BehaviorContext<'_>) -> EngineResult<()> {
        self.record("start");
        Ok(())
    }

    fn update(&mut self, _cx: &mut BehaviorContext<'_>, _frame: &FrameContext) -> EngineResult<()> {
        self.record("update");
        Ok(())
    }
}

#[derive(Debug)]
struct Speed(f32);

crate::data_component!(Speed);

/// Notes at attach time whether a `Speed` sibling exists
struct SiblingCheck {
    saw_speed: bool,
}

impl Behavior for SiblingCheck {
    fn initialize(&mut self, cx: &mut BehaviorContext<'_>) -> EngineResult<()> {
        self.saw_speed = cx.get_component::<Speed>()?.is_some();
        Ok(())
    }
}

/// Moves along +X by its sibling `Speed` every tick
struct Mover;

impl Behavior for Mover {
    fn update(&mut self, cx: &mut BehaviorContext<'_>, frame: &FrameContext) -> EngineResult<()> {
        let speed = cx.get_component::<Speed>()?.map_or(0.0, |speed| speed.0);
        cx.transform_mut()?.translate(Vec3::new(speed * frame.delta_time, 0.0, 0.0))
    }
}

fn loaded_scene() -> (World, SceneId) {
    let mut world = World::new();
    let scene = world.create_scene("behaviors");
    world.load_scene(scene).unwrap();
    (world, scene)
}

fn log_of(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

#[test]
fn test_behavior_attached_as_component_runs_its_hooks() {
    struct Counter(u32);

    impl Behavior for Counter {
        fn initialize(&mut self, _cx: &mut BehaviorContext<'_>) -> EngineResult<()> {
            self.0 += 100;
            Ok(())
        }

        fn update(&mut self, _cx: &mut BehaviorContext<'_>, _frame: &FrameContext) -> EngineResult<()> {
            self.0 += 1;
            Ok(())
        }
    }

    crate::behavior_component!(Counter);

    let (mut world, scene) = loaded_scene();
    let entity = world.create_game_object(scene, "counter").unwrap();
    let id = world.add_component(entity, Counter(0)).unwrap();
    assert_eq!(world.component_as::<Counter>(id).unwrap().0, 100);

    world.update(&FRAME).unwrap();
    world.update(&FRAME).unwrap();

    assert_eq!(world.component_as::<Counter>(id).unwrap().0, 102);
    assert_eq!(world.components_with(entity, Capabilities::BEHAVIOR).unwrap(), vec![id]);
}

#[test]
fn test_initialize_sees_only_earlier_siblings() {
    let (mut world, scene) = loaded_scene();
    let entity = world.create_game_object(scene, "observer").unwrap();

    let before = world.add_behavior(entity, SiblingCheck { saw_speed: false }).unwrap();
    world.add_component(entity, Speed(2.0)).unwrap();
    let after = world.add_behavior(entity, SiblingCheck { saw_speed: false }).unwrap();

    assert!(!world.component_as::<SiblingCheck>(before).unwrap().saw_speed);
    assert!(world.component_as::<SiblingCheck>(after).unwrap().saw_speed);
}

#[test]
fn test_hooks_run_in_lifecycle_order() {
    let log: Log = Rc::default();
    let mut world = World::new();
    let scene = world.create_scene("ordered");
    let entity = world.create_game_object(scene, "actor").unwrap();
    world.add_behavior(entity, Recorder::new("a", &log)).unwrap();
    world.add_behavior(entity, Recorder::new("b", &log)).unwrap();

    world.load_scene(scene).unwrap();
    world.update(&FRAME).unwrap();
    world.update(&FRAME).unwrap();

    assert_eq!(
        log_of(&log),
        vec![
            "initialize a",
            "initialize b",
            "start a",
            "start b",
            "update a",
            "update b",
            "update a",
            "update b",
        ]
    );
}

#[test]
fn test_behavior_added_to_running_scene_starts_before_first_update() {
    let log: Log = Rc::default();
    let (mut world, scene) = loaded_scene();
    let entity = world.create_game_object(scene, "late").unwrap();
    world.add_behavior(entity, Recorder::new("late", &log)).unwrap();

    world.update(&FRAME).unwrap();
    world.update(&FRAME).unwrap();

    assert_eq!(
        log_of(&log),
        vec!["initialize late", "start late", "update late", "update late"]
    );
}

#[test]
fn test_inactive_hierarchy_is_not_updated() {
    let log: Log = Rc::default();
    let (mut world, scene) = loaded_scene();
    let parent = world.create_game_object(scene, "parent").unwrap();
    let child = world.create_game_object(scene, "child").unwrap();
    world.transform_mut(child).unwrap().set_parent(Some(parent)).unwrap();
    world.add_behavior(child, Recorder::new("child", &log)).unwrap();

    world.set_active(parent, false).unwrap();
    world.update(&FRAME).unwrap();
    assert_eq!(log_of(&log), vec!["initialize child"]);

    world.set_active(parent, true).unwrap();
    world.update(&FRAME).unwrap();
    assert_eq!(
        log_of(&log),
        vec!["initialize child", "start child", "update child"]
    );
}

#[test]
fn test_failed_initialize_leaves_entity_unchanged() {
    struct Refuses;

    impl Behavior for Refuses {
        fn initialize(&mut self, _cx: &mut BehaviorContext<'_>) -> EngineResult<()> {
            Err(EngineError::InvalidOperation("not today".to_string()))
        }
    }

    let (mut world, scene) = loaded_scene();
    let entity = world.create_game_object(scene, "picky").unwrap();

    assert!(matches!(
        world.add_behavior(entity, Refuses),
        Err(EngineError::InvalidOperation(_))
    ));
    assert_eq!(world.components(entity).unwrap().len(), 1);
    assert_eq!(world.live_component_count(), 1);
}

#[test]
fn test_behavior_is_hidden_from_its_own_lookups() {
    struct SelfLookup {
        found_self: Option<bool>,
    }

    impl Behavior for SelfLookup {
        fn initialize(&mut self, cx: &mut BehaviorContext<'_>) -> EngineResult<()> {
            self.found_self = Some(cx.get_component::<Self>()?.is_some());
            Ok(())
        }
    }

    let (mut world, scene) = loaded_scene();
    let entity = world.create_game_object(scene, "mirror").unwrap();
    let id = world.add_behavior(entity, SelfLookup { found_self: None }).unwrap();

    assert_eq!(world.component_as::<SelfLookup>(id).unwrap().found_self, Some(false));
    assert_eq!(world.find_component::<SelfLookup>(entity).unwrap(), Some(id));
}

#[test]
fn test_mover_uses_sibling_data_and_frame_delta() {
    let (mut world, scene) = loaded_scene();
    let entity = world.create_game_object(scene, "mover").unwrap();
    world.add_component(entity, Speed(4.0)).unwrap();
    world.add_behavior(entity, Mover).unwrap();

    world.update(&FRAME).unwrap();
    world.update(&FRAME).unwrap();

    assert_relative_eq!(
        world.transform(entity).unwrap().position().unwrap(),
        Vec3::new(4.0, 0.0, 0.0)
    );
}

#[test]
fn test_behavior_can_dispose_its_own_entity() {
    struct SelfDestruct;

    impl Behavior for SelfDestruct {
        fn update(&mut self, cx: &mut BehaviorContext<'_>, _frame: &FrameContext) -> EngineResult<()> {
            let entity = cx.entity();
            cx.world.dispose_game_object(entity)
        }
    }

    let log: Log = Rc::default();
    let (mut world, scene) = loaded_scene();
    let doomed = world.create_game_object(scene, "doomed").unwrap();
    world.add_behavior(doomed, SelfDestruct).unwrap();
    world.add_behavior(doomed, Recorder::new("after", &log)).unwrap();
    let survivor = world.create_game_object(scene, "survivor").unwrap();
    world.add_behavior(survivor, Recorder::new("survivor", &log)).unwrap();

    world.update(&FRAME).unwrap();

    assert!(!world.is_game_object_alive(doomed));
    assert_eq!(world.game_objects(scene).unwrap(), &[survivor]);
    assert_eq!(
        log_of(&log),
        vec![
            "initialize after",
            "initialize survivor",
            "start survivor",
            "update survivor",
        ]
    );
}

#[test]
fn test_behavior_coroutine_runs_after_behaviors_each_tick() {
    struct Spawner {
        log: Log,
    }

    impl Behavior for Spawner {
        fn start(&mut self, cx: &mut BehaviorContext<'_>) -> EngineResult<()> {
            let log = Rc::clone(&self.log);
            let mut remaining = 2;
            cx.start_coroutine(from_fn(move |_cx| {
                if remaining == 0 {
                    return Ok(Step::Done);
                }
                remaining -= 1;
                log.borrow_mut().push("routine".to_string());
                Ok(Step::Wait)
            }))?;
            Ok(())
        }

        fn update(&mut self, _cx: &mut BehaviorContext<'_>, _frame: &FrameContext) -> EngineResult<()> {
            self.log.borrow_mut().push("update".to_string());
            Ok(())
        }
    }

    let log: Log = Rc::default();
    let (mut world, scene) = loaded_scene();
    let entity: EntityId = world.create_game_object(scene, "spawner").unwrap();
    world.add_behavior(entity, Spawner { log: Rc::clone(&log) }).unwrap();

    for _ in 0..4 {
        world.update(&FRAME).unwrap();
    }

    assert_eq!(
        log_of(&log),
        vec!["update", "routine", "update", "routine", "update", "update"]
    );
    assert!(world.running_coroutines(entity).unwrap().is_empty());
}

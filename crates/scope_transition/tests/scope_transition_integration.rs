//! Scope transition integration test
//!
//! Headless App: rig входит в зону, dwell, commit / abort.
//!
//! Проверяем:
//! - commit не раньше dwell'а
//! - abort при выходе из bounds
//! - один dwell task на зону
//! - Locked терминален
//! - commit failure: locked=false, ровно одна диагностика, без паники

use bevy::prelude::*;
use bevy_rapier3d::prelude::CollisionEvent;
use bevy_rapier3d::rapier::geometry::CollisionEventFlags;
use std::time::Duration;

use scope_transition::layers::{LAYER_MACRO, LAYER_MICRO};
use scope_transition::*;

const FRAME: Duration = Duration::from_millis(100);
const DWELL: Duration = Duration::from_millis(500);
const SURFACE_TEXTURE: TextureId = TextureId(7);

/// Все ScopeTransitionEvent с timestamp'ом frame'а
#[derive(Resource, Default)]
struct Recorded(Vec<(Duration, ScopeTransitionEvent)>);

fn record_outcomes(
    mut outcomes: EventReader<ScopeTransitionEvent>,
    time: Res<Time>,
    mut recorded: ResMut<Recorded>,
) {
    for outcome in outcomes.read() {
        recorded.0.push((time.elapsed(), outcome.clone()));
    }
}

struct Scene {
    rig: Entity,
    zone: Entity,
    scope_camera: Option<Entity>,
}

/// Helper: App с plugin'ом и recorder'ом
fn create_scope_app() -> App {
    let mut app = create_headless_app(FRAME);
    app.add_plugins(ScopeTransitionPlugin::default())
        .init_resource::<Recorded>()
        .add_systems(PostUpdate, record_outcomes.after(ScopeTransitionSystems));
    app
}

/// Helper: rig (внутри зоны) + surface + zone, опционально scope камера
fn spawn_scene(app: &mut App, with_scope_camera: bool) -> Scene {
    let world = app.world_mut();

    let rig = world
        .spawn((
            Name::new("HeadCamRig"),
            Transform::from_xyz(0.2, 0.0, 0.0),
            BoundingVolume::sphere_bounds(0.2),
            ViewCamera::with_mask(CullingMask(LAYER_MACRO.bit())),
        ))
        .id();
    world.spawn((
        Name::new("LockedScopePerspective"),
        RenderSurface::new(SURFACE_TEXTURE),
        ChildOf(rig),
    ));

    let scope_camera =
        with_scope_camera.then(|| world.spawn((ScopeCamera, ViewCamera::default())).id());

    let zone = world
        .spawn((
            Transform::from_xyz(0.0, 0.0, 0.0),
            BoundingVolume::cuboid(Vec3::splat(1.0)),
            ScopeZone::new(rig).with_dwell(DWELL),
        ))
        .id();

    Scene {
        rig,
        zone,
        scope_camera,
    }
}

fn enter(app: &mut App, scene: &Scene) {
    app.world_mut().send_event(ZoneOverlapBegan {
        zone: scene.zone,
        other: scene.rig,
    });
}

fn state(app: &App, zone: Entity) -> TransitionState {
    *app.world().get::<TransitionState>(zone).expect("zone has TransitionState")
}

fn recorded(app: &App) -> &[(Duration, ScopeTransitionEvent)] {
    &app.world().resource::<Recorded>().0
}

fn count(app: &App, pred: impl Fn(&ScopeTransitionEvent) -> bool) -> usize {
    recorded(app).iter().filter(|(_, event)| pred(event)).count()
}

fn run_updates(app: &mut App, n: usize) {
    for _ in 0..n {
        app.update();
    }
}

/// Test: наблюдатель стоит в зоне → Locked, камеры перевязаны
#[test]
fn test_dwell_commits_view_lock() {
    let mut app = create_scope_app();
    let scene = spawn_scene(&mut app, true);

    enter(&mut app, &scene);
    app.update();
    assert!(state(&app, scene.zone).is_transitioning());

    // 0.3s — рано
    run_updates(&mut app, 3);
    assert!(state(&app, scene.zone).is_transitioning());
    assert!(!state(&app, scene.zone).is_locked());

    run_updates(&mut app, 10);
    assert!(state(&app, scene.zone).is_locked());

    let scope_camera = scene.scope_camera.unwrap();
    let scope_view = app.world().get::<ViewCamera>(scope_camera).unwrap();
    assert_eq!(scope_view.target, ViewTarget::Texture(SURFACE_TEXTURE));

    let primary = app.world().get::<ViewCamera>(scene.rig).unwrap();
    assert!(!primary.culling_mask.contains(LAYER_MACRO));
    assert!(primary.culling_mask.contains(LAYER_MICRO));

    assert_eq!(count(&app, |e| matches!(e, ScopeTransitionEvent::Locked { .. })), 1);
}

/// Test: commit случается не раньше entry + dwell (по simulated времени)
#[test]
fn test_commit_not_before_dwell_elapsed() {
    let mut app = create_scope_app();
    let scene = spawn_scene(&mut app, true);

    enter(&mut app, &scene);
    run_updates(&mut app, 15);

    let started_at = recorded(&app)
        .iter()
        .find(|(_, e)| matches!(e, ScopeTransitionEvent::Started { .. }))
        .map(|(t, _)| *t)
        .expect("transition started");
    let locked_at = recorded(&app)
        .iter()
        .find(|(_, e)| matches!(e, ScopeTransitionEvent::Locked { .. }))
        .map(|(t, _)| *t)
        .expect("transition locked");

    assert!(locked_at >= started_at + DWELL);
}

/// Test: rig уходит из bounds посреди dwell'а → abort, без lock'а
#[test]
fn test_leaving_zone_aborts() {
    let mut app = create_scope_app();
    let scene = spawn_scene(&mut app, true);

    enter(&mut app, &scene);
    run_updates(&mut app, 2);
    assert!(state(&app, scene.zone).is_transitioning());

    // Уходим без discrete exit event
    app.world_mut()
        .get_mut::<Transform>(scene.rig)
        .unwrap()
        .translation = Vec3::new(10.0, 0.0, 0.0);
    app.update();

    assert_eq!(state(&app, scene.zone), TransitionState::Idle);
    assert_eq!(
        count(&app, |e| matches!(
            e,
            ScopeTransitionEvent::Canceled {
                reason: CancelReason::OverlapLost,
                ..
            }
        )),
        1
    );

    // Возвращаемся без нового overlap-begin — ничего не происходит
    app.world_mut()
        .get_mut::<Transform>(scene.rig)
        .unwrap()
        .translation = Vec3::ZERO;
    run_updates(&mut app, 10);
    assert!(!state(&app, scene.zone).is_locked());

    let primary = app.world().get::<ViewCamera>(scene.rig).unwrap();
    assert!(primary.culling_mask.contains(LAYER_MACRO));
}

/// Test: overlap потерян уже на первом tick'е (rig снаружи при входе)
#[test]
fn test_outside_on_entry_aborts_same_tick() {
    let mut app = create_scope_app();
    let scene = spawn_scene(&mut app, true);
    app.world_mut()
        .get_mut::<Transform>(scene.rig)
        .unwrap()
        .translation = Vec3::new(5.0, 0.0, 0.0);

    enter(&mut app, &scene);
    app.update();

    assert_eq!(state(&app, scene.zone), TransitionState::Idle);
    assert_eq!(count(&app, |e| matches!(e, ScopeTransitionEvent::Started { .. })), 1);
    assert_eq!(count(&app, |e| matches!(e, ScopeTransitionEvent::Canceled { .. })), 1);
}

/// Test: серия overlap-begin во время dwell'а → один task
#[test]
fn test_rapid_reentry_single_dwell() {
    let mut app = create_scope_app();
    let scene = spawn_scene(&mut app, true);

    // Несколько в одном frame
    enter(&mut app, &scene);
    enter(&mut app, &scene);
    enter(&mut app, &scene);
    app.update();
    let deadline = state(&app, scene.zone).dwell_timer().unwrap().deadline();

    // И по одному в следующих frame'ах
    for _ in 0..3 {
        enter(&mut app, &scene);
        app.update();
        assert_eq!(
            state(&app, scene.zone).dwell_timer().unwrap().deadline(),
            deadline
        );
    }

    assert_eq!(count(&app, |e| matches!(e, ScopeTransitionEvent::Started { .. })), 1);
}

/// Test: Locked терминален — overlap-begin больше ничего не делает
#[test]
fn test_locked_ignores_reentry() {
    let mut app = create_scope_app();
    let scene = spawn_scene(&mut app, true);

    enter(&mut app, &scene);
    run_updates(&mut app, 10);
    assert!(state(&app, scene.zone).is_locked());

    for _ in 0..5 {
        enter(&mut app, &scene);
        app.update();
        assert!(state(&app, scene.zone).is_locked());
    }

    assert_eq!(count(&app, |e| matches!(e, ScopeTransitionEvent::Started { .. })), 1);
}

/// Test: чужой объект в зоне игнорируется
#[test]
fn test_foreign_entity_ignored() {
    let mut app = create_scope_app();
    let scene = spawn_scene(&mut app, true);
    let stranger = app.world_mut().spawn(Transform::default()).id();

    app.world_mut().send_event(ZoneOverlapBegan {
        zone: scene.zone,
        other: stranger,
    });
    app.update();

    assert_eq!(state(&app, scene.zone), TransitionState::Idle);
    assert!(recorded(&app).is_empty());
}

/// Test: нет scope камеры → CommitFailed ровно один раз, locked=false
#[test]
fn test_missing_scope_camera_fails_commit_once() {
    let mut app = create_scope_app();
    let scene = spawn_scene(&mut app, false);

    enter(&mut app, &scene);
    run_updates(&mut app, 20);

    let zone_state = state(&app, scene.zone);
    assert!(!zone_state.is_locked());
    assert!(!zone_state.is_transitioning());

    let failures: Vec<_> = recorded(&app)
        .iter()
        .filter_map(|(_, e)| match e {
            ScopeTransitionEvent::CommitFailed { error, .. } => Some(error.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(failures, vec![CommitError::MissingScopeCamera]);

    // Primary камера не тронута
    let primary = app.world().get::<ViewCamera>(scene.rig).unwrap();
    assert_eq!(primary.culling_mask, CullingMask(LAYER_MACRO.bit()));
}

/// Test: внешняя отмена → Idle
#[test]
fn test_external_cancel() {
    let mut app = create_scope_app();
    let scene = spawn_scene(&mut app, true);

    enter(&mut app, &scene);
    app.update();

    app.world_mut()
        .send_event(CancelScopeTransition { zone: scene.zone });
    app.update();

    assert_eq!(state(&app, scene.zone), TransitionState::Idle);
    assert_eq!(
        count(&app, |e| matches!(
            e,
            ScopeTransitionEvent::Canceled {
                reason: CancelReason::External,
                ..
            }
        )),
        1
    );

    // Отмена в Idle — no-op
    app.world_mut()
        .send_event(CancelScopeTransition { zone: scene.zone });
    app.update();
    assert_eq!(count(&app, |e| matches!(e, ScopeTransitionEvent::Canceled { .. })), 1);
}

/// Test: Rapier CollisionEvent::Started → ZoneOverlapBegan → dwell
#[test]
fn test_rapier_sensor_event_starts_transition() {
    let mut app = create_scope_app();
    app.add_plugins(RapierSensorBridgePlugin);
    let scene = spawn_scene(&mut app, true);

    // Порядок сторон у Rapier не гарантирован
    app.world_mut().send_event(CollisionEvent::Started(
        scene.rig,
        scene.zone,
        CollisionEventFlags::SENSOR,
    ));
    app.update();
    assert!(state(&app, scene.zone).is_transitioning());

    run_updates(&mut app, 10);
    assert!(state(&app, scene.zone).is_locked());
}

/// Test: Stopped не трогает состояние
#[test]
fn test_rapier_stopped_event_ignored() {
    let mut app = create_scope_app();
    app.add_plugins(RapierSensorBridgePlugin);
    let scene = spawn_scene(&mut app, true);

    app.world_mut().send_event(CollisionEvent::Stopped(
        scene.zone,
        scene.rig,
        CollisionEventFlags::SENSOR,
    ));
    app.update();

    assert_eq!(state(&app, scene.zone), TransitionState::Idle);
}

/// Helper: перевешивает rig под tracking entity (head tracking / player body)
fn parent_rig(app: &mut App, scene: &Scene, parent_at: Vec3, local: Vec3) -> Entity {
    let world = app.world_mut();
    let tracking = world
        .spawn((Name::new("TrackingSpace"), Transform::from_translation(parent_at)))
        .id();
    world
        .entity_mut(scene.rig)
        .insert((ChildOf(tracking), Transform::from_translation(local)));
    tracking
}

/// Test: local offset rig'а внутри bounds, world позиция снаружи → abort
#[test]
fn test_parented_rig_outside_in_world_space_aborts() {
    let mut app = create_scope_app();
    let scene = spawn_scene(&mut app, true);
    parent_rig(&mut app, &scene, Vec3::new(50.0, 0.0, 0.0), Vec3::new(0.2, 0.0, 0.0));

    enter(&mut app, &scene);
    run_updates(&mut app, 10);

    assert_eq!(state(&app, scene.zone), TransitionState::Idle);
    assert_eq!(
        count(&app, |e| matches!(
            e,
            ScopeTransitionEvent::Canceled {
                reason: CancelReason::OverlapLost,
                ..
            }
        )),
        1
    );
    assert_eq!(count(&app, |e| matches!(e, ScopeTransitionEvent::Locked { .. })), 0);
}

/// Test: local offset далеко, но родитель сдвигает rig в зону → Locked
#[test]
fn test_parented_rig_inside_in_world_space_locks() {
    let mut app = create_scope_app();
    let scene = spawn_scene(&mut app, true);
    parent_rig(&mut app, &scene, Vec3::new(-50.0, 0.0, 0.0), Vec3::new(50.2, 0.0, 0.0));

    enter(&mut app, &scene);
    run_updates(&mut app, 10);

    assert!(state(&app, scene.zone).is_locked());
}

/// Test: двигаем родителя, не сам rig → dwell обрывается
#[test]
fn test_moving_tracking_parent_aborts_dwell() {
    let mut app = create_scope_app();
    let scene = spawn_scene(&mut app, true);
    let tracking = parent_rig(&mut app, &scene, Vec3::ZERO, Vec3::new(0.2, 0.0, 0.0));

    enter(&mut app, &scene);
    run_updates(&mut app, 2);
    assert!(state(&app, scene.zone).is_transitioning());

    app.world_mut()
        .get_mut::<Transform>(tracking)
        .unwrap()
        .translation = Vec3::new(10.0, 0.0, 0.0);
    app.update();

    assert_eq!(state(&app, scene.zone), TransitionState::Idle);
    assert!(!state(&app, scene.zone).is_locked());
}

/// Test: surface ищется среди children именно этого rig'а
///
/// Чужой rig с тем же именем surface'а и вложенный (не прямой) child не подходят.
#[test]
fn test_surface_lookup_uses_rig_children_only() {
    let mut app = create_scope_app();

    // Чужой rig заспавнен раньше: его surface первым попадётся при скане мира
    let other_rig = app.world_mut().spawn(Name::new("OtherRig")).id();
    app.world_mut().spawn((
        Name::new("LockedScopePerspective"),
        RenderSurface::new(TextureId(99)),
        ChildOf(other_rig),
    ));

    let scene = spawn_scene(&mut app, true);
    enter(&mut app, &scene);
    run_updates(&mut app, 10);

    assert!(state(&app, scene.zone).is_locked());
    let scope_camera = scene.scope_camera.expect("spawned with scope camera");
    let scope = app.world().get::<ViewCamera>(scope_camera).unwrap();
    assert_eq!(scope.target, ViewTarget::Texture(SURFACE_TEXTURE));
}

#[test]
fn test_nested_surface_is_not_a_direct_child() {
    let mut app = create_scope_app();
    let world = app.world_mut();

    let rig = world
        .spawn((
            Name::new("HeadCamRig"),
            Transform::from_xyz(0.2, 0.0, 0.0),
            BoundingVolume::sphere_bounds(0.2),
            ViewCamera::default(),
        ))
        .id();
    let optics = world.spawn((Name::new("Optics"), ChildOf(rig))).id();
    world.spawn((
        Name::new("LockedScopePerspective"),
        RenderSurface::new(SURFACE_TEXTURE),
        ChildOf(optics),
    ));
    world.spawn((ScopeCamera, ViewCamera::default()));
    let zone = world
        .spawn((
            Transform::default(),
            BoundingVolume::cuboid(Vec3::splat(1.0)),
            ScopeZone::new(rig).with_dwell(DWELL),
        ))
        .id();

    app.world_mut().send_event(ZoneOverlapBegan { zone, other: rig });
    run_updates(&mut app, 10);

    assert!(!state(&app, zone).is_locked());
    assert!(recorded(&app).iter().any(|(_, e)| matches!(
        e,
        ScopeTransitionEvent::CommitFailed {
            error: CommitError::MissingLockedSurface { .. },
            ..
        }
    )));
}

/// Сколько раз TransitionState зон помечался changed (после transition систем)
#[derive(Resource, Default)]
struct StateChanges(usize);

fn count_state_changes(
    changed: Query<(), Changed<TransitionState>>,
    mut changes: ResMut<StateChanges>,
) {
    changes.0 += changed.iter().count();
}

/// Test: отклонённый overlap-begin не трогает change detection, принятый — трогает
#[test]
fn test_rejected_entry_leaves_state_unchanged() {
    let mut app = create_scope_app();
    app.init_resource::<StateChanges>().add_systems(
        PostUpdate,
        count_state_changes.after(ScopeTransitionSystems),
    );
    let scene = spawn_scene(&mut app, true);

    // Первый frame: Added → changed
    app.update();
    app.world_mut().resource_mut::<StateChanges>().0 = 0;

    let stranger = app.world_mut().spawn(Transform::default()).id();
    app.world_mut().send_event(ZoneOverlapBegan {
        zone: scene.zone,
        other: stranger,
    });
    app.update();
    assert_eq!(app.world().resource::<StateChanges>().0, 0);

    enter(&mut app, &scene);
    app.update();
    assert_eq!(app.world().resource::<StateChanges>().0, 1);

    // Повторный вход во время dwell'а — снова no-op
    enter(&mut app, &scene);
    app.update();
    assert_eq!(app.world().resource::<StateChanges>().0, 1);
    assert_eq!(count(&app, |e| matches!(e, ScopeTransitionEvent::Started { .. })), 1);
}

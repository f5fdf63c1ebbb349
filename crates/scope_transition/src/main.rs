//! Headless прогон scope transition
//!
//! Rig входит в зону, стоит dwell, view lock'ается.

use bevy::prelude::*;
use std::time::Duration;

use scope_transition::{
    create_headless_app, scope_zone_sensor, BoundingVolume, RenderSurface, ScopeCamera, ScopeTransitionPlugin,
    ScopeZone, TextureId, TransitionState, ViewCamera, ZoneOverlapBegan,
};

const FRAME: Duration = Duration::from_millis(16);

fn main() {
    println!("Starting scope transition headless run (frame: {:?})", FRAME);

    let mut app = create_headless_app(FRAME);
    app.add_plugins(ScopeTransitionPlugin::default());

    let world = app.world_mut();

    // Camera rig наблюдателя (primary камера видит всё) + locked perspective surface
    let rig = world
        .spawn((
            Name::new("HeadCamRig"),
            Transform::from_xyz(5.0, 1.7, 0.0),
            BoundingVolume::sphere_bounds(0.2),
            ViewCamera::default(),
        ))
        .id();
    world.spawn((
        Name::new("LockedScopePerspective"),
        RenderSurface::new(TextureId(1)),
        ChildOf(rig),
    ));

    world.spawn((Name::new("ScopeCam"), ScopeCamera, ViewCamera::default()));

    let zone = world
        .spawn((
            Name::new("ScopeHotZone"),
            Transform::from_xyz(0.0, 1.5, 0.0),
            scope_zone_sensor(Vec3::new(0.5, 0.5, 0.5)),
            ScopeZone::new(rig),
        ))
        .id();

    // Rig подходит к scope
    if let Some(mut transform) = world.get_mut::<Transform>(rig) {
        transform.translation = Vec3::new(0.1, 1.6, 0.0);
    }
    world.send_event(ZoneOverlapBegan { zone, other: rig });

    for tick in 0..200 {
        app.update();

        let state = app.world().get::<TransitionState>(zone).copied();
        if tick % 25 == 0 {
            println!("Tick {}: {:?}", tick, state);
        }
        if state.is_some_and(|state| state.is_locked()) {
            println!("Tick {}: view locked", tick);
            break;
        }
    }

    if let Some(camera) = app.world().get::<ViewCamera>(rig) {
        println!("Primary camera culling mask: {:#034b}", camera.culling_mask.0);
    }

    println!("Run complete!");
}

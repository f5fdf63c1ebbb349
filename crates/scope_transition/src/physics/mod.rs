//! Physics bridge: Rapier sensor → ZoneOverlapBegan
//!
//! Зона = sensor collider (trigger). Rapier шлёт CollisionEvent::Started при
//! первом контакте → переводим в discrete overlap-begin для Zone Monitor.
//! Stopped игнорируем: выход из зоны ловит bounds re-check dwell timer'а.
//!
//! Архитектура: RapierPhysicsPlugin добавляет хост (в headless тестах его нет,
//! события можно слать руками).

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::components::{BoundingVolume, ScopeZone};
use crate::transition::{ScopeTransitionSystems, ZoneOverlapBegan};

/// Rapier Sensor Bridge Plugin
///
/// Требует ScopeTransitionPlugin (ZoneOverlapBegan event).
pub struct RapierSensorBridgePlugin;

impl Plugin for RapierSensorBridgePlugin {
    fn build(&self, app: &mut App) {
        // No-op если RapierPhysicsPlugin уже зарегистрировал
        app.add_event::<CollisionEvent>();

        app.add_systems(
            PostUpdate,
            forward_sensor_collisions.before(ScopeTransitionSystems),
        );
    }
}

/// Система: CollisionEvent::Started(a, b) → ZoneOverlapBegan для каждой стороны-зоны
pub fn forward_sensor_collisions(
    mut collisions: EventReader<CollisionEvent>,
    zones: Query<(), With<ScopeZone>>,
    mut overlaps: EventWriter<ZoneOverlapBegan>,
) {
    for collision in collisions.read() {
        let CollisionEvent::Started(a, b, _) = *collision else {
            continue;
        };

        if zones.contains(a) {
            overlaps.write(ZoneOverlapBegan { zone: a, other: b });
        }
        if zones.contains(b) {
            overlaps.write(ZoneOverlapBegan { zone: b, other: a });
        }
    }
}

/// Sensor collider зоны + BoundingVolume тех же размеров
///
/// Rapier видит trigger enter, dwell timer — те же bounds.
pub fn scope_zone_sensor(half_extents: Vec3) -> impl Bundle {
    (
        Collider::cuboid(half_extents.x, half_extents.y, half_extents.z),
        Sensor,
        ActiveEvents::COLLISION_EVENTS,
        BoundingVolume::cuboid(half_extents),
    )
}

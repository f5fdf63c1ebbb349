//! Bounding volumes для overlap проверок
//!
//! Dwell timer каждый tick делает свежую bounds проверку
//! (наблюдатель мог уйти без discrete exit event).

use bevy::math::bounding::{Aabb3d, IntersectsVolume};
use bevy::prelude::*;

/// Axis-aligned box вокруг world-space позиции (GlobalTransform)
///
/// Scale учитывается (включая scale родителей), rotation — нет (AABB).
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct BoundingVolume {
    pub half_extents: Vec3,
}

impl BoundingVolume {
    pub fn cuboid(half_extents: Vec3) -> Self {
        Self { half_extents }
    }

    pub fn sphere_bounds(radius: f32) -> Self {
        Self::cuboid(Vec3::splat(radius))
    }

    /// World-space AABB для данного transform
    ///
    /// GlobalTransform, не Transform: child rig'а хранит local offset.
    pub fn aabb(&self, transform: &GlobalTransform) -> Aabb3d {
        let (scale, _, translation) = transform.to_scale_rotation_translation();
        Aabb3d::new(translation, self.half_extents * scale.abs())
    }
}

/// `overlaps(volumeA, volumeB)` — касание границ считается overlap'ом
pub fn volumes_overlap(
    a: (&GlobalTransform, &BoundingVolume),
    b: (&GlobalTransform, &BoundingVolume),
) -> bool {
    a.1.aabb(a.0).intersects(&b.1.aabb(b.0))
}

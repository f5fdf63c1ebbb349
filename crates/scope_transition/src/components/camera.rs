//! Camera abstraction (render target + visibility filter)
//!
//! Сам рендер — внешний коллаборатор. Здесь только state, который
//! commit переключает: куда камера рисует и какие слои видит.

use bevy::prelude::*;

use crate::layers::CullingMask;

/// Идентификатор render texture на стороне рендера
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub struct TextureId(pub u32);

/// Куда камера рисует
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum ViewTarget {
    /// Основной экран / HMD
    #[default]
    Screen,
    /// Offscreen render texture
    Texture(TextureId),
}

/// Камера: settable render target + settable culling mask
///
/// На camera rig наблюдателя — primary камера.
/// На entity с `ScopeCamera` — вторичная (scope) камера.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default, Reflect)]
#[reflect(Component)]
pub struct ViewCamera {
    pub target: ViewTarget,
    pub culling_mask: CullingMask,
}

impl ViewCamera {
    pub fn with_mask(culling_mask: CullingMask) -> Self {
        Self {
            target: ViewTarget::Screen,
            culling_mask,
        }
    }
}

/// Tag: вторичная камера, смотрящая через scope
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct ScopeCamera;

/// Locked perspective surface — объект, на который композится scope view
///
/// Ищется по имени среди children camera rig'а.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct RenderSurface {
    /// Render texture материала (None — материал без texture)
    pub texture: Option<TextureId>,
}

impl RenderSurface {
    pub fn new(texture: TextureId) -> Self {
        Self {
            texture: Some(texture),
        }
    }
}

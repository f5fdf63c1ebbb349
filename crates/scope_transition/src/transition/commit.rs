//! View-Lock Committer
//!
//! One-shot rewiring рендера при успешном dwell'е:
//! 1. Locked perspective surface — named child camera rig'а
//! 2. Scope camera — entity с tag'ом `ScopeCamera`
//! 3. scope_camera.target = surface texture
//! 4. primary camera: hidden layer off, shown layer on
//!
//! Все lookup'ы (объекты + имена слоёв) резолвятся ДО первой мутации:
//! любая ошибка резолва = commit целиком не случился, камеры не тронуты.
//! Rollback'а нет и не нужен — после резолва мутации не падают.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::components::{RenderSurface, ScopeCamera, TextureId, ViewCamera, ViewTarget};
use crate::config::ScopeTransitionConfig;
use crate::error::CommitError;
use crate::layers::{LayerIndex, LayerRegistry};

/// Сцена, видимая committer'у (explicit injection вместо global lookup'ов)
///
/// Bevy реализация — `BevyScopeScene` (SystemParam). В тестах — in-memory fake.
pub trait ScopeScene {
    /// Прямой child `root` с данным именем
    fn child_by_name(&self, root: Entity, name: &str) -> Option<Entity>;

    /// Render texture surface'а (None: нет surface компонента или texture)
    fn surface_texture(&self, surface: Entity) -> Option<TextureId>;

    /// Первая камера с tag'ом ScopeCamera
    fn scope_camera(&self) -> Option<Entity>;

    fn camera(&self, camera: Entity) -> Option<&ViewCamera>;

    fn camera_mut(&mut self, camera: Entity) -> Option<&mut ViewCamera>;
}

/// Полностью резолвнутый commit — только мутации, без lookup'ов
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewLockPlan {
    pub surface: Entity,
    pub texture: TextureId,
    pub scope_camera: Entity,
    pub primary_camera: Entity,
    pub hidden_layer: LayerIndex,
    pub shown_layer: LayerIndex,
}

impl ViewLockPlan {
    /// Резолвит всё, что нужно commit'у. Первая неудача → Err, сцена не тронута.
    pub fn resolve(
        scene: &impl ScopeScene,
        layers: &LayerRegistry,
        config: &ScopeTransitionConfig,
        rig: Entity,
    ) -> Result<Self, CommitError> {
        let surface = scene
            .child_by_name(rig, &config.locked_surface_name)
            .ok_or_else(|| CommitError::MissingLockedSurface {
                rig,
                name: config.locked_surface_name.clone(),
            })?;
        let texture = scene
            .surface_texture(surface)
            .ok_or(CommitError::SurfaceWithoutTexture { surface })?;

        let scope_camera = scene
            .scope_camera()
            .filter(|&camera| scene.camera(camera).is_some())
            .ok_or(CommitError::MissingScopeCamera)?;

        // Primary камера живёт на самом rig'е
        if scene.camera(rig).is_none() {
            return Err(CommitError::MissingPrimaryCamera { rig });
        }

        let hidden_layer = layers.resolve(&config.hidden_layer)?;
        let shown_layer = layers.resolve(&config.shown_layer)?;

        Ok(Self {
            surface,
            texture,
            scope_camera,
            primary_camera: rig,
            hidden_layer,
            shown_layer,
        })
    }

    /// Мутации commit'а (порядок как в pipeline: target, затем culling mask)
    pub fn apply(&self, scene: &mut impl ScopeScene) {
        if let Some(scope_camera) = scene.camera_mut(self.scope_camera) {
            scope_camera.target = ViewTarget::Texture(self.texture);
        }

        if let Some(primary) = scene.camera_mut(self.primary_camera) {
            primary.culling_mask.disable(self.hidden_layer);
            primary.culling_mask.enable(self.shown_layer);
        }
    }
}

/// `commit()` — resolve + apply одним блоком
pub fn commit_view_lock(
    scene: &mut impl ScopeScene,
    layers: &LayerRegistry,
    config: &ScopeTransitionConfig,
    rig: Entity,
) -> Result<ViewLockPlan, CommitError> {
    let plan = ViewLockPlan::resolve(scene, layers, config, rig)?;
    plan.apply(scene);
    Ok(plan)
}

/// ScopeScene поверх ECS мира: Children rig'а + Name для named child, tag-компонент для scope камеры
#[derive(SystemParam)]
pub struct BevyScopeScene<'w, 's> {
    children: Query<'w, 's, &'static Children>,
    names: Query<'w, 's, &'static Name>,
    surfaces: Query<'w, 's, &'static RenderSurface>,
    scope_cameras: Query<'w, 's, Entity, With<ScopeCamera>>,
    cameras: Query<'w, 's, &'static mut ViewCamera>,
}

impl ScopeScene for BevyScopeScene<'_, '_> {
    fn child_by_name(&self, root: Entity, name: &str) -> Option<Entity> {
        // Только прямые children root'а, не скан всех Name в мире
        let children: &[Entity] = self.children.get(root).ok()?;
        children.iter().copied().find(|&child| {
            self.names
                .get(child)
                .is_ok_and(|child_name| child_name.as_str() == name)
        })
    }

    fn surface_texture(&self, surface: Entity) -> Option<TextureId> {
        self.surfaces.get(surface).ok().and_then(|surface| surface.texture)
    }

    fn scope_camera(&self) -> Option<Entity> {
        self.scope_cameras.iter().next()
    }

    fn camera(&self, camera: Entity) -> Option<&ViewCamera> {
        self.cameras.get(camera).ok()
    }

    fn camera_mut(&mut self, camera: Entity) -> Option<&mut ViewCamera> {
        self.cameras.get_mut(camera).ok().map(Mut::into_inner)
    }
}

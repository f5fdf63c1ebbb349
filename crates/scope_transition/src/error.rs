//! Ошибки commit'а view lock
//!
//! Все варианты — "lookup не нашёл объект сцены". Обрабатываются одним блоком
//! в commit системе: диагностика + зона возвращается в Idle.

use bevy::prelude::Entity;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    /// Нет child'а с нужным именем под camera rig наблюдателя
    #[error("locked perspective surface `{name}` not found under rig {rig:?}")]
    MissingLockedSurface { rig: Entity, name: String },

    /// Surface найден, но у него нет render texture
    #[error("locked perspective surface {surface:?} has no render texture")]
    SurfaceWithoutTexture { surface: Entity },

    #[error("scope camera not found")]
    MissingScopeCamera,

    /// На rig'е наблюдателя нет primary камеры
    #[error("observer rig {rig:?} has no view camera")]
    MissingPrimaryCamera { rig: Entity },

    #[error("unknown visibility layer `{0}`")]
    UnknownLayer(String),
}
